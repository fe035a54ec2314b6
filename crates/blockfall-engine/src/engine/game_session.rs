use serde::Serialize;
use tracing::{debug, info, trace};

use crate::{
    BoardSizeError,
    core::{board::Board, piece::PieceKind},
};

use super::{
    game_stats::GameStats,
    piece_controller::{Direction, PieceController},
    piece_source::{PieceSeed, PieceSource, RandomPieceSource},
    snapshot::SessionSnapshot,
};

/// Lifecycle of a [`GameSession`].
///
/// `Ready → Running ⇄ Paused → GameOver`; [`GameSession::start`] leaves any
/// state for a fresh `Running` game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Ready,
    Running,
    Paused,
    GameOver,
}

/// Input that can be applied to a session with [`GameSession::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameCommand {
    Start,
    TogglePause,
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
}

/// What happened when a piece locked into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockOutcome {
    /// Kind of the piece that locked.
    pub kind: PieceKind,
    /// Rows cleared by this lock.
    pub cleared_lines: usize,
    /// Points added to the score.
    pub score_gained: u64,
    /// Rows travelled by a hard drop (0 for gravity and soft drops).
    pub dropped_rows: usize,
    /// The next piece could not spawn and the game is over.
    pub topped_out: bool,
}

/// A single game: board, active piece, score and state machine.
///
/// The session is driven from outside. A scheduler calls
/// [`advance`](Self::advance) with elapsed time, an input layer calls the
/// command methods, and a renderer reads [`board`](Self::board),
/// [`active_piece`](Self::active_piece) or [`snapshot`](Self::snapshot).
/// Commands are ignored unless the session is [`SessionState::Running`].
///
/// # Example
///
/// ```
/// use blockfall_engine::{GameSession, PieceKind, SessionState};
///
/// let mut session = GameSession::new(|| PieceKind::O);
/// assert_eq!(session.state(), SessionState::Ready);
///
/// session.start();
/// assert!(session.move_left());
/// let outcome = session.hard_drop().unwrap();
/// assert_eq!(outcome.dropped_rows, 18);
/// assert_eq!(session.board().occupied_count(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession<S = RandomPieceSource> {
    board: Board,
    active: Option<PieceController>,
    source: S,
    stats: GameStats,
    state: SessionState,
    drop_counter_ms: u64,
}

impl GameSession<RandomPieceSource> {
    /// Creates a session whose pieces come from a seeded random source.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::new(RandomPieceSource::with_seed(seed))
    }

    /// Like [`Self::with_seed`], but with a random seed.
    #[must_use]
    pub fn random() -> Self {
        Self::new(RandomPieceSource::new())
    }
}

impl<S> GameSession<S>
where
    S: PieceSource,
{
    /// Creates a session on a standard 10×20 board in the
    /// [`SessionState::Ready`] state.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_board(source, Board::standard())
    }

    /// Like [`Self::new`], but with a custom board size.
    pub fn with_board_size(source: S, width: usize, height: usize) -> Result<Self, BoardSizeError> {
        Ok(Self::with_board(source, Board::new(width, height)?))
    }

    fn with_board(source: S, board: Board) -> Self {
        Self {
            board,
            active: None,
            source,
            stats: GameStats::new(),
            state: SessionState::Ready,
            drop_counter_ms: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the active piece, or `None` before the first game starts.
    ///
    /// After game over this is the piece that failed to spawn.
    #[must_use]
    pub const fn active_piece(&self) -> Option<&PieceController> {
        self.active.as_ref()
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.stats.score()
    }

    #[must_use]
    pub const fn drop_interval_ms(&self) -> u64 {
        self.stats.drop_interval_ms()
    }

    /// Returns the time accumulated towards the next gravity step.
    #[must_use]
    pub const fn drop_counter_ms(&self) -> u64 {
        self.drop_counter_ms
    }

    #[must_use]
    pub const fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Captures the current state for presentation layers.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.board, self.active.as_ref(), self.state, &self.stats)
    }

    /// Starts a fresh game, whatever the current state.
    ///
    /// Empties the board, resets score, speed and timer, and spawns the first
    /// piece. The session ends up `Running`, or `GameOver` if the first piece
    /// cannot spawn.
    pub fn start(&mut self) {
        self.board.clear();
        self.begin_game();
    }

    /// Starts a fresh game on a prepared board, whatever the current state.
    ///
    /// Like [`Self::start`], but the session takes over `board` as it is
    /// instead of emptying its own. Full rows on `board` stay until a piece
    /// locks.
    pub fn start_with_board(&mut self, board: Board) {
        self.board = board;
        self.begin_game();
    }

    fn begin_game(&mut self) {
        self.stats = GameStats::new();
        self.drop_counter_ms = 0;
        self.state = SessionState::Running;
        info!(
            width = self.board.width(),
            height = self.board.height(),
            "game started"
        );
        self.spawn_next();
    }

    /// Switches between `Running` and `Paused`; ignored in other states.
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            state @ (SessionState::Ready | SessionState::GameOver) => state,
        };
    }

    /// Feeds elapsed time to the gravity timer.
    ///
    /// Once the accumulated time exceeds the drop interval, the piece moves
    /// down one row and the timer restarts from zero. If the piece could not
    /// move it locks, and the outcome of that lock is returned.
    pub fn advance(&mut self, elapsed_ms: u64) -> Option<LockOutcome> {
        if !self.state.is_running() {
            return None;
        }
        self.drop_counter_ms = self.drop_counter_ms.saturating_add(elapsed_ms);
        if self.drop_counter_ms <= self.drop_interval_ms() {
            return None;
        }
        self.drop_counter_ms = 0;
        self.gravity_step()
    }

    pub fn move_left(&mut self) -> bool {
        self.move_horizontal(Direction::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_horizontal(Direction::Right)
    }

    fn move_horizontal(&mut self, direction: Direction) -> bool {
        if !self.state.is_running() {
            return false;
        }
        let Some(piece) = &mut self.active else {
            return false;
        };
        piece.move_horizontal(direction, &self.board)
    }

    /// Rotates the active piece clockwise. Returns whether the rotation stuck.
    pub fn rotate(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }
        let Some(piece) = &mut self.active else {
            return false;
        };
        piece.rotate(&self.board)
    }

    /// Moves the piece down one row immediately and restarts the gravity
    /// timer. Locks the piece if it could not move.
    pub fn soft_drop_now(&mut self) -> Option<LockOutcome> {
        if !self.state.is_running() {
            return None;
        }
        self.drop_counter_ms = 0;
        self.gravity_step()
    }

    /// Drops the piece to its landing position and locks it.
    pub fn hard_drop(&mut self) -> Option<LockOutcome> {
        if !self.state.is_running() {
            return None;
        }
        let piece = self.active.as_mut()?;
        let rows = piece.drop_to_floor(&self.board);
        let piece = *piece;
        self.drop_counter_ms = 0;
        Some(self.lock_piece(piece, rows))
    }

    /// Dispatches a command. Returns the lock outcome if the command locked a
    /// piece.
    pub fn apply(&mut self, command: GameCommand) -> Option<LockOutcome> {
        match command {
            GameCommand::Start => self.start(),
            GameCommand::TogglePause => self.toggle_pause(),
            GameCommand::MoveLeft => {
                self.move_left();
            }
            GameCommand::MoveRight => {
                self.move_right();
            }
            GameCommand::Rotate => {
                self.rotate();
            }
            GameCommand::SoftDrop => return self.soft_drop_now(),
            GameCommand::HardDrop => return self.hard_drop(),
        }
        None
    }

    fn gravity_step(&mut self) -> Option<LockOutcome> {
        let piece = self.active.as_mut()?;
        if piece.step_down(&self.board) {
            trace!(y = piece.position().y, "gravity step");
            return None;
        }
        let piece = *piece;
        Some(self.lock_piece(piece, 0))
    }

    fn lock_piece(&mut self, piece: PieceController, dropped_rows: usize) -> LockOutcome {
        let kind = piece.kind();
        self.board.fill_cells(piece.occupied_positions(), kind);
        let cleared_lines = self.board.clear_full_rows();
        let score_gained = self.stats.complete_piece_drop(cleared_lines);
        debug!(
            ?kind,
            cleared_lines,
            score = self.stats.score(),
            drop_interval_ms = self.stats.drop_interval_ms(),
            "piece locked"
        );

        let topped_out = !self.spawn_next();
        LockOutcome {
            kind,
            cleared_lines,
            score_gained,
            dropped_rows,
            topped_out,
        }
    }

    /// Spawns the next piece. Returns `false` and ends the game if it
    /// collides.
    fn spawn_next(&mut self) -> bool {
        let piece = PieceController::spawn(self.source.next_piece(), &self.board);
        let collides = piece.collides(&self.board);
        self.active = Some(piece);
        if collides {
            self.state = SessionState::GameOver;
            info!(
                score = self.stats.score(),
                completed_pieces = self.stats.completed_pieces(),
                total_cleared_lines = self.stats.total_cleared_lines(),
                "game over"
            );
        }
        !collides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{collision::Position, piece::Cell};

    fn o_session() -> GameSession<impl PieceSource> {
        let mut session = GameSession::new(|| PieceKind::O);
        session.start();
        session
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn test_new_session_is_ready() {
            let mut session = GameSession::new(|| PieceKind::T);
            assert!(session.state().is_ready());
            assert!(session.active_piece().is_none());
            assert_eq!(session.advance(5000), None);
            assert!(!session.move_left());
            assert_eq!(session.hard_drop(), None);
            session.toggle_pause();
            assert!(session.state().is_ready());
        }

        #[test]
        fn test_start_spawns_centered_piece() {
            let session = o_session();
            assert!(session.state().is_running());
            let piece = session.active_piece().unwrap();
            assert_eq!(piece.kind(), PieceKind::O);
            assert_eq!(piece.position(), Position::new(4, 0));
            assert_eq!(session.drop_interval_ms(), 1000);
        }

        #[test]
        fn test_pause_blocks_everything() {
            let mut session = o_session();
            session.toggle_pause();
            assert!(session.state().is_paused());
            assert_eq!(session.advance(10_000), None);
            assert!(!session.move_left());
            assert!(!session.rotate());
            assert_eq!(session.soft_drop_now(), None);
            assert_eq!(session.hard_drop(), None);
            assert_eq!(session.active_piece().unwrap().position(), Position::new(4, 0));
            assert_eq!(session.drop_counter_ms(), 0);

            session.toggle_pause();
            assert!(session.state().is_running());
        }

        #[test]
        fn test_start_resets_game() {
            let mut session = o_session();
            session.hard_drop();
            session.advance(600);
            assert_eq!(session.board().occupied_count(), 4);

            session.start();
            assert!(session.state().is_running());
            assert_eq!(session.board().occupied_count(), 0);
            assert_eq!(session.stats(), &GameStats::new());
            assert_eq!(session.drop_counter_ms(), 0);
        }

        #[test]
        fn test_start_with_board_keeps_cells() {
            let mut session = o_session();
            session.hard_drop();
            let mut board = Board::standard();
            board.fill_cells([(0, 19), (1, 19)], PieceKind::T);

            session.start_with_board(board.clone());
            assert!(session.state().is_running());
            assert_eq!(session.board(), &board);
            assert_eq!(session.stats(), &GameStats::new());
            assert_eq!(session.active_piece().unwrap().position(), Position::new(4, 0));
        }

        #[test]
        fn test_spawn_collision_ends_game() {
            let mut session = GameSession::with_board_size(|| PieceKind::O, 4, 2).unwrap();
            session.start();
            let outcome = session.hard_drop().unwrap();
            assert!(outcome.topped_out);
            assert!(session.state().is_game_over());
            assert_eq!(session.advance(5000), None);
            assert!(!session.move_left());
            session.toggle_pause();
            assert!(session.state().is_game_over());

            session.start();
            assert!(session.state().is_running());
        }
    }

    mod gravity {
        use super::*;

        #[test]
        fn test_step_only_after_interval_exceeded() {
            let mut session = o_session();
            assert_eq!(session.advance(1000), None);
            assert_eq!(session.active_piece().unwrap().position().y, 0);
            assert_eq!(session.advance(1), None);
            assert_eq!(session.active_piece().unwrap().position().y, 1);
            assert_eq!(session.drop_counter_ms(), 0);
        }

        #[test]
        fn test_large_elapsed_steps_once() {
            let mut session = o_session();
            session.advance(50_000);
            assert_eq!(session.active_piece().unwrap().position().y, 1);
        }

        #[test]
        fn test_piece_locks_after_landing() {
            let mut session = o_session();
            let mut outcome = None;
            for _ in 0..19 {
                outcome = session.advance(1001);
            }
            let outcome = outcome.unwrap();
            assert_eq!(outcome.kind, PieceKind::O);
            assert_eq!(outcome.cleared_lines, 0);
            assert_eq!(outcome.dropped_rows, 0);
            assert!(!outcome.topped_out);
            assert_eq!(session.board().get(4, 19), Cell::Piece(PieceKind::O));
            assert_eq!(session.active_piece().unwrap().position(), Position::new(4, 0));
            assert_eq!(session.stats().completed_pieces(), 1);
        }

        #[test]
        fn test_soft_drop_resets_timer() {
            let mut session = o_session();
            session.advance(900);
            assert_eq!(session.soft_drop_now(), None);
            assert_eq!(session.drop_counter_ms(), 0);
            assert_eq!(session.active_piece().unwrap().position().y, 1);
            assert_eq!(session.advance(900), None);
            assert_eq!(session.active_piece().unwrap().position().y, 1);
        }
    }

    mod commands {
        use super::*;

        #[test]
        fn test_apply_dispatches() {
            let mut session = GameSession::new(|| PieceKind::T);
            assert_eq!(session.apply(GameCommand::Start), None);
            assert!(session.state().is_running());
            session.apply(GameCommand::MoveRight);
            assert_eq!(session.active_piece().unwrap().position().x, 5);
            session.apply(GameCommand::Rotate);
            assert_eq!(
                session.active_piece().unwrap().shape(),
                &PieceKind::T.shape().rotated_right()
            );
            session.apply(GameCommand::SoftDrop);
            assert_eq!(session.active_piece().unwrap().position().y, 1);
            let outcome = session.apply(GameCommand::HardDrop).unwrap();
            assert_eq!(outcome.kind, PieceKind::T);
            assert_eq!(outcome.dropped_rows, 16);
            session.apply(GameCommand::TogglePause);
            assert!(session.state().is_paused());
        }

        #[test]
        fn test_line_clear_scores() {
            // O pieces side by side fill the bottom two rows of a 4-wide board
            let mut session = GameSession::with_board_size(|| PieceKind::O, 4, 6).unwrap();
            session.start();
            // spawn x = 4/2 - 2/2 = 1
            assert!(session.move_left());
            assert_eq!(session.hard_drop().unwrap().cleared_lines, 0);
            assert!(session.move_right());
            let outcome = session.hard_drop().unwrap();
            assert_eq!(outcome.cleared_lines, 2);
            assert_eq!(outcome.score_gained, 200);
            assert_eq!(session.score(), 200);
            assert_eq!(session.board().occupied_count(), 0);
            assert_eq!(session.stats().line_cleared_counter()[2], 1);
        }
    }
}
