use serde::Serialize;

use crate::core::{board::Board, collision::Position, piece::PieceKind};

use super::{game_session::SessionState, game_stats::GameStats, piece_controller::PieceController};

/// The active piece as seen by a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub color: &'static str,
    pub position: Position,
    pub shape: Vec<Vec<u8>>,
}

/// Read-only view of a session at one moment.
///
/// Cells are numeric values: `0` for empty, `1..=7` for the piece id (see
/// [`PieceKind::id`]). The board does not include the active piece; use
/// [`Self::composed_board`] for a grid with the piece drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub score: u64,
    pub drop_interval_ms: u64,
    pub board: Vec<Vec<u8>>,
    pub active: Option<ActiveSnapshot>,
    /// Row the active piece would land on if hard dropped.
    pub ghost_y: Option<i32>,
    pub completed_pieces: usize,
    pub total_cleared_lines: usize,
}

impl SessionSnapshot {
    pub(crate) fn capture(
        board: &Board,
        active: Option<&PieceController>,
        state: SessionState,
        stats: &GameStats,
    ) -> Self {
        Self {
            state,
            score: stats.score(),
            drop_interval_ms: stats.drop_interval_ms(),
            board: board.to_values(),
            active: active.map(|piece| ActiveSnapshot {
                kind: piece.kind(),
                color: piece.kind().color(),
                position: piece.position(),
                shape: piece.shape().to_values(),
            }),
            ghost_y: active.map(|piece| piece.landing_position(board).y),
            completed_pieces: stats.completed_pieces(),
            total_cleared_lines: stats.total_cleared_lines(),
        }
    }

    /// Returns the board with the active piece drawn over it.
    ///
    /// Piece cells outside the grid are skipped.
    #[must_use]
    pub fn composed_board(&self) -> Vec<Vec<u8>> {
        let mut grid = self.board.clone();
        let Some(active) = &self.active else {
            return grid;
        };
        for (dy, row) in active.shape.iter().enumerate() {
            for (dx, &value) in row.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                let x = usize::try_from(active.position.x).ok().and_then(|x| x.checked_add(dx));
                let y = usize::try_from(active.position.y).ok().and_then(|y| y.checked_add(dy));
                if let Some(cell) = y
                    .and_then(|y| grid.get_mut(y))
                    .zip(x)
                    .and_then(|(row, x)| row.get_mut(x))
                {
                    *cell = value;
                }
            }
        }
        grid
    }
}
