use arrayvec::ArrayVec;
use tracing::trace;

use crate::core::{
    board::Board,
    collision::{Position, collides, offset_to_i32},
    piece::{MAX_SHAPE_SIZE, PieceKind, Shape, shape_of},
};

/// Horizontal movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Returns the column delta of this direction (-1 or +1).
    #[must_use]
    pub const fn dx(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// The active, player-controlled piece.
///
/// Every operation tests the tentative placement against the board and only
/// commits it when it does not collide, so after any call the piece is in a
/// valid placement unless it was spawned into one that already collided.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Direction, PieceController, PieceKind, Position};
///
/// let board = Board::standard();
/// let mut piece = PieceController::spawn(PieceKind::O, &board);
/// assert_eq!(piece.position(), Position::new(4, 0));
///
/// assert!(piece.move_horizontal(Direction::Left, &board));
/// let rows = piece.drop_to_floor(&board);
/// assert_eq!(rows, 18);
/// assert_eq!(piece.position(), Position::new(3, 18));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceController {
    kind: PieceKind,
    shape: Shape,
    position: Position,
}

impl PieceController {
    /// Places a fresh copy of `kind`'s shape at the top of `board`,
    /// horizontally centered.
    ///
    /// The caller must check [`Self::collides`] afterwards; a colliding spawn
    /// means the game is over.
    #[must_use]
    pub fn spawn(kind: PieceKind, board: &Board) -> Self {
        let shape = shape_of(kind);
        let x = offset_to_i32(board.width() / 2) - offset_to_i32(shape.size() / 2);
        Self {
            kind,
            shape,
            position: Position::new(x, 0),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns `true` if the piece's current placement collides with `board`.
    #[must_use]
    pub fn collides(&self, board: &Board) -> bool {
        collides(&self.shape, self.position, board)
    }

    /// Returns the absolute board positions of the occupied cells.
    #[must_use]
    pub fn occupied_positions(&self) -> ArrayVec<(i32, i32), { MAX_SHAPE_SIZE * MAX_SHAPE_SIZE }> {
        self.shape
            .occupied_cells()
            .map(|(dx, dy, _)| {
                (
                    self.position.x + offset_to_i32(dx),
                    self.position.y + offset_to_i32(dy),
                )
            })
            .collect()
    }

    /// Shifts the piece one column. Returns `false` and leaves the piece
    /// unchanged if the shifted placement collides.
    pub fn move_horizontal(&mut self, direction: Direction, board: &Board) -> bool {
        let moved = self.position.offset(direction.dx(), 0);
        if collides(&self.shape, moved, board) {
            return false;
        }
        self.position = moved;
        true
    }

    /// Rotates the piece clockwise in place.
    ///
    /// There are no wall kicks: if the rotated shape collides, it is turned
    /// three more times to restore the original orientation and `false` is
    /// returned.
    pub fn rotate(&mut self, board: &Board) -> bool {
        self.shape.rotate_right();
        if !self.collides(board) {
            return true;
        }
        for _ in 0..3 {
            self.shape.rotate_right();
        }
        false
    }

    /// Moves the piece down one row.
    ///
    /// Returns `false` (landed) and leaves the piece unchanged if the lower
    /// placement collides.
    pub fn step_down(&mut self, board: &Board) -> bool {
        let moved = self.position.offset(0, 1);
        if collides(&self.shape, moved, board) {
            trace!(kind = ?self.kind, x = self.position.x, y = self.position.y, "piece landed");
            return false;
        }
        self.position = moved;
        true
    }

    /// Moves the piece straight down until the next step would collide and
    /// returns the number of rows travelled.
    pub fn drop_to_floor(&mut self, board: &Board) -> usize {
        let landing = self.landing_position(board);
        let rows = usize::try_from(landing.y - self.position.y).unwrap_or(0);
        self.position = landing;
        rows
    }

    /// Returns where the piece would come to rest if dropped straight down.
    #[must_use]
    pub fn landing_position(&self, board: &Board) -> Position {
        let mut position = self.position;
        // the floor is a wall, so this is bounded by height + shape size
        let limit = board.height() + self.shape.size();
        for _ in 0..limit {
            let next = position.offset(0, 1);
            if collides(&self.shape, next, board) {
                break;
            }
            position = next;
        }
        position
    }
}
