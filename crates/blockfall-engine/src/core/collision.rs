use super::{board::Board, piece::Shape};

/// Top-left offset of a shape matrix in board coordinates.
///
/// Either component may be negative: `x` when the shape has empty leading
/// columns pressed against the left wall, `y` when the piece pokes above the
/// top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Returns `true` if `shape` placed at `position` overlaps a wall, the floor
/// or a settled cell.
///
/// Only occupied cells of the shape are tested. Cells above the top edge
/// never collide.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, PieceKind, Position, collides, shape_of};
///
/// let board = Board::standard();
/// let shape = shape_of(PieceKind::O);
/// assert!(!collides(&shape, Position::new(4, 0), &board));
/// assert!(collides(&shape, Position::new(9, 0), &board));
/// assert!(collides(&shape, Position::new(4, 19), &board));
/// assert!(!collides(&shape, Position::new(4, -2), &board));
/// ```
#[must_use]
pub fn collides(shape: &Shape, position: Position, board: &Board) -> bool {
    shape.occupied_cells().any(|(dx, dy, _)| {
        let x = position.x + offset_to_i32(dx);
        let y = position.y + offset_to_i32(dy);
        board.cell_at(x, y).is_solid()
    })
}

#[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub(crate) const fn offset_to_i32(offset: usize) -> i32 {
    // shape offsets are below MAX_SHAPE_SIZE
    offset as i32
}
