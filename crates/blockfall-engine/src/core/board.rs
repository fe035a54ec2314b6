use tracing::trace;

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    piece::{Cell, PieceKind},
};
use crate::BoardSizeError;

/// Result of probing a board coordinate that may lie outside the grid.
///
/// Collision detection treats [`CellProbe::Wall`] as solid and
/// [`CellProbe::Sky`] as empty, so pieces may hang above the top edge but
/// never pass through the sides or the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum CellProbe {
    /// Coordinate inside the grid.
    Inside(Cell),
    /// Left or right of the grid, or below the bottom edge.
    Wall,
    /// Above the top edge, within the horizontal range.
    Sky,
}

impl CellProbe {
    /// Returns `true` if a piece cell placed here would collide.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        match self {
            CellProbe::Inside(cell) => cell.is_occupied(),
            CellProbe::Wall => true,
            CellProbe::Sky => false,
        }
    }
}

/// A single row of settled cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRow {
    cells: Vec<Cell>,
}

impl BoardRow {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Cell::Empty; width],
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_occupied())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }
}

/// Grid of settled cells.
///
/// Row 0 is the top of the playfield, `x` grows to the right. The dimensions
/// are fixed at construction; clearing a row removes it and inserts an empty
/// row at the top, so the row count never changes.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Board, Cell, CellProbe, PieceKind};
///
/// let mut board = Board::standard();
/// board.set_cell(0, 19, Cell::Piece(PieceKind::T));
/// assert_eq!(board.cell_at(0, 19), CellProbe::Inside(Cell::Piece(PieceKind::T)));
/// assert_eq!(board.cell_at(-1, 19), CellProbe::Wall);
/// assert_eq!(board.cell_at(0, -1), CellProbe::Sky);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    rows: Vec<BoardRow>,
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// Creates an empty board of the given dimensions.
    pub fn new(width: usize, height: usize) -> Result<Self, BoardSizeError> {
        if width == 0 || height == 0 {
            return Err(BoardSizeError { width, height });
        }
        let rows = (0..height).map(|_| BoardRow::empty(width)).collect();
        Ok(Self { width, rows })
    }

    /// Creates an empty 10×20 board.
    #[must_use]
    pub fn standard() -> Self {
        let rows = (0..BOARD_HEIGHT)
            .map(|_| BoardRow::empty(BOARD_WIDTH))
            .collect();
        Self {
            width: BOARD_WIDTH,
            rows,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Probes a coordinate that may lie outside the grid.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> CellProbe {
        let Ok(x) = usize::try_from(x) else {
            return CellProbe::Wall;
        };
        if x >= self.width {
            return CellProbe::Wall;
        }
        let Ok(y) = usize::try_from(y) else {
            return CellProbe::Sky;
        };
        match self.rows.get(y) {
            Some(row) => CellProbe::Inside(row.cells[x]),
            None => CellProbe::Wall,
        }
    }

    /// Empties every cell, keeping the dimensions.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.cells.fill(Cell::Empty);
        }
    }

    /// Returns the cell at an in-bounds coordinate.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.rows[y].cells[x]
    }

    /// Writes a cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the grid.
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        assert!(
            x < self.width && y < self.rows.len(),
            "cell ({x}, {y}) outside {}x{} board",
            self.width,
            self.rows.len()
        );
        self.rows[y].cells[x] = cell;
    }

    /// Writes the occupied cells of a piece, given as absolute positions.
    ///
    /// # Panics
    ///
    /// Panics if any position lies outside the grid, including above the top
    /// edge.
    pub fn fill_cells<I>(&mut self, positions: I, kind: PieceKind)
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        for (x, y) in positions {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                panic!("cell ({x}, {y}) outside board");
            };
            self.set_cell(x, y, Cell::Piece(kind));
        }
    }

    /// Returns `true` if every cell in row `y` is occupied.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y].is_full()
    }

    /// Removes row `y`, shifts the rows above it down by one and inserts an
    /// empty row at the top.
    pub fn clear_row(&mut self, y: usize) {
        self.rows.remove(y);
        self.rows.insert(0, BoardRow::empty(self.width));
    }

    /// Clears every full row and returns the number of rows cleared.
    ///
    /// Rows are scanned from the bottom up. After a clear the same index is
    /// examined again, since it now holds the row that was above it.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.rows.len();
        while y > 0 {
            if self.rows[y - 1].is_full() {
                trace!(row = y - 1, "clearing full row");
                self.clear_row(y - 1);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(BoardRow::cells)
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &BoardRow {
        &self.rows[y]
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| &row.cells)
            .filter(|cell| cell.is_occupied())
            .count()
    }

    /// Returns the grid as rows of numeric cell values.
    #[must_use]
    pub fn to_values(&self) -> Vec<Vec<u8>> {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.value()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: Cell = Cell::Piece(PieceKind::T);

    fn fill_row(board: &mut Board, y: usize) {
        for x in 0..board.width() {
            board.set_cell(x, y, T);
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(4, 3).unwrap();
        assert_eq!(board.width(), 4);
        assert_eq!(board.height(), 3);
        assert_eq!(board.occupied_count(), 0);
        assert_eq!(board.to_values(), vec![vec![0; 4]; 3]);

        let board = Board::standard();
        assert_eq!((board.width(), board.height()), (10, 20));
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert_eq!(
            Board::new(0, 5),
            Err(BoardSizeError {
                width: 0,
                height: 5
            })
        );
        assert!(Board::new(5, 0).is_err());
    }

    #[test]
    fn test_cell_at_probes() {
        let mut board = Board::new(3, 2).unwrap();
        board.set_cell(2, 1, T);
        assert_eq!(board.cell_at(2, 1), CellProbe::Inside(T));
        assert_eq!(board.cell_at(0, 0), CellProbe::Inside(Cell::Empty));
        assert_eq!(board.cell_at(-1, 0), CellProbe::Wall);
        assert_eq!(board.cell_at(3, 0), CellProbe::Wall);
        assert_eq!(board.cell_at(0, 2), CellProbe::Wall);
        assert_eq!(board.cell_at(1, -3), CellProbe::Sky);
        assert_eq!(board.cell_at(-1, -1), CellProbe::Wall);

        assert!(CellProbe::Wall.is_solid());
        assert!(!CellProbe::Sky.is_solid());
        assert!(!CellProbe::Inside(Cell::Empty).is_solid());
        assert!(CellProbe::Inside(T).is_solid());
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_set_cell_out_of_bounds_panics() {
        let mut board = Board::new(3, 2).unwrap();
        board.set_cell(3, 0, T);
    }

    #[test]
    fn test_clear_row_shifts_rows_down() {
        let mut board = Board::new(3, 4).unwrap();
        board.set_cell(0, 1, T);
        fill_row(&mut board, 2);
        assert!(board.is_row_full(2));

        board.clear_row(2);
        assert_eq!(board.height(), 4);
        assert!(board.row(0).is_empty());
        assert_eq!(board.get(0, 2), T);
        assert!(!board.is_row_full(2));
    }

    #[test]
    fn test_clear_full_rows_adjacent() {
        let mut board = Board::new(3, 5).unwrap();
        board.set_cell(1, 1, T);
        fill_row(&mut board, 2);
        fill_row(&mut board, 3);
        board.set_cell(0, 4, T);
        fill_row(&mut board, 4);

        assert_eq!(board.clear_full_rows(), 3);
        assert_eq!(board.height(), 5);
        assert_eq!(board.occupied_count(), 1);
        assert_eq!(board.get(1, 4), T);
    }

    #[test]
    fn test_clear_full_rows_non_adjacent() {
        let mut board = Board::new(2, 4).unwrap();
        fill_row(&mut board, 1);
        board.set_cell(0, 2, T);
        fill_row(&mut board, 3);

        assert_eq!(board.clear_full_rows(), 2);
        assert_eq!(board.to_values(), [[0, 0], [0, 0], [0, 0], [6, 0]]);
    }

    #[test]
    fn test_clear_full_rows_nothing_to_clear() {
        let mut board = Board::new(2, 2).unwrap();
        board.set_cell(0, 1, T);
        let before = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_fill_cells_writes_piece() {
        let mut board = Board::new(3, 3).unwrap();
        board.fill_cells([(0, 0), (1, 0), (1, 1)], PieceKind::I);
        assert_eq!(board.occupied_count(), 3);
        assert_eq!(board.get(1, 1), Cell::Piece(PieceKind::I));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_fill_cells_above_top_panics() {
        Board::standard().fill_cells([(3, -1)], PieceKind::T);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_fill_cells_below_floor_panics() {
        let mut board = Board::new(3, 3).unwrap();
        board.fill_cells([(0, 2), (0, 3)], PieceKind::O);
    }
}
