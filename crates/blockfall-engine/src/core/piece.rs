use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest side length of any piece matrix (the I-piece).
pub const MAX_SHAPE_SIZE: usize = 4;

/// Enum representing the type of piece.
///
/// The discriminant is the cell id written into the board when a piece of this
/// kind settles, and also the index into the color table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 1,
    /// J-piece.
    J = 2,
    /// L-piece.
    L = 3,
    /// O-piece.
    O = 4,
    /// S-piece.
    S = 5,
    /// T-piece.
    T = 6,
    /// Z-piece.
    Z = 7,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds in id order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Returns the cell id of this kind (1..=7).
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks up a piece kind by its cell id.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_id(4), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_id(0), None);
    /// assert_eq!(PieceKind::from_id(8), None);
    /// ```
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(PieceKind::I),
            2 => Some(PieceKind::J),
            3 => Some(PieceKind::L),
            4 => Some(PieceKind::O),
            5 => Some(PieceKind::S),
            6 => Some(PieceKind::T),
            7 => Some(PieceKind::Z),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize - 1
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::T => 'T',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'T' => Some(PieceKind::T),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Returns the display color of this kind as a `#RRGGBB` string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        PIECE_COLORS[self.index()]
    }

    /// Returns a fresh copy of this kind's canonical shape.
    #[must_use]
    pub const fn shape(self) -> Shape {
        CANONICAL_SHAPES[self.index()]
    }
}

/// Returns the number of distinct pieces in the catalog.
#[must_use]
pub const fn piece_count() -> usize {
    PieceKind::LEN
}

/// Returns a fresh copy of the canonical shape for `kind`.
///
/// The returned value is owned by the caller; rotating it never affects the
/// catalog.
#[must_use]
pub const fn shape_of(kind: PieceKind) -> Shape {
    kind.shape()
}

/// Picks a piece kind uniformly at random.
pub fn pick_random<R>(rng: &mut R) -> PieceKind
where
    R: Rng + ?Sized,
{
    rng.random()
}

/// A single cell of the board or of a piece matrix.
///
/// Serializes as its numeric value: `0` for empty, `1..=7` for the piece id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a piece of the given kind.
    Piece(PieceKind),
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[must_use]
    pub const fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub const fn piece(self) -> Option<PieceKind> {
        match self {
            Cell::Empty => None,
            Cell::Piece(kind) => Some(kind),
        }
    }

    /// Returns the numeric cell value (0 for empty, piece id otherwise).
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Piece(kind) => kind.id(),
        }
    }

    /// Parses a numeric cell value, returning `None` outside `0..=7`.
    #[must_use]
    pub const fn from_value(value: u8) -> Option<Self> {
        if value == 0 {
            return Some(Cell::Empty);
        }
        match PieceKind::from_id(value) {
            Some(kind) => Some(Cell::Piece(kind)),
            None => None,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Cell::from_value(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid cell value: {value}")))
    }
}

/// Square matrix of cells describing one piece in one orientation.
///
/// Storage is a fixed 4×4 array; only the top-left `size × size` block is
/// meaningful. `Shape` is `Copy`, so every binding is an independent working
/// copy that can be rotated in place.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceKind, shape_of};
///
/// let mut shape = shape_of(PieceKind::T);
/// shape.rotate_right();
/// assert_ne!(shape, shape_of(PieceKind::T));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    size: usize,
    cells: [[Cell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    const fn new_const(size: usize, cells: [[Cell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE]) -> Self {
        assert!(size > 0 && size <= MAX_SHAPE_SIZE);
        Self { size, cells }
    }

    /// Builds a shape from rows of numeric cell values.
    ///
    /// Returns `None` if the matrix is not square, is larger than
    /// [`MAX_SHAPE_SIZE`], is empty, or contains a value outside `0..=7`.
    #[must_use]
    pub fn from_values<R>(rows: &[R]) -> Option<Self>
    where
        R: AsRef<[u8]>,
    {
        let size = rows.len();
        if size == 0 || size > MAX_SHAPE_SIZE {
            return None;
        }
        let mut cells = [[Cell::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != size {
                return None;
            }
            for (x, &value) in row.iter().enumerate() {
                cells[y][x] = Cell::from_value(value)?;
            }
        }
        Some(Self { size, cells })
    }

    /// Returns the side length of the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the cell at column `x`, row `y` of the matrix.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        assert!(x < self.size && y < self.size, "({x}, {y}) outside shape");
        self.cells[y][x]
    }

    /// Returns an iterator over the rows of the matrix.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells[..self.size].iter().map(|row| &row[..self.size])
    }

    /// Returns the occupied cells as `(dx, dy, kind)` offsets from the
    /// top-left corner.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize, PieceKind)> + '_ {
        self.rows().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(dx, cell)| cell.piece().map(|kind| (dx, dy, kind)))
        })
    }

    /// Rotates the matrix 90° clockwise in place.
    ///
    /// Implemented as a transpose followed by reversing every row.
    pub fn rotate_right(&mut self) {
        let n = self.size;
        for y in 0..n {
            for x in 0..y {
                let tmp = self.cells[y][x];
                self.cells[y][x] = self.cells[x][y];
                self.cells[x][y] = tmp;
            }
        }
        for row in &mut self.cells[..n] {
            row[..n].reverse();
        }
    }

    /// Like [`Self::rotate_right`], but returns the rotated copy.
    #[must_use]
    pub fn rotated_right(mut self) -> Self {
        self.rotate_right();
        self
    }

    /// Returns the matrix as rows of numeric cell values.
    #[must_use]
    pub fn to_values(&self) -> Vec<Vec<u8>> {
        self.rows()
            .map(|row| row.iter().map(|cell| cell.value()).collect())
            .collect()
    }
}

const PIECE_COLORS: [&str; PieceKind::LEN] = [
    "#FF0D72", // I
    "#0DC2FF", // J
    "#0DFF72", // L
    "#F538FF", // O
    "#FF8E0D", // S
    "#FFE138", // T
    "#3877FF", // Z
];

const CANONICAL_SHAPES: [Shape; PieceKind::LEN] = {
    use Cell::Empty as E;
    const I: Cell = Cell::Piece(PieceKind::I);
    const J: Cell = Cell::Piece(PieceKind::J);
    const L: Cell = Cell::Piece(PieceKind::L);
    const O: Cell = Cell::Piece(PieceKind::O);
    const S: Cell = Cell::Piece(PieceKind::S);
    const T: Cell = Cell::Piece(PieceKind::T);
    const Z: Cell = Cell::Piece(PieceKind::Z);
    const EEEE: [Cell; 4] = [E; 4];
    [
        // I-piece
        Shape::new_const(4, [EEEE, [I, I, I, I], EEEE, EEEE]),
        // J-piece
        Shape::new_const(3, [[J, E, E, E], [J, J, J, E], EEEE, EEEE]),
        // L-piece
        Shape::new_const(3, [[E, E, L, E], [L, L, L, E], EEEE, EEEE]),
        // O-piece
        Shape::new_const(2, [[O, O, E, E], [O, O, E, E], EEEE, EEEE]),
        // S-piece
        Shape::new_const(3, [[E, S, S, E], [S, S, E, E], EEEE, EEEE]),
        // T-piece
        Shape::new_const(3, [[E, T, E, E], [T, T, T, E], EEEE, EEEE]),
        // Z-piece
        Shape::new_const(3, [[Z, Z, E, E], [E, Z, Z, E], EEEE, EEEE]),
    ]
};
