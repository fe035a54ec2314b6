//! Board geometry, piece shapes and collision detection.
//!
//! Everything in this module is pure data plus the operations that keep it
//! consistent. Nothing here knows about timing, scoring or session state; see
//! [`crate::engine`] for that.

pub use self::{board::*, collision::*, piece::*};

pub(crate) mod board;
pub(crate) mod collision;
pub(crate) mod piece;

/// Width of the standard playfield in cells.
pub const BOARD_WIDTH: usize = 10;
/// Height of the standard playfield in cells.
pub const BOARD_HEIGHT: usize = 20;
