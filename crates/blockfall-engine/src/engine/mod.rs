//! Game rules layered on top of [`crate::core`].
//!
//! - [`PieceController`] - the active piece and its guarded moves
//! - [`GameSession`] - the `Ready → Running ⇄ Paused → GameOver` state machine
//! - [`GameStats`] - score, speed progression and lock statistics
//! - [`PieceSource`] - where new pieces come from ([`RandomPieceSource`],
//!   [`SequencePieceSource`] or any closure)
//! - [`SessionSnapshot`] - serializable view for presentation layers
//!
//! # Game Flow
//!
//! 1. [`GameSession::start`] empties the board and spawns the first piece
//! 2. The caller feeds elapsed time to [`GameSession::advance`] and forwards
//!    player input as commands
//! 3. A piece that cannot move down locks, full rows are cleared and scored
//! 4. The next piece spawns; if it collides immediately the game is over
//!
//! # Example
//!
//! ```
//! use blockfall_engine::{GameSession, PieceSeed};
//!
//! let mut session = GameSession::with_seed(PieceSeed::from_u128(1));
//! session.start();
//!
//! while session.state().is_running() {
//!     session.rotate();
//!     session.hard_drop();
//! }
//! assert!(session.state().is_game_over());
//! ```

pub use self::{
    game_session::*, game_stats::*, piece_controller::*, piece_source::*, snapshot::*,
};

mod game_session;
mod game_stats;
mod piece_controller;
mod piece_source;
mod snapshot;
