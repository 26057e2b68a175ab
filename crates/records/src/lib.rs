//! Ranking store boundary.
//!
//! The game rooms call into a [`Recorder`] at well-defined points (game
//! finish, ladder completion, race settle) and never read rankings back for
//! their own logic; leaderboard queries exist for the presentation layer.
//! [`MemoryStore`] is the reference implementation.
mod record;
mod store;

pub use record::*;
pub use store::*;
