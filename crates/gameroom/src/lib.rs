//! Async session coordinator for the drinking games.
//!
//! Each guild gets at most one live session per game type, tracked in a
//! [`Registry`] and fronted by the [`Rooms`] facade. Rooms are imperative
//! shells over the functional cores in `prosit-gameplay`: they own
//! concurrency (per-session mutex, auto-advance timer, race ticker),
//! persistence hand-off, and the render models the presentation layer
//! redraws from.
//!
//! ## Rooms
//!
//! - [`CardRoom`] — Lobby, round game, and the loser's ladder endgame
//! - [`RaceRoom`] — Betting lobby plus the self-driving race ticker
//! - [`Rooms`] — Per-guild registry facade, the crate's entry point
//!
//! ## Support
//!
//! - [`Rules`] / [`Timing`] — Overridable game-shape and timer config
//! - [`Countdown`] — Generation counter behind the auto-advance timer
//! - [`TableView`] / [`LadderView`] / [`RaceView`] — Render models, each
//!   carrying a [`NextStep`] signal
mod config;
mod error;
mod race;
mod registry;
mod room;
mod rooms;
mod timer;
mod view;

pub use config::*;
pub use error::*;
pub use race::*;
pub use registry::*;
pub use room::*;
pub use rooms::*;
pub use timer::*;
pub use view::*;
