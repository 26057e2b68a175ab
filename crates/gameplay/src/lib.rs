//! Pure game logic for the three prosit drinking games.
//!
//! Everything here is a synchronous, deterministic state machine; the async
//! shell in `prosit-gameroom` drives these cores and owns all timing and
//! persistence concerns.
//!
//! ## Engines
//!
//! - [`Game`] — Round-robin guessing game over four themed rounds
//! - [`Ladder`] — Single-player draw-and-compare endgame with retries
//! - [`Race`] — Card-driven four-horse race with checkpoint blockades
//!
//! ## Rules
//!
//! - [`Rule`] — Tagged per-round rule with a uniform `evaluate` interface
//! - [`Guess`] — A player's answer, one variant per rule family
//! - [`Outcome`] — Resolved draw: correctness, points, and sip quantities
//!
//! Randomness (shuffles, samples, tie-breaks) always flows through an
//! injected [`rand::Rng`], so a seeded generator makes every game replayable.
mod game;
mod guess;
mod ladder;
mod race;
mod rule;

pub use game::*;
pub use guess::*;
pub use ladder::*;
pub use race::*;
pub use rule::*;
