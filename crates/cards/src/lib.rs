//! Playing card primitives for the prosit drinking games.
//!
//! ## Core Types
//!
//! - [`Card`] — A single card as a `(Rank, Suit)` tuple encoded in one byte
//! - [`Rank`] — One of 13 face values with a fixed total order
//! - [`Suit`] — One of 4 suits, partitioned into two [`Color`]s
//! - [`Deck`] — An ordered, shuffled pile with pop-from-top draws
//!
//! Decks are built from an injected [`rand::Rng`] so every shuffle and
//! sample is reproducible under a seeded generator.
mod card;
mod deck;
mod rank;
mod suit;

pub use card::*;
pub use deck::*;
pub use rank::*;
pub use suit::*;
