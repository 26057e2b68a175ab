//! Core type aliases, identity types, and tuning constants for prosit.
//!
//! This crate provides the foundational types and configuration parameters
//! used throughout the prosit workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Opaque platform guild (server) identifier. Never normalized, round-trips
/// exactly as received from the presentation layer.
pub type GuildId = u64;
/// Opaque platform user identifier.
pub type PlayerId = u64;
/// Accumulated score in the round-robin card game.
pub type Points = i32;
/// Drink penalty quantities (sips to give or drink).
pub type Sips = i32;
/// Seat index in a session's frozen turn order.
pub type Seat = usize;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// GAME PARAMETERS
// Defaults only: every one of these is overridable through the gameroom
// config structs so tests can run with compressed timers and short games.
// ============================================================================
/// Rounds in the round-robin card game (color, order, range, suit).
pub const ROUNDS: usize = 4;
/// Rungs in the ladder endgame.
pub const LADDER_RUNGS: usize = 5;
/// Distance a horse must travel to win the race.
pub const RACE_FINISH: u8 = 5;
/// Checkpoint levels carrying a hidden blockade (1..=4).
pub const BLOCKADE_COUNT: usize = 4;
/// Minimum players required to start the card game.
pub const MIN_PLAYERS: usize = 2;
/// Minimum entrants required to start a race.
pub const MIN_ENTRANTS: usize = 1;
/// Smallest allowed race stake.
pub const STAKE_MIN: Sips = 1;
/// Largest allowed race stake.
pub const STAKE_MAX: Sips = 10;
/// Seconds before an unanswered "next turn" prompt auto-advances.
pub const ADVANCE_TIMEOUT: u64 = 5;
/// Seconds between autonomous race ticks.
pub const TICK_INTERVAL: u64 = 2;
/// Default leaderboard depth.
pub const LEADERBOARD_LIMIT: usize = 10;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
