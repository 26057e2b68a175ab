use prosit_cards::Card;
use prosit_cards::Suit;
use prosit_core::GuildId;
use prosit_core::PlayerId;
use prosit_core::Points;
use prosit_core::Sips;
use prosit_gameplay::Entrant;
use prosit_gameplay::Outcome;
use prosit_gameplay::Payout;

/// The "what to do next" signal attached to every render model. Carries
/// enough data for the presentation layer to wire up its widgets without
/// reaching back into room internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum NextStep {
    /// Lobby open; keep offering join until enough players arrive.
    AwaitPlayers { joined: usize, required: usize },
    /// Offer this round's guess options to the current player.
    AwaitGuess { player: PlayerId, round: usize },
    /// Show the resolved draw; advance on click or after the timeout.
    AwaitAdvance { player: PlayerId, timeout_ms: u64 },
    /// The rounds are over; the loser drives the ladder next.
    LadderReady { loser: PlayerId },
    /// Offer higher/lower/equal against the current rung's card.
    AwaitClimb { rung: usize },
    /// Show the failed climb until the driver acknowledges it.
    AwaitRetry { penalty: Sips },
    /// The ladder is complete and the session is over.
    LadderDone { attempts: u32, sips: Sips },
    /// Race lobby open; entrants still picking horses and stakes.
    AwaitEntrants { joined: usize, required: usize },
    /// Race ticking in the background; follow the watch subscription.
    Racing,
    /// Race decided; payouts are final.
    RaceDone { winner: Suit },
    /// Session ended without a normal finish.
    Aborted,
}

/// Render model for the round game table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TableView {
    pub guild: GuildId,
    pub round: usize,
    pub rounds: usize,
    pub players: Vec<PlayerId>,
    pub scores: Vec<(PlayerId, Points)>,
    pub last: Option<Outcome>,
    pub next: NextStep,
}

/// Render model for the ladder endgame.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LadderView {
    pub guild: GuildId,
    pub driver: PlayerId,
    pub rung: usize,
    pub rungs: usize,
    /// Face-up prefix of the fixed top cards, one past the highest rung
    /// ever reached.
    pub revealed: Vec<Card>,
    /// Comparison cards drawn during the current climb.
    pub drawn: Vec<Card>,
    pub attempts: u32,
    pub sips: Sips,
    pub next: NextStep,
}

/// Render model for the horse race, published on every tick.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RaceView {
    pub guild: GuildId,
    pub finish: u8,
    pub progress: Vec<(Suit, u8)>,
    /// Checkpoint levels whose blockade has already flipped, ascending.
    pub flipped: Vec<u8>,
    pub last: Option<Card>,
    pub entrants: Vec<Entrant>,
    pub payouts: Vec<Payout>,
    pub next: NextStep,
}
