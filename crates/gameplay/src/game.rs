use super::guess::Guess;
use super::rule::Rule;
use super::rule::RuleError;
use prosit_cards::Card;
use prosit_cards::Deck;
use prosit_core::Points;
use prosit_core::PlayerId;
use prosit_core::Seat;
use prosit_core::Sips;
use rand::Rng;
use rand::seq::IndexedRandom;

/// The fully resolved result of one guess: the drawn card, whether the
/// guess hit, the points banked, and the sip quantity to announce (given
/// out when correct, drunk when wrong — display only, never persisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub card: Card,
    pub guess: Guess,
    pub correct: bool,
    pub points: Points,
    pub sips: Sips,
}

/// Where the turn engine currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// The current player owes a guess.
    Guessing,
    /// The last guess resolved; waiting for (or timing out into) advance.
    Advancing,
    /// All rounds played, or the deck ran dry.
    Finished,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("not this player's turn")]
    NotCurrentPlayer,
    #[error("action does not apply in the current phase")]
    WrongPhase,
    #[error("the deck is exhausted")]
    DeckExhausted,
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// One player's standing within a game: identity, full drawn history, and
/// accumulated score. The drawn history spans rounds — the range rule of
/// round three ranges over everything drawn so far.
#[derive(Debug, Clone)]
pub struct Standing {
    id: PlayerId,
    cards: Vec<Card>,
    points: Points,
}

impl Standing {
    fn new(id: PlayerId) -> Self {
        Self {
            id,
            cards: Vec::new(),
            points: 0,
        }
    }
    pub fn id(&self) -> PlayerId {
        self.id
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    pub fn points(&self) -> Points {
        self.points
    }
}

/// Round-robin turn engine for the main card game.
///
/// Functional core: every transition is a synchronous method on owned
/// state. The async shell in the gameroom serializes callers and owns the
/// auto-advance timer; this type never blocks or sleeps.
///
/// The player list freezes at construction — the lobby handles joins and
/// leaves, and late joins mid-game are impossible by construction.
#[derive(Debug, Clone)]
pub struct Game {
    standings: Vec<Standing>,
    deck: Deck,
    round: usize,
    rounds: usize,
    turn: Seat,
    phase: Phase,
    last: Option<Outcome>,
    aborted: bool,
}

impl Game {
    /// Starts a game over a frozen, non-empty player list.
    pub fn new(players: Vec<PlayerId>, deck: Deck, rounds: usize) -> Self {
        debug_assert!(!players.is_empty());
        Self {
            standings: players.into_iter().map(Standing::new).collect(),
            deck,
            round: 1,
            rounds,
            turn: 0,
            phase: Phase::Guessing,
            last: None,
            aborted: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
    /// 1-based round counter.
    pub fn round(&self) -> usize {
        self.round
    }
    pub fn rounds(&self) -> usize {
        self.rounds
    }
    /// The rule in play this round.
    pub fn rule(&self) -> Rule {
        Rule::of(self.round)
    }
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }
    /// The player whose turn it is. None once finished.
    pub fn current(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::Finished => None,
            _ => self.standings.get(self.turn).map(Standing::id),
        }
    }
    /// The most recent resolved outcome, cleared on advance.
    pub fn last(&self) -> Option<&Outcome> {
        self.last.as_ref()
    }
    /// True when the game ended by deck exhaustion rather than play.
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Resolves the current player's guess against a fresh draw.
    ///
    /// Deck exhaustion aborts the game in place: the engine flips to
    /// `Finished` with no loser, and the caller reports a drawn game.
    pub fn resolve(&mut self, player: PlayerId, guess: Guess) -> Result<Outcome, GameError> {
        if self.phase != Phase::Guessing {
            return Err(GameError::WrongPhase);
        }
        if self.current() != Some(player) {
            return Err(GameError::NotCurrentPlayer);
        }
        let Some(card) = self.deck.draw() else {
            self.phase = Phase::Finished;
            self.aborted = true;
            return Err(GameError::DeckExhausted);
        };
        let rule = self.rule();
        let standing = &mut self.standings[self.turn];
        let verdict = match rule.evaluate(&standing.cards, card, &guess) {
            Ok(verdict) => verdict,
            Err(e) => {
                self.deck.restore([card]);
                return Err(e.into());
            }
        };
        standing.cards.push(card);
        standing.points += verdict.points;
        let outcome = Outcome {
            card,
            guess,
            correct: verdict.correct,
            points: verdict.points,
            sips: match verdict.correct {
                true => rule.reward(&guess),
                false => rule.forfeit(&guess),
            },
        };
        self.last = Some(outcome);
        self.phase = Phase::Advancing;
        Ok(outcome)
    }

    /// Moves to the next player, wrapping into the next round and finishing
    /// after the last. Only valid while awaiting advance.
    pub fn advance(&mut self) -> Result<Phase, GameError> {
        if self.phase != Phase::Advancing {
            return Err(GameError::WrongPhase);
        }
        self.last = None;
        self.turn += 1;
        if self.turn == self.standings.len() {
            self.turn = 0;
            self.round += 1;
        }
        self.phase = match self.round > self.rounds {
            true => Phase::Finished,
            false => Phase::Guessing,
        };
        Ok(self.phase)
    }

    /// Final scores in seating order.
    pub fn scores(&self) -> Vec<(PlayerId, Points)> {
        self.standings.iter().map(|s| (s.id, s.points)).collect()
    }

    /// Picks the losing player: the minimum scorer, ties broken uniformly
    /// at random. None until the game finishes, or if it aborted.
    pub fn loser<R: Rng>(&self, rng: &mut R) -> Option<PlayerId> {
        if self.phase != Phase::Finished || self.aborted {
            return None;
        }
        let lowest = self.standings.iter().map(Standing::points).min()?;
        let candidates = self
            .standings
            .iter()
            .filter(|s| s.points == lowest)
            .map(Standing::id)
            .collect::<Vec<_>>();
        candidates.choose(rng).copied()
    }
}
