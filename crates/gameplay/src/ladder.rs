use super::guess::Order;
use prosit_cards::Card;
use prosit_cards::Deck;
use prosit_core::Sips;
use rand::Rng;

/// What one ladder guess produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    /// Correct: moved up to the given 0-based rung.
    Climbed { card: Card, rung: usize },
    /// Wrong: drank the penalty and fell back to the bottom. A retry is
    /// required before guessing again.
    Failed { card: Card, penalty: Sips },
    /// Correct on the final rung: the run is over.
    Completed { card: Card },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderError {
    #[error("the ladder is already complete")]
    Complete,
    #[error("acknowledge the failed attempt before guessing again")]
    PendingRetry,
    #[error("there is no failed attempt to retry")]
    NoFailure,
}

/// The loser's endgame: climb a fixed sequence of hidden cards by guessing
/// higher/lower/equal against each, restarting from the bottom on a miss.
///
/// A miss at rung i costs i+1 sips, bumps the attempt counter, and clears
/// the comparison draws. The top cards stay fixed for the whole run and are
/// revealed progressively up to one past the highest rung ever reached.
#[derive(Debug, Clone)]
pub struct Ladder {
    deck: Deck,
    tops: Vec<Card>,
    drawn: Vec<Card>,
    rung: usize,
    rungs: usize,
    attempts: u32,
    sips: Sips,
    highest: usize,
    failed: bool,
}

impl Ladder {
    /// Pre-draws the top cards from a fresh full deck.
    pub fn new<R: Rng>(rungs: usize, rng: &mut R) -> Self {
        let mut deck = Deck::standard(rng);
        let tops = deck.take(rungs);
        Self {
            deck,
            tops,
            drawn: Vec::new(),
            rung: 0,
            rungs,
            attempts: 1,
            sips: 0,
            highest: 0,
            failed: false,
        }
    }

    pub fn rung(&self) -> usize {
        self.rung
    }
    pub fn rungs(&self) -> usize {
        self.rungs
    }
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
    pub fn sips(&self) -> Sips {
        self.sips
    }
    pub fn tops(&self) -> &[Card] {
        &self.tops
    }
    pub fn drawn(&self) -> &[Card] {
        &self.drawn
    }
    /// A failed guess is pending acknowledgement.
    pub fn failed(&self) -> bool {
        self.failed
    }
    pub fn complete(&self) -> bool {
        self.rung == self.rungs
    }
    /// How many top cards are face up: one past the highest rung reached.
    pub fn revealed(&self) -> usize {
        (self.highest + 1).min(self.rungs)
    }

    /// Draws a comparison card against the current rung's top card.
    ///
    /// On failure the penalty equals the 1-based rung, the run resets to
    /// the bottom, and the spent comparison cards are shuffled back into
    /// the deck so the pile can never run dry across attempts.
    pub fn guess<R: Rng>(&mut self, order: Order, rng: &mut R) -> Result<Step, LadderError> {
        if self.complete() {
            return Err(LadderError::Complete);
        }
        if self.failed {
            return Err(LadderError::PendingRetry);
        }
        let top = self.tops[self.rung].rank();
        let card = self.deck.draw().expect("deck recycles between attempts");
        let correct = match order {
            Order::Equal => card.rank() == top,
            Order::Higher => card.rank() > top,
            Order::Lower => card.rank() < top,
        };
        match correct {
            true => {
                self.drawn.push(card);
                self.rung += 1;
                self.highest = self.highest.max(self.rung);
                match self.complete() {
                    true => Ok(Step::Completed { card }),
                    false => Ok(Step::Climbed {
                        card,
                        rung: self.rung,
                    }),
                }
            }
            false => {
                let penalty = self.rung as Sips + 1;
                self.sips += penalty;
                self.attempts += 1;
                self.rung = 0;
                self.failed = true;
                self.deck.restore(self.drawn.drain(..));
                self.deck.restore([card]);
                self.deck.shuffle(rng);
                Ok(Step::Failed { card, penalty })
            }
        }
    }

    /// Clears the pending-failure flag so a fresh climb can begin. The
    /// penalty bookkeeping already happened at failure time.
    pub fn retry(&mut self) -> Result<(), LadderError> {
        match self.failed {
            true => {
                self.failed = false;
                Ok(())
            }
            false => Err(LadderError::NoFailure),
        }
    }
}
