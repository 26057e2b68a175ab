use prosit_cards::Card;
use prosit_cards::Deck;
use prosit_cards::Rank;
use prosit_cards::Suit;
use prosit_core::PlayerId;
use prosit_core::Sips;
use rand::Rng;

/// A hidden setback card sitting beside one level of the track. It flips
/// face up the first time every horse has passed its level, and sends the
/// horse of its own suit back to the start.
#[derive(Debug, Clone, Copy)]
struct Blockade {
    level: u8,
    target: Suit,
    revealed: bool,
}

/// A bet placed before the start: one player backs one suit for a stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entrant {
    pub player: PlayerId,
    pub horse: Suit,
    pub stake: Sips,
}

/// Sips a winning backer gets to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payout {
    pub player: PlayerId,
    pub sips: Sips,
}

/// What a single simulation step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick {
    /// The card drawn this step; its suit's horse advanced one level.
    pub card: Card,
    /// A blockade that flipped this step, as (level, suit sent back).
    pub blockade: Option<(u8, Suit)>,
    /// Set once a horse crosses the finish line.
    pub winner: Option<Suit>,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceError {
    #[error("the race has already been decided")]
    Finished,
    #[error("the race deck ran out before any horse finished")]
    DeckExhausted,
}

/// The four-suit horse race. Aces are the horses, so the draw pile excludes
/// them; a handful of face-down blockade cards line the track and each one
/// fires at most once.
#[derive(Debug, Clone)]
pub struct Race {
    deck: Deck,
    blockades: Vec<Blockade>,
    progress: [u8; 4],
    finish: u8,
    /// Levels every horse has reached at least once, tracked per horse so a
    /// blockade reset cannot re-arm a spent level.
    reached: [u8; 4],
    winner: Option<Suit>,
}

impl Race {
    /// Deals the track: an ace-free pile plus `checkpoints` random cards
    /// pulled out to serve as blockades at levels 1..=checkpoints. Each
    /// blockade targets the suit of its own hidden card, which can be the
    /// same suit twice over and can even knock back the current leader.
    pub fn new<R: Rng>(finish: u8, checkpoints: usize, rng: &mut R) -> Self {
        let mut deck = Deck::excluding(&[Rank::Ace], rng);
        let blockades = deck
            .extract(checkpoints, rng)
            .into_iter()
            .enumerate()
            .map(|(i, card)| Blockade {
                level: i as u8 + 1,
                target: card.suit(),
                revealed: false,
            })
            .collect();
        Self {
            deck,
            blockades,
            progress: [0; 4],
            finish,
            reached: [0; 4],
            winner: None,
        }
    }

    pub fn finish(&self) -> u8 {
        self.finish
    }
    pub fn progress(&self, horse: Suit) -> u8 {
        self.progress[u8::from(horse) as usize]
    }
    pub fn winner(&self) -> Option<Suit> {
        self.winner
    }
    /// Levels whose blockade has already flipped, in ascending order.
    pub fn flipped(&self) -> Vec<u8> {
        self.blockades
            .iter()
            .filter(|b| b.revealed)
            .map(|b| b.level)
            .collect()
    }

    /// Advances one step: draw a card, move its horse, then flip at most
    /// one blockade (the lowest armed level the whole field has cleared).
    pub fn tick(&mut self) -> Result<Tick, RaceError> {
        if self.winner.is_some() {
            return Err(RaceError::Finished);
        }
        let card = self.deck.draw().ok_or(RaceError::DeckExhausted)?;
        let horse = u8::from(card.suit()) as usize;
        self.progress[horse] += 1;
        for (suit, level) in self.progress.iter().enumerate() {
            self.reached[suit] = self.reached[suit].max(*level);
        }
        if self.progress[horse] >= self.finish {
            self.winner = Some(card.suit());
            return Ok(Tick {
                card,
                blockade: None,
                winner: self.winner,
            });
        }
        let blockade = self.spring();
        Ok(Tick {
            card,
            blockade,
            winner: None,
        })
    }

    /// Flips the lowest unrevealed blockade whose level every horse has
    /// reached, knocking its target back to the start. One per tick.
    fn spring(&mut self) -> Option<(u8, Suit)> {
        let field = *self.reached.iter().min().unwrap_or(&0);
        self.blockades.sort_by_key(|b| b.level);
        for b in self.blockades.iter_mut() {
            if !b.revealed && b.level <= field {
                b.revealed = true;
                self.progress[u8::from(b.target) as usize] = 0;
                return Some((b.level, b.target));
            }
        }
        None
    }

    /// Pays every backer of the winning horse twice their stake. Must only
    /// be called after the race is decided.
    pub fn settle(&self, entrants: &[Entrant]) -> Result<Vec<Payout>, RaceError> {
        let winner = self.winner.ok_or(RaceError::Finished)?;
        Ok(entrants
            .iter()
            .filter(|e| e.horse == winner)
            .map(|e| Payout {
                player: e.player,
                sips: e.stake * 2,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pile(cards: Vec<&str>) -> Deck {
        Deck::from(
            cards
                .iter()
                .rev() // listed in draw order; the deck pops from the back
                .map(|s| Card::try_from(*s).unwrap())
                .collect::<Vec<_>>(),
        )
    }

    fn fixed(finish: u8, blockades: Vec<(u8, Suit)>, cards: Vec<&str>) -> Race {
        Race {
            deck: pile(cards),
            blockades: blockades
                .into_iter()
                .map(|(level, target)| Blockade {
                    level,
                    target,
                    revealed: false,
                })
                .collect(),
            progress: [0; 4],
            finish,
            reached: [0; 4],
            winner: None,
        }
    }

    #[test]
    fn first_horse_at_finish_wins() {
        let mut race = fixed(2, vec![], vec!["2H", "3H"]);
        assert_eq!(race.tick().unwrap().winner, None);
        let tick = race.tick().unwrap();
        assert_eq!(tick.winner, Some(Suit::H));
        assert_eq!(race.winner(), Some(Suit::H));
        assert_eq!(race.tick(), Err(RaceError::Finished));
    }

    #[test]
    fn race_deck_has_no_aces() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        let race = Race::new(5, 4, &mut rng);
        assert_eq!(race.blockades.len(), 4);
        assert_eq!(race.deck.remaining(), 48 - 4);
        for card in (0u8..52).map(Card::from) {
            if card.rank() == Rank::Ace {
                assert!(!race.deck.contains(&card));
            }
        }
    }

    #[test]
    fn blockade_fires_once_when_field_clears_its_level() {
        let mut race = fixed(
            5,
            vec![(1, Suit::C)],
            vec!["2H", "2D", "2S", "2C", "3H", "3C"],
        );
        // Three horses at level 1: the trailing club horse gates the flip.
        race.tick().unwrap();
        race.tick().unwrap();
        assert_eq!(race.tick().unwrap().blockade, None);
        // Clubs reach level 1, the blockade flips and resets them.
        let tick = race.tick().unwrap();
        assert_eq!(tick.blockade, Some((1, Suit::C)));
        assert_eq!(race.progress(Suit::C), 0);
        // A spent level never re-arms, even after the reset.
        assert_eq!(race.tick().unwrap().blockade, None);
        assert_eq!(race.tick().unwrap().blockade, None);
        assert_eq!(race.progress(Suit::C), 1);
    }

    #[test]
    fn blockades_flip_in_ascending_level_order() {
        // Blockades constructed out of order; level 1 must still flip first.
        let mut race = fixed(
            5,
            vec![(2, Suit::D), (1, Suit::H)],
            vec!["2H", "2D", "2S", "2C", "3H", "4H", "3D", "3S", "3C"],
        );
        for _ in 0..3 {
            assert_eq!(race.tick().unwrap().blockade, None);
        }
        assert_eq!(race.tick().unwrap().blockade, Some((1, Suit::H)));
        assert_eq!(race.progress(Suit::H), 0);
        // Level 2 waits until the reset horse catches back up to it.
        for _ in 0..4 {
            assert_eq!(race.tick().unwrap().blockade, None);
        }
        let tick = race.tick().unwrap();
        assert_eq!(tick.blockade, Some((2, Suit::D)));
        assert_eq!(race.progress(Suit::D), 0);
        assert_eq!(race.flipped(), vec![1, 2]);
    }

    #[test]
    fn blockade_may_target_self() {
        // The drawn suit advances and is immediately sent back by its own
        // blockade, legal by construction since targets come from random
        // marker cards.
        let mut race = fixed(
            5,
            vec![(1, Suit::C)],
            vec!["2H", "2D", "2S", "2C"],
        );
        race.tick().unwrap();
        race.tick().unwrap();
        race.tick().unwrap();
        let tick = race.tick().unwrap();
        assert_eq!(tick.card.suit(), Suit::C);
        assert_eq!(tick.blockade, Some((1, Suit::C)));
        assert_eq!(race.progress(Suit::C), 0);
    }

    #[test]
    fn empty_pile_without_winner_is_an_error() {
        let mut race = fixed(10, vec![], vec!["2H"]);
        race.tick().unwrap();
        assert_eq!(race.tick(), Err(RaceError::DeckExhausted));
    }

    #[test]
    fn settle_doubles_winning_stakes() {
        let mut race = fixed(1, vec![], vec!["2H"]);
        let entrants = [
            Entrant { player: 1, horse: Suit::H, stake: 2 },
            Entrant { player: 2, horse: Suit::S, stake: 3 },
            Entrant { player: 3, horse: Suit::H, stake: 5 },
        ];
        assert_eq!(race.settle(&entrants), Err(RaceError::Finished));
        race.tick().unwrap();
        let payouts = race.settle(&entrants).unwrap();
        assert_eq!(
            payouts,
            vec![
                Payout { player: 1, sips: 4 },
                Payout { player: 3, sips: 10 },
            ]
        );
    }
}
