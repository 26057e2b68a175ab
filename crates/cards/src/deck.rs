use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;
use rand::Rng;
use rand::seq::SliceRandom;

/// An ordered, mutable pile of cards with pop-from-top draw semantics.
///
/// Built from the full rank × suit cross product, optionally minus excluded
/// ranks, then uniformly shuffled with the caller's generator. Each session
/// owns exactly one deck and destroys it with the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// A shuffled 52-card deck.
    pub fn standard<R: Rng>(rng: &mut R) -> Self {
        Self::excluding(&[], rng)
    }
    /// A shuffled deck with every card of the given ranks removed.
    pub fn excluding<R: Rng>(excluded: &[Rank], rng: &mut R) -> Self {
        let mut cards = Suit::all()
            .into_iter()
            .flat_map(|s| Rank::all().into_iter().map(move |r| Card::from((r, s))))
            .filter(|c| !excluded.contains(&c.rank()))
            .collect::<Vec<_>>();
        cards.shuffle(rng);
        Self(cards)
    }
    /// Draws and removes the top card, if any remains.
    ///
    /// Unattended (timer-driven) loops must treat `None` as a graceful
    /// end of the encompassing game, never as a fault.
    pub fn draw(&mut self) -> Option<Card> {
        self.0.pop()
    }
    /// Draws up to n cards from the top.
    pub fn take(&mut self, n: usize) -> Vec<Card> {
        (0..n).filter_map(|_| self.draw()).collect()
    }
    /// Removes and returns n uniformly random cards, e.g. hidden markers.
    pub fn extract<R: Rng>(&mut self, n: usize, rng: &mut R) -> Vec<Card> {
        (0..n)
            .filter_map(|_| match self.0.len() {
                0 => None,
                len => Some(self.0.swap_remove(rng.random_range(0..len))),
            })
            .collect()
    }
    /// Returns cards to the pile, e.g. recycled draws between attempts.
    pub fn restore(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.0.extend(cards);
    }
    /// Re-shuffles the remaining pile in place.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.0.shuffle(rng);
    }
    /// Tests whether a card is still in the deck.
    pub fn contains(&self, card: &Card) -> bool {
        self.0.contains(card)
    }
    /// Cards left in the pile.
    pub fn remaining(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fixed-order deck for deterministic tests: the last card is drawn first.
impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards)
    }
}

impl From<Deck> for Vec<Card> {
    fn from(deck: Deck) -> Self {
        deck.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    #[test]
    fn complete_build() {
        let mut rng = SmallRng::seed_from_u64(0);
        let deck = Deck::standard(&mut rng);
        let unique = Vec::from(deck.clone()).into_iter().collect::<HashSet<_>>();
        assert_eq!(deck.remaining(), 52);
        assert_eq!(unique.len(), 52);
    }

    #[test]
    fn excluded_ranks_removed() {
        let mut rng = SmallRng::seed_from_u64(0);
        let deck = Deck::excluding(&[Rank::Ace, Rank::Two], &mut rng);
        assert_eq!(deck.remaining(), 52 - 4 * 2);
        assert!(
            Vec::from(deck)
                .iter()
                .all(|c| c.rank() != Rank::Ace && c.rank() != Rank::Two)
        );
    }

    #[test]
    fn draw_pops_from_top() {
        let cards = vec![
            Card::try_from("2C").unwrap(),
            Card::try_from("AS").unwrap(),
        ];
        let mut deck = Deck::from(cards);
        assert_eq!(deck.draw(), Some(Card::try_from("AS").unwrap()));
        assert_eq!(deck.draw(), Some(Card::try_from("2C").unwrap()));
        assert_eq!(deck.draw(), None);
    }

    #[test]
    fn extract_removes_from_pile() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut deck = Deck::standard(&mut rng);
        let markers = deck.extract(4, &mut rng);
        assert_eq!(markers.len(), 4);
        assert_eq!(deck.remaining(), 48);
        assert!(markers.iter().all(|m| !deck.contains(m)));
    }

    #[test]
    fn restore_returns_cards() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut deck = Deck::standard(&mut rng);
        let drawn = deck.take(5);
        deck.restore(drawn);
        assert_eq!(deck.remaining(), 52);
    }
}
