use super::guess::Guess;
use super::guess::Order;
use super::guess::Range;
use prosit_cards::Card;
use prosit_core::Points;
use prosit_core::Sips;

/// The verdict of evaluating one guess against one drawn card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub points: Points,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    /// The guess belongs to a different round's rule family.
    #[error("guess does not apply to this round")]
    Mismatch,
    /// The rule needs at least one previously drawn card to compare against.
    #[error("no comparison card available")]
    NoComparison,
}

/// One of the four themed round rules, played in a fixed schedule.
///
/// Every rule resolves through the same interface: the player's previously
/// drawn cards, the freshly drawn card, and the guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rule {
    /// Round 1: red or black.
    Color,
    /// Round 2: higher, lower, or equal versus the previous card.
    Order,
    /// Round 3: inside, outside, or equal versus the span of all prior cards.
    Range,
    /// Round 4: name the exact suit.
    Suit,
}

impl Rule {
    /// The four-round schedule. Rounds past the schedule wrap around, which
    /// only matters when a game is configured with a nonstandard length.
    pub const SCHEDULE: [Rule; 4] = [Rule::Color, Rule::Order, Rule::Range, Rule::Suit];

    /// The rule in play for a 1-based round number.
    pub const fn of(round: usize) -> Rule {
        Self::SCHEDULE[(round - 1) % 4]
    }
    /// Base drink-penalty units for this rule.
    pub const fn penalty(&self) -> Sips {
        match self {
            Rule::Color => 1,
            Rule::Order => 2,
            Rule::Range => 3,
            Rule::Suit => 4,
        }
    }
    /// Sips the player hands out on a correct guess. Doubled for "equal"
    /// guesses and for the suit round.
    pub fn reward(&self, guess: &Guess) -> Sips {
        match guess.is_equal() || matches!(self, Rule::Suit) {
            true => self.penalty() * 2,
            false => self.penalty(),
        }
    }
    /// Sips the player drinks on a wrong guess. Doubled for "equal" guesses.
    pub fn forfeit(&self, guess: &Guess) -> Sips {
        match guess.is_equal() {
            true => self.penalty() * 2,
            false => self.penalty(),
        }
    }

    /// Resolves a guess against a freshly drawn card.
    ///
    /// `prior` is the player's full drawn history, oldest first; the range
    /// rule spans all of it and the order rule compares the most recent.
    pub fn evaluate(&self, prior: &[Card], drawn: Card, guess: &Guess) -> Result<Verdict, RuleError> {
        match (self, guess) {
            (Rule::Color, Guess::Color(color)) => Ok(Verdict {
                correct: drawn.color() == *color,
                points: if drawn.color() == *color { 10 } else { 0 },
            }),
            (Rule::Order, Guess::Order(order)) => {
                let prev = prior.last().ok_or(RuleError::NoComparison)?.rank();
                let cur = drawn.rank();
                Ok(match order {
                    Order::Equal => Verdict {
                        correct: cur == prev,
                        points: if cur == prev { 20 } else { -10 },
                    },
                    Order::Higher => Verdict {
                        correct: cur > prev,
                        points: if cur > prev { 10 } else { 0 },
                    },
                    Order::Lower => Verdict {
                        correct: cur < prev,
                        points: if cur < prev { 10 } else { 0 },
                    },
                })
            }
            (Rule::Range, Guess::Range(range)) => {
                let ranks = prior.iter().map(|c| c.rank()).collect::<Vec<_>>();
                let min = *ranks.iter().min().ok_or(RuleError::NoComparison)?;
                let max = *ranks.iter().max().ok_or(RuleError::NoComparison)?;
                let cur = drawn.rank();
                // A rank match trumps the range check: only "equal" can win.
                Ok(match ranks.contains(&cur) {
                    true => Verdict {
                        correct: *range == Range::Equal,
                        points: if *range == Range::Equal { 20 } else { 0 },
                    },
                    false => {
                        let correct = match range {
                            Range::Outside => cur < min || cur > max,
                            Range::Inside => min < cur && cur < max,
                            Range::Equal => false,
                        };
                        Verdict {
                            correct,
                            points: if correct { 10 } else { 0 },
                        }
                    }
                })
            }
            (Rule::Suit, Guess::Suit(suit)) => Ok(Verdict {
                correct: drawn.suit() == *suit,
                points: if drawn.suit() == *suit { 30 } else { 0 },
            }),
            _ => Err(RuleError::Mismatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosit_cards::Color;
    use prosit_cards::Suit;

    fn card(s: &str) -> Card {
        Card::try_from(s).unwrap()
    }

    #[test]
    fn schedule_order() {
        assert_eq!(Rule::of(1), Rule::Color);
        assert_eq!(Rule::of(2), Rule::Order);
        assert_eq!(Rule::of(3), Rule::Range);
        assert_eq!(Rule::of(4), Rule::Suit);
        assert_eq!(Rule::of(5), Rule::Color);
    }

    #[test]
    fn color_scoring() {
        let v = Rule::Color
            .evaluate(&[], card("7H"), &Guess::Color(Color::Red))
            .unwrap();
        assert!(v.correct);
        assert_eq!(v.points, 10);
        let v = Rule::Color
            .evaluate(&[], card("7H"), &Guess::Color(Color::Black))
            .unwrap();
        assert!(!v.correct);
        assert_eq!(v.points, 0);
    }

    #[test]
    fn order_equal_swings() {
        let prior = [card("9C")];
        let hit = Rule::Order
            .evaluate(&prior, card("9H"), &Guess::Order(Order::Equal))
            .unwrap();
        assert_eq!((hit.correct, hit.points), (true, 20));
        let miss = Rule::Order
            .evaluate(&prior, card("2H"), &Guess::Order(Order::Equal))
            .unwrap();
        assert_eq!((miss.correct, miss.points), (false, -10));
    }

    #[test]
    fn order_higher_lower() {
        let prior = [card("9C")];
        let v = Rule::Order
            .evaluate(&prior, card("QH"), &Guess::Order(Order::Higher))
            .unwrap();
        assert_eq!((v.correct, v.points), (true, 10));
        let v = Rule::Order
            .evaluate(&prior, card("QH"), &Guess::Order(Order::Lower))
            .unwrap();
        assert_eq!((v.correct, v.points), (false, 0));
    }

    #[test]
    fn order_needs_comparison_card() {
        let err = Rule::Order.evaluate(&[], card("9H"), &Guess::Order(Order::Higher));
        assert_eq!(err, Err(RuleError::NoComparison));
    }

    #[test]
    fn range_scoring() {
        let prior = [card("5C"), card("9D")];
        let v = Rule::Range
            .evaluate(&prior, card("7H"), &Guess::Range(Range::Inside))
            .unwrap();
        assert_eq!((v.correct, v.points), (true, 10));
        let v = Rule::Range
            .evaluate(&prior, card("KH"), &Guess::Range(Range::Outside))
            .unwrap();
        assert_eq!((v.correct, v.points), (true, 10));
    }

    #[test]
    fn range_equal_takes_precedence() {
        // 9 is not strictly inside (5, 9), but "outside" still loses: a rank
        // match means only "equal" can be right.
        let prior = [card("5C"), card("9D")];
        let v = Rule::Range
            .evaluate(&prior, card("9H"), &Guess::Range(Range::Outside))
            .unwrap();
        assert_eq!((v.correct, v.points), (false, 0));
        let v = Rule::Range
            .evaluate(&prior, card("9H"), &Guess::Range(Range::Equal))
            .unwrap();
        assert_eq!((v.correct, v.points), (true, 20));
    }

    #[test]
    fn suit_scoring() {
        let v = Rule::Suit
            .evaluate(&[], card("7H"), &Guess::Suit(Suit::H))
            .unwrap();
        assert_eq!((v.correct, v.points), (true, 30));
        let v = Rule::Suit
            .evaluate(&[], card("7H"), &Guess::Suit(Suit::S))
            .unwrap();
        assert_eq!((v.correct, v.points), (false, 0));
    }

    #[test]
    fn mismatched_guess_family() {
        let err = Rule::Color.evaluate(&[], card("7H"), &Guess::Suit(Suit::H));
        assert_eq!(err, Err(RuleError::Mismatch));
    }

    #[test]
    fn sip_quantities() {
        assert_eq!(Rule::Color.reward(&Guess::Color(Color::Red)), 1);
        assert_eq!(Rule::Order.reward(&Guess::Order(Order::Equal)), 4);
        assert_eq!(Rule::Order.reward(&Guess::Order(Order::Higher)), 2);
        assert_eq!(Rule::Suit.reward(&Guess::Suit(Suit::H)), 8);
        assert_eq!(Rule::Order.forfeit(&Guess::Order(Order::Equal)), 4);
        assert_eq!(Rule::Suit.forfeit(&Guess::Suit(Suit::H)), 4);
        assert_eq!(Rule::Range.forfeit(&Guess::Range(Range::Inside)), 3);
    }
}
