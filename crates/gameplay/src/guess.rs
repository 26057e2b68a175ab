use prosit_cards::Color;
use prosit_cards::Suit;

/// Relative rank guess: will the next card be higher, lower, or equal?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Order {
    Higher,
    Lower,
    Equal,
}

/// Range guess against all previously drawn cards: inside, outside, or equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Range {
    Inside,
    Outside,
    Equal,
}

/// A player's answer for the current round. Each variant belongs to exactly
/// one [`Rule`]; the engine rejects a guess of the wrong family.
///
/// [`Rule`]: super::rule::Rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Guess {
    Color(Color),
    Order(Order),
    Range(Range),
    Suit(Suit),
}

impl Guess {
    /// "Equal" guesses double the sip quantities, win or lose.
    pub fn is_equal(&self) -> bool {
        matches!(self, Guess::Order(Order::Equal) | Guess::Range(Range::Equal))
    }
}

impl std::fmt::Display for Guess {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Guess::Color(c) => write!(f, "{}", c),
            Guess::Order(Order::Higher) => write!(f, "higher"),
            Guess::Order(Order::Lower) => write!(f, "lower"),
            Guess::Order(Order::Equal) => write!(f, "equal"),
            Guess::Range(Range::Inside) => write!(f, "inside"),
            Guess::Range(Range::Outside) => write!(f, "outside"),
            Guess::Range(Range::Equal) => write!(f, "equal"),
            Guess::Suit(s) => write!(f, "{}", s.name()),
        }
    }
}
