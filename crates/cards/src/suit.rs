/// Card suit: clubs, diamonds, hearts, spades.
///
/// The ordering (C < D < H < S) is arbitrary but consistent. Each suit also
/// doubles as a "horse" in the race game, where the four aces mark the
/// starting gates.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Suit {
    #[default]
    C = 0,
    D = 1,
    H = 2,
    S = 3,
}

/// One of the two suit colors guessed in round one.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    Red,
    Black,
}

impl Suit {
    /// All four suits in canonical order.
    pub const fn all() -> [Suit; 4] {
        [Suit::C, Suit::D, Suit::H, Suit::S]
    }
    /// Hearts and diamonds are red, clubs and spades black.
    pub const fn color(&self) -> Color {
        match self {
            Suit::H | Suit::D => Color::Red,
            Suit::C | Suit::S => Color::Black,
        }
    }
    /// Unicode suit symbol for display.
    pub fn symbol(&self) -> char {
        match self {
            Suit::C => '♣',
            Suit::D => '♦',
            Suit::H => '♥',
            Suit::S => '♠',
        }
    }
    /// Human-readable name, as guessed in round four.
    pub const fn name(&self) -> &'static str {
        match self {
            Suit::C => "clubs",
            Suit::D => "diamonds",
            Suit::H => "hearts",
            Suit::S => "spades",
        }
    }
}

/// u8 isomorphism
impl From<u8> for Suit {
    fn from(n: u8) -> Suit {
        match n {
            0 => Suit::C,
            1 => Suit::D,
            2 => Suit::H,
            3 => Suit::S,
            _ => unreachable!("invalid suit"),
        }
    }
}
impl From<Suit> for u8 {
    fn from(s: Suit) -> u8 {
        s as u8
    }
}

/// str isomorphism
impl TryFrom<&str> for Suit {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "c" | "♣" | "clubs" => Ok(Suit::C),
            "d" | "♦" | "diamonds" => Ok(Suit::D),
            "h" | "♥" | "hearts" => Ok(Suit::H),
            "s" | "♠" | "spades" => Ok(Suit::S),
            _ => Err(format!("invalid suit str: {}", s)),
        }
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Suit::C => write!(f, "C"),
            Suit::D => write!(f, "D"),
            Suit::H => write!(f, "H"),
            Suit::S => write!(f, "S"),
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u8() {
        let suit = Suit::D;
        assert!(suit == Suit::from(u8::from(suit)));
    }

    #[test]
    fn colors_partition() {
        let reds = Suit::all()
            .iter()
            .filter(|s| s.color() == Color::Red)
            .count();
        assert_eq!(reds, 2);
    }
}
