//! Playing cards of the 52-card French deck
//!
//! Cards are small `Copy` values compared by rank and suit. Ranks run
//! `A, 2, ..., K` (0 through 12) and suits `C, D, H, S` (0 through 3).

use std::fmt;
use std::str::FromStr;

use crate::PokerSquaresError;

/// Number of ranks in the deck
pub const NUM_RANKS: usize = 13;

/// Number of suits in the deck
pub const NUM_SUITS: usize = 4;

/// Number of cards in the deck
pub const NUM_CARDS: usize = NUM_RANKS * NUM_SUITS;

const RANK_NAMES: [char; NUM_RANKS] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];
const SUIT_NAMES: [char; NUM_SUITS] = ['C', 'D', 'H', 'S'];

/// A single playing card
///
/// # Example
///
/// ```
/// use poker_squares::Card;
///
/// let card: Card = "TD".parse().unwrap();
/// assert_eq!(card.rank(), 9);
/// assert_eq!(card.suit(), 1);
/// assert_eq!(card.to_string(), "TD");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: u8,
    suit: u8,
}

impl Card {
    /// Creates a card from a rank in `[0, 13)` and a suit in `[0, 4)`
    ///
    /// # Panics
    ///
    /// Panics if either value is out of range.
    pub fn new(rank: usize, suit: usize) -> Self {
        assert!(rank < NUM_RANKS, "rank {} out of range", rank);
        assert!(suit < NUM_SUITS, "suit {} out of range", suit);
        Card {
            rank: rank as u8,
            suit: suit as u8,
        }
    }

    /// Returns the card with the given suit-major identifier
    pub fn from_id(id: usize) -> Option<Self> {
        if id >= NUM_CARDS {
            return None;
        }
        Some(Card::new(id % NUM_RANKS, id / NUM_RANKS))
    }

    /// Rank in `[0, 13)`, ace low
    pub fn rank(&self) -> usize {
        self.rank as usize
    }

    /// Suit in `[0, 4)`
    pub fn suit(&self) -> usize {
        self.suit as usize
    }

    /// Returns true for the four aces
    pub fn is_ace(&self) -> bool {
        self.rank == 0
    }

    /// Suit-major identifier: `suit * 13 + rank`
    pub fn id(&self) -> usize {
        self.suit() * NUM_RANKS + self.rank()
    }

    /// Returns all 52 cards in suit-major order
    pub fn deck() -> [Card; NUM_CARDS] {
        let mut deck = [Card { rank: 0, suit: 0 }; NUM_CARDS];
        for (id, slot) in deck.iter_mut().enumerate() {
            *slot = Card {
                rank: (id % NUM_RANKS) as u8,
                suit: (id / NUM_RANKS) as u8,
            };
        }
        deck
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANK_NAMES[self.rank()],
            SUIT_NAMES[self.suit()]
        )
    }
}

impl FromStr for Card {
    type Err = PokerSquaresError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let mut chars = upper.chars();
        let (rank_char, suit_char) = match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(s), None) => (r, s),
            _ => return Err(PokerSquaresError::InvalidCard(s.to_string())),
        };

        let rank = RANK_NAMES.iter().position(|&c| c == rank_char);
        let suit = SUIT_NAMES.iter().position(|&c| c == suit_char);
        match (rank, suit) {
            (Some(rank), Some(suit)) => Ok(Card::new(rank, suit)),
            _ => Err(PokerSquaresError::InvalidCard(s.to_string())),
        }
    }
}
