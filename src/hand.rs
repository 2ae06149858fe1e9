//! Poker hand categories and classification
//!
//! A hand is a row or column of the grid: five slots, any of which may still
//! be empty during play. Classification of partial hands is allowed and is
//! what the heuristic players use for scoring unfinished lines.

use std::fmt;

use crate::card::{Card, NUM_RANKS, NUM_SUITS};

/// Number of cards in a complete hand
pub const HAND_SIZE: usize = 5;

/// A hand as seen on the grid, with `None` for empty slots
pub type Hand = [Option<Card>; HAND_SIZE];

/// Poker hand categories in increasing precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PokerHand {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

/// Number of hand categories
pub const NUM_HANDS: usize = 10;

impl PokerHand {
    /// All categories ordered by identifier
    pub const ALL: [PokerHand; NUM_HANDS] = [
        PokerHand::HighCard,
        PokerHand::OnePair,
        PokerHand::TwoPair,
        PokerHand::ThreeOfAKind,
        PokerHand::Straight,
        PokerHand::Flush,
        PokerHand::FullHouse,
        PokerHand::FourOfAKind,
        PokerHand::StraightFlush,
        PokerHand::RoyalFlush,
    ];

    /// Identifier used to index point system tables
    pub fn id(self) -> usize {
        self as usize
    }

    /// Category for a table identifier, if in range
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// Lower-case display name of the category
    pub fn name(self) -> &'static str {
        match self {
            PokerHand::HighCard => "high card",
            PokerHand::OnePair => "one pair",
            PokerHand::TwoPair => "two pair",
            PokerHand::ThreeOfAKind => "three of a kind",
            PokerHand::Straight => "straight",
            PokerHand::Flush => "flush",
            PokerHand::FullHouse => "full house",
            PokerHand::FourOfAKind => "four of a kind",
            PokerHand::StraightFlush => "straight flush",
            PokerHand::RoyalFlush => "royal flush",
        }
    }

    /// Classifies a hand that may contain empty slots
    ///
    /// Flushes and straights need all five slots filled. Straights do not
    /// wrap around, but T-J-Q-K-A counts as a straight and, when suited, as
    /// a royal flush. An empty hand is a high card hand.
    ///
    /// ```
    /// use poker_squares::{Card, PokerHand};
    ///
    /// let hand = ["TC", "JC", "QC", "KC", "AC"].map(|s| Some(s.parse::<Card>().unwrap()));
    /// assert_eq!(PokerHand::classify(&hand), PokerHand::RoyalFlush);
    /// ```
    pub fn classify(hand: &Hand) -> PokerHand {
        let mut rank_counts = [0u8; NUM_RANKS];
        let mut suit_counts = [0u8; NUM_SUITS];
        for card in hand.iter().flatten() {
            rank_counts[card.rank()] += 1;
            suit_counts[card.suit()] += 1;
        }

        let mut max_of_a_kind = 0;
        let mut count_counts = [0u8; HAND_SIZE + 1];
        for &count in &rank_counts {
            count_counts[count as usize] += 1;
            max_of_a_kind = max_of_a_kind.max(count);
        }

        let has_flush = suit_counts
            .iter()
            .any(|&count| count as usize == HAND_SIZE);

        let lowest = rank_counts
            .iter()
            .position(|&count| count > 0)
            .unwrap_or(NUM_RANKS);
        let mut has_straight = lowest + HAND_SIZE <= NUM_RANKS
            && rank_counts[lowest..lowest + HAND_SIZE]
                .iter()
                .all(|&count| count == 1);
        let has_royal = rank_counts[0] == 1 && rank_counts[9..].iter().all(|&count| count == 1);
        has_straight |= has_royal;

        if has_flush && has_royal {
            return PokerHand::RoyalFlush;
        }
        if has_flush && has_straight {
            return PokerHand::StraightFlush;
        }
        if max_of_a_kind == 4 {
            return PokerHand::FourOfAKind;
        }
        if count_counts[3] == 1 && count_counts[2] == 1 {
            return PokerHand::FullHouse;
        }
        if has_flush {
            return PokerHand::Flush;
        }
        if has_straight {
            return PokerHand::Straight;
        }
        if max_of_a_kind == 3 {
            return PokerHand::ThreeOfAKind;
        }
        match count_counts[2] {
            2 => PokerHand::TwoPair,
            1 => PokerHand::OnePair,
            _ => PokerHand::HighCard,
        }
    }
}

impl fmt::Display for PokerHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
