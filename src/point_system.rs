//! Point systems for scoring Poker Squares grids
//!
//! A point system assigns one integer score to each of the ten hand
//! categories. The grid score is the sum over the five row hands and the
//! five column hands.

use std::fmt;

use rand::Rng;

use crate::grid::{Grid, SIZE};
use crate::hand::{Hand, PokerHand, NUM_HANDS};

/// Highest permissible hand score
pub const MAX_HAND_SCORE: i32 = 127;

/// Lowest permissible hand score
pub const MIN_HAND_SCORE: i32 = -128;

const AMERICAN: [i32; NUM_HANDS] = [0, 2, 5, 10, 15, 20, 25, 50, 75, 100];
const BRITISH: [i32; NUM_HANDS] = [0, 1, 3, 6, 12, 5, 10, 16, 30, 30];

/// A scoring table indexed by hand category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointSystem {
    scores: [i32; NUM_HANDS],
}

impl PointSystem {
    /// Creates a point system, clamping each score to
    /// `[MIN_HAND_SCORE, MAX_HAND_SCORE]`
    pub fn new(scores: [i32; NUM_HANDS]) -> Self {
        PointSystem {
            scores: scores.map(|s| s.clamp(MIN_HAND_SCORE, MAX_HAND_SCORE)),
        }
    }

    /// The American point system
    ///
    /// ```
    /// use poker_squares::{PointSystem, PokerHand};
    ///
    /// let american = PointSystem::american();
    /// assert_eq!(american.score_for(PokerHand::StraightFlush), 75);
    /// ```
    pub fn american() -> Self {
        Self::new(AMERICAN)
    }

    /// The British (U.K.) point system
    pub fn british() -> Self {
        Self::new(BRITISH)
    }

    /// A system drawn between the normalized American and British tables
    ///
    /// The royal flush score is uniform in `[30, 100]`; every other nonzero
    /// category is scaled from it by a fraction drawn between the two
    /// reference tables' fractions of their top score.
    pub fn ameritish<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut scores = [0; NUM_HANDS];
        let top = rng.gen_range(30..=100);
        scores[NUM_HANDS - 1] = top;
        for i in 1..NUM_HANDS - 1 {
            let frac_a = AMERICAN[i] as f64 / AMERICAN[NUM_HANDS - 1] as f64;
            let frac_b = BRITISH[i] as f64 / BRITISH[NUM_HANDS - 1] as f64;
            let (low, high) = if frac_a > frac_b {
                (frac_b, frac_a)
            } else {
                (frac_a, frac_b)
            };
            let frac = rng.gen::<f64>() * (high - low) + low;
            scores[i] = (top as f64 * frac).round() as i32;
        }
        Self::new(scores)
    }

    /// Scores drawn uniformly from the whole permissible range
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut scores = [0; NUM_HANDS];
        for score in scores.iter_mut() {
            *score = rng.gen_range(MIN_HAND_SCORE..=MAX_HAND_SCORE);
        }
        Self::new(scores)
    }

    /// Every category scores either -1 or 1 with equal probability
    pub fn hypercorner<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut scores = [0; NUM_HANDS];
        for score in scores.iter_mut() {
            *score = if rng.gen::<bool>() { 1 } else { -1 };
        }
        Self::new(scores)
    }

    /// Only `hand` scores, for 1 point
    pub fn single_hand(hand: PokerHand) -> Self {
        let mut scores = [0; NUM_HANDS];
        scores[hand.id()] = 1;
        Self::new(scores)
    }

    /// A single-hand system for a uniformly chosen category
    pub fn random_single_hand<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::single_hand(PokerHand::ALL[rng.gen_range(0..NUM_HANDS)])
    }

    /// The score table indexed by category identifier
    pub fn scores(&self) -> &[i32; NUM_HANDS] {
        &self.scores
    }

    pub fn score_for(&self, hand: PokerHand) -> i32 {
        self.scores[hand.id()]
    }

    /// Score of a (possibly partial) hand
    pub fn hand_score(&self, hand: &Hand) -> i32 {
        self.score_for(PokerHand::classify(hand))
    }

    /// Individual hand scores: rows 0 through 4 followed by columns 0 through 4
    pub fn hand_scores(&self, grid: &Grid) -> [i32; 2 * SIZE] {
        let mut scores = [0; 2 * SIZE];
        for i in 0..SIZE {
            scores[i] = self.hand_score(&grid.row(i));
            scores[SIZE + i] = self.hand_score(&grid.column(i));
        }
        scores
    }

    /// Total grid score
    pub fn score(&self, grid: &Grid) -> i32 {
        self.hand_scores(grid).iter().sum()
    }

    /// Lowest score of any category
    pub fn min_score(&self) -> i32 {
        self.scores.iter().copied().min().unwrap_or(0)
    }

    /// The median category score (upper median of the sorted table)
    pub fn median_score(&self) -> i32 {
        let mut sorted = self.scores;
        sorted.sort_unstable();
        sorted[NUM_HANDS / 2]
    }

    /// Score awarded for an illegal play or a timeout: ten times the
    /// minimum category score
    pub fn penalty(&self) -> i32 {
        self.min_score() * 10
    }

    /// Renders the grid with row scores on the right, column scores
    /// underneath and the total
    pub fn render(&self, grid: &Grid) -> String {
        let scores = self.hand_scores(grid);
        let mut out = String::new();
        for row in 0..SIZE {
            for card in grid.row(row) {
                match card {
                    Some(card) => out.push_str(&format!(" {} ", card)),
                    None => out.push_str(" -- "),
                }
            }
            out.push_str(&format!("{:3}\n", scores[row]));
        }
        for col in 0..SIZE {
            out.push_str(&format!("{:3} ", scores[SIZE + col]));
        }
        out.push_str(&format!("{:3} Total\n", scores.iter().sum::<i32>()));
        out
    }
}

impl fmt::Display for PointSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<15} Points", "Hand Name")?;
        for hand in PokerHand::ALL {
            writeln!(f, "{:<15} {:4}", hand.name(), self.score_for(hand))?;
        }
        Ok(())
    }
}
