//! Statistics for game sequences and Monte Carlo searches

use std::time::Duration;

/// Summary of the scores of a sequence of games
#[derive(Debug, Clone, PartialEq)]
pub struct GameStatistics {
    pub games: usize,
    pub mean: f64,

    /// Population standard deviation
    pub std_dev: f64,
    pub min: i32,
    pub max: i32,
}

impl GameStatistics {
    /// Computes statistics for the given scores; `None` if there are none
    pub fn from_scores(scores: &[i32]) -> Option<Self> {
        let min = *scores.iter().min()?;
        let max = *scores.iter().max()?;
        let n = scores.len() as f64;
        let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / n;
        let variance = scores
            .iter()
            .map(|&s| {
                let diff = s as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / n;

        Some(GameStatistics {
            games: scores.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    /// Mean rounded to the nearest integer, as used for fitness
    ///
    /// Halves round up, toward positive infinity, for negative means too.
    pub fn rounded_mean(&self) -> i32 {
        (self.mean + 0.5).floor() as i32
    }

    /// One-line summary of the scores
    pub fn summary(&self) -> String {
        format!(
            "Score Mean: {:.3}, Standard Deviation: {:.3}, Minimum: {}, Maximum: {}",
            self.mean, self.std_dev, self.min, self.max
        )
    }
}

/// Statistics collected by a Monte Carlo player over one game
#[derive(Debug, Clone)]
pub struct SearchStatistics {
    /// Moves decided by search (the forced last play is not counted)
    pub searched_moves: usize,

    /// Candidate cells evaluated
    pub candidates: usize,

    /// Rollouts performed
    pub rollouts: usize,

    /// Candidates whose time slice allowed no rollout
    pub degenerate_slices: usize,

    /// Total time spent choosing moves
    pub total_time: Duration,
}

impl SearchStatistics {
    pub fn new() -> Self {
        SearchStatistics {
            searched_moves: 0,
            candidates: 0,
            rollouts: 0,
            degenerate_slices: 0,
            total_time: Duration::from_secs(0),
        }
    }

    /// Average rollouts per candidate
    pub fn rollouts_per_candidate(&self) -> f64 {
        if self.candidates == 0 {
            return 0.0;
        }
        self.rollouts as f64 / self.candidates as f64
    }

    /// Returns the number of rollouts per second
    pub fn rollouts_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.rollouts as f64 / self.total_time.as_secs_f64()
    }

    /// Multi-line summary of the search
    pub fn summary(&self) -> String {
        format!(
            "Monte Carlo Search Statistics:\n\
             - Searched moves: {}\n\
             - Candidates: {}\n\
             - Rollouts: {}\n\
             - Rollouts per candidate: {:.1}\n\
             - Degenerate slices: {}\n\
             - Total time: {:.3} seconds\n\
             - Rollouts per second: {:.1}",
            self.searched_moves,
            self.candidates,
            self.rollouts,
            self.rollouts_per_candidate(),
            self.degenerate_slices,
            self.total_time.as_secs_f64(),
            self.rollouts_per_second()
        )
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}
