//! Greedy Monte Carlo player
//!
//! For each open cell the player tentatively places the drawn card and then
//! runs as many rollouts as fit in that cell's time slice. A rollout draws
//! random undealt cards and places each by the rollout policy (greedy by
//! default) up to the depth limit or the end of the game, scores the grid
//! and undoes its plays. The cell with the best average rollout score is
//! played.
//!
//! The remaining play clock is split evenly across the remaining turns and
//! then again across the open cells of the current turn.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::card::Card;
use crate::config::{MonteCarloConfig, RolloutKind};
use crate::grid::{Cell, NUM_CELLS};
use crate::player::Player;
use crate::point_system::PointSystem;
use crate::policy::rollout::{GreedyPolicy, RandomPolicy, RolloutPolicy};
use crate::simulation::SimulationState;
use crate::stats::SearchStatistics;
use crate::{PokerSquaresError, Result};

/// A player choosing cells by time-budgeted Monte Carlo rollouts
///
/// # Example
///
/// ```
/// use poker_squares::{GameConfig, MonteCarloConfig, MonteCarloPlayer, PointSystem, PokerSquares};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let mut player = MonteCarloPlayer::new(MonteCarloConfig::default().with_depth_limit(1));
/// let config = GameConfig::default().with_game_time(Duration::from_millis(200));
/// let mut game = PokerSquares::new(&mut player, Arc::new(PointSystem::american()), config);
/// game.set_seed(7);
/// let outcome = game.play().unwrap();
/// assert!(outcome.is_completed());
/// ```
pub struct MonteCarloPlayer {
    config: MonteCarloConfig,
    system: Arc<PointSystem>,
    state: SimulationState,
    rollout_policy: Box<dyn RolloutPolicy>,
    rng: StdRng,
    statistics: SearchStatistics,
}

impl MonteCarloPlayer {
    /// Creates a player seeded from entropy
    pub fn new(config: MonteCarloConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a player whose simulations and tie-breaks use `rng`
    pub fn with_rng(config: MonteCarloConfig, rng: StdRng) -> Self {
        let rollout_policy: Box<dyn RolloutPolicy> = match config.rollout {
            RolloutKind::Greedy => Box::new(GreedyPolicy::new()),
            RolloutKind::Random => Box::new(RandomPolicy::new()),
        };

        MonteCarloPlayer {
            config,
            system: Arc::new(PointSystem::american()),
            state: SimulationState::new(),
            rollout_policy,
            rng,
            statistics: SearchStatistics::new(),
        }
    }

    /// Sets the rollout policy to use
    pub fn with_rollout_policy<P: RolloutPolicy + 'static>(mut self, policy: P) -> Self {
        self.rollout_policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Statistics for the current or most recent game
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// The player's view of the game so far
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Picks the open cell with the best average rollout score
    fn search(&mut self, card: Card, remaining: Duration) -> usize {
        let system = Arc::clone(&self.system);
        // Split the clock evenly over the remaining plays, then split this
        // play's share evenly over its candidate cells.
        let remaining_plays = (NUM_CELLS - self.state.num_plays()) as u32;
        let per_play = remaining / remaining_plays;
        let slice = per_play / remaining_plays;

        // Copy the open cells so the state can be mutated while iterating.

        let mut candidates = [0usize; NUM_CELLS];
        let open = self.state.open_cells();
        let count = open.len();
        candidates[..count].copy_from_slice(open);

        let mut best = candidates[0];
        let mut best_average = f64::NEG_INFINITY;
        let mut ties = 0u32;
        for &cell in &candidates[..count] {
            // Try the card in this cell, score it, then take it back.
            self.state.make_play(card, cell);
            let average = self.evaluate_candidate(&system, slice);
            self.state.undo_play();
            trace!("{} at {}: {:.3}", card, Cell::from_index(cell), average);

            if average > best_average {
                best_average = average;
                best = cell;
                ties = 1;
            } else if average == best_average {
                // Reservoir sampling keeps each tied cell equally likely.
                ties += 1;
                if self.rng.gen_range(0..ties) == 0 {
                    best = cell;
                }
            }
        }

        self.statistics.searched_moves += 1;
        best
    }

    /// Average rollout score of the current (tentative) grid
    fn evaluate_candidate(&mut self, system: &PointSystem, slice: Duration) -> f64 {
        self.statistics.candidates += 1;
        // Depth 0 is a pure greedy player: no rollouts at all.
        if self.config.depth_limit == 0 {
            return system.score(self.state.grid()) as f64;
        }

        let end = Instant::now() + slice;
        let mut total = 0i64;
        let mut count = 0usize;
        while Instant::now() < end && self.config.max_rollouts.map_or(true, |max| count < max) {
            total += self.rollout(system) as i64;
            count += 1;
        }
        self.statistics.rollouts += count;

        // The slice ran out before one rollout finished; fall back to the
        // score of the grid as it stands.
        if count == 0 {
            self.statistics.degenerate_slices += 1;
            return system.score(self.state.grid()) as f64;
        }
        total as f64 / count as f64
    }

    /// One simulated continuation; leaves the state exactly as it found it
    fn rollout(&mut self, system: &PointSystem) -> i32 {
        let depth = self
            .config
            .depth_limit
            .min(NUM_CELLS - self.state.num_plays());

        // Draw from the cards still unseen; the real deck order is unknown.
        for _ in 0..depth {
            let undealt = self.state.undealt();
            let card = undealt[self.rng.gen_range(0..undealt.len())];
            let cell = self
                .rollout_policy
                .place(&self.state, card, system, &mut self.rng);
            self.state.make_play(card, cell);
        }
        let score = system.score(self.state.grid());

        // Unwind in reverse so the candidate play stays on the grid.
        for _ in 0..depth {
            self.state.undo_play();
        }
        score
    }
}

impl Player for MonteCarloPlayer {
    fn prepare(&mut self, system: Arc<PointSystem>, _budget: Duration) {
        self.system = system;
    }

    fn reset(&mut self) {
        self.state.reset();
        self.statistics = SearchStatistics::new();
    }

    fn choose(&mut self, card: Card, remaining: Duration) -> Result<Cell> {
        if self.state.is_complete() {
            return Err(PokerSquaresError::NoEmptyCell);
        }
        let start = Instant::now();
        // Move the revealed card to the front of the undealt suffix so
        // rollouts never draw it again.
        self.state.reveal(card);

        let cell = if self.state.num_plays() + 1 < NUM_CELLS {
            self.search(card, remaining)
        } else {
            // Forced last play: one open cell left.
            self.state.open_cells()[0]
        };
        self.state.make_play(card, cell);

        self.statistics.total_time += start.elapsed();
        if self.state.is_complete() {
            debug!("{}", self.statistics.summary());
        }
        Ok(Cell::from_index(cell))
    }

    fn name(&self) -> String {
        format!("MonteCarloDepth{}", self.config.depth_limit)
    }
}
