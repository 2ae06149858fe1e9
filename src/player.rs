//! The player interface and a random baseline player
//!
//! For each point system the engine calls [`Player::prepare`] once (and runs
//! the optional [`Player::setup_task`] on a worker), then for each game calls
//! [`Player::reset`] followed by 25 calls to [`Player::choose`].

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::card::Card;
use crate::grid::{Cell, NUM_CELLS};
use crate::point_system::PointSystem;
use crate::{PokerSquaresError, Result};

/// Background work a player wants done for a new point system
///
/// The engine runs it on a separate thread and stops waiting after the
/// preparation deadline; the task is never cancelled.
pub type SetupTask = Box<dyn FnOnce() + Send + 'static>;

/// Trait implemented by every decision maker
pub trait Player {
    /// Receives the point system used by all following games
    ///
    /// Called on the engine thread; keep it to bookkeeping and move
    /// expensive precomputation into [`Player::setup_task`].
    fn prepare(&mut self, system: Arc<PointSystem>, budget: Duration);

    /// Returns background precomputation for `system`, if any
    fn setup_task(&self, _system: &Arc<PointSystem>) -> Option<SetupTask> {
        None
    }

    /// Clears per-game state before a new game
    fn reset(&mut self);

    /// Chooses an empty cell for the card just drawn
    ///
    /// The player must track its own grid: every legal returned play is
    /// applied by the engine. `Err` is reserved for internal faults of the
    /// player, never for ordinary game outcomes.
    fn choose(&mut self, card: Card, remaining: Duration) -> Result<Cell>;

    /// Short identifying label
    fn name(&self) -> String;
}

/// Plays every card in a random empty cell
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    plays: Vec<usize>,
    rng: StdRng,
}

impl RandomPlayer {
    /// Creates a random player seeded from entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Creates a random player drawing from `rng`
    pub fn with_rng(rng: StdRng) -> Self {
        RandomPlayer {
            plays: Vec::with_capacity(NUM_CELLS),
            rng,
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for RandomPlayer {
    fn prepare(&mut self, _system: Arc<PointSystem>, _budget: Duration) {}

    fn reset(&mut self) {
        self.plays.clear();
        self.plays.extend(0..NUM_CELLS);
        self.plays.shuffle(&mut self.rng);
    }

    fn choose(&mut self, _card: Card, _remaining: Duration) -> Result<Cell> {
        self.plays
            .pop()
            .map(Cell::from_index)
            .ok_or(PokerSquaresError::NoEmptyCell)
    }

    fn name(&self) -> String {
        "RandomPlayer".to_string()
    }
}
