//! Rollout policies for Monte Carlo simulation
//!
//! A rollout policy decides where a simulated card goes during a rollout.
//! The policy only chooses the cell; the caller makes and later undoes the
//! play.

use rand::{Rng, RngCore};

use crate::card::Card;
use crate::grid::Cell;
use crate::point_system::PointSystem;
use crate::simulation::SimulationState;

/// Trait for policies that place simulated cards
pub trait RolloutPolicy: Send + Sync {
    /// Returns the row-major index of the open cell for `card`
    ///
    /// `state` must have at least one open cell.
    fn place(
        &self,
        state: &SimulationState,
        card: Card,
        system: &PointSystem,
        rng: &mut dyn RngCore,
    ) -> usize;

    /// Create a boxed clone of this policy
    fn clone_box(&self) -> Box<dyn RolloutPolicy>;
}

/// Greedy placement policy
///
/// Places the card where the grid score right after the play is highest,
/// breaking ties uniformly at random. Only the row and column of a cell
/// change when it is filled, so candidates are compared by the change in
/// those two hands.
#[derive(Debug, Clone, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    /// Creates a greedy policy
    pub fn new() -> Self {
        GreedyPolicy
    }

    /// Change in grid score from placing `card` at `cell`
    pub fn gain(state: &SimulationState, card: Card, cell: Cell, system: &PointSystem) -> i32 {
        let grid = state.grid();
        let mut row = grid.row(cell.row);
        let mut col = grid.column(cell.col);
        let before = system.hand_score(&row) + system.hand_score(&col);
        row[cell.col] = Some(card);
        col[cell.row] = Some(card);
        system.hand_score(&row) + system.hand_score(&col) - before
    }
}

impl RolloutPolicy for GreedyPolicy {
    fn place(
        &self,
        state: &SimulationState,
        card: Card,
        system: &PointSystem,
        rng: &mut dyn RngCore,
    ) -> usize {
        let open = state.open_cells();
        let mut best = open[0];
        let mut best_gain = i32::MIN;
        let mut ties = 0u32;

        for &index in open {
            let gain = Self::gain(state, card, Cell::from_index(index), system);
            if gain > best_gain {
                best_gain = gain;
                best = index;
                ties = 1;
            } else if gain == best_gain {
                // Reservoir sampling keeps the choice uniform over ties.
                ties += 1;
                if rng.gen_range(0..ties) == 0 {
                    best = index;
                }
            }
        }
        best
    }

    fn clone_box(&self) -> Box<dyn RolloutPolicy> {
        Box::new(self.clone())
    }
}

/// Random placement policy
///
/// Places the card in a uniformly random open cell.
#[derive(Debug, Clone, Default)]
pub struct RandomPolicy;

impl RandomPolicy {
    /// Creates a random policy
    pub fn new() -> Self {
        RandomPolicy
    }
}

impl RolloutPolicy for RandomPolicy {
    fn place(
        &self,
        state: &SimulationState,
        _card: Card,
        _system: &PointSystem,
        rng: &mut dyn RngCore,
    ) -> usize {
        let open = state.open_cells();
        open[rng.gen_range(0..open.len())]
    }

    fn clone_box(&self) -> Box<dyn RolloutPolicy> {
        Box::new(self.clone())
    }
}

impl RolloutPolicy for Box<dyn RolloutPolicy> {
    fn place(
        &self,
        state: &SimulationState,
        card: Card,
        system: &PointSystem,
        rng: &mut dyn RngCore,
    ) -> usize {
        (**self).place(state, card, system, rng)
    }

    fn clone_box(&self) -> Box<dyn RolloutPolicy> {
        (**self).clone_box()
    }
}
