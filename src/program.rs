//! A player driven by a program tree

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::card::Card;
use crate::grid::{Cell, Grid};
use crate::player::Player;
use crate::point_system::PointSystem;
use crate::tree::{EvalContext, ProgramTree};
use crate::Result;

/// Plays each card wherever its program tree decides
///
/// A corrupted tree surfaces as an error from [`Player::choose`], which the
/// engine passes on to its caller.
pub struct ProgramPlayer<'t> {
    tree: &'t ProgramTree,
    ctx: EvalContext,
    grid: Grid,
    rng: StdRng,
}

impl<'t> ProgramPlayer<'t> {
    /// Creates a player for `tree` seeded from entropy
    pub fn new(tree: &'t ProgramTree) -> Self {
        Self::with_rng(tree, StdRng::from_entropy())
    }

    /// Creates a player whose random tie-breaks use `rng`
    pub fn with_rng(tree: &'t ProgramTree, rng: StdRng) -> Self {
        ProgramPlayer {
            tree,
            ctx: EvalContext::new(Arc::new(PointSystem::american())),
            grid: Grid::new(),
            rng,
        }
    }

    /// The program being played
    pub fn tree(&self) -> &ProgramTree {
        self.tree
    }
}

impl Player for ProgramPlayer<'_> {
    fn prepare(&mut self, system: Arc<PointSystem>, _budget: Duration) {
        self.ctx = EvalContext::new(system);
    }

    fn reset(&mut self) {
        self.grid.clear();
    }

    fn choose(&mut self, card: Card, _remaining: Duration) -> Result<Cell> {
        let cell = self
            .tree
            .evaluate(&self.grid, card, &self.ctx, &mut self.rng)?;
        self.grid.set(cell, card);
        Ok(cell)
    }

    fn name(&self) -> String {
        "ProgramPlayer".to_string()
    }
}
