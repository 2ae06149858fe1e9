//! Reversible simulation state for Monte Carlo play
//!
//! The state keeps two partitions that move in lock step with the number of
//! plays `n`:
//!
//! - the simulation deck: positions `[0, n)` hold the cards already placed
//!   (in play order) and `[n, 52)` the cards not yet dealt;
//! - the play list: positions `[0, n)` hold the row-major indices of the
//!   cells played so far and `[n, 25)` the empty cells.
//!
//! Inverse position maps make every lookup O(1), and an undo log records the
//! two swaps each play performed, so [`SimulationState::undo_play`] restores
//! every array exactly. Nothing allocates after construction.

use crate::card::{Card, NUM_CARDS};
use crate::grid::{Cell, Grid, NUM_CELLS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct UndoRecord {
    deck_swap: usize,
    play_swap: usize,
}

/// Grid plus deck and cell partitions supporting O(1) play and undo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationState {
    grid: Grid,
    deck: [Card; NUM_CARDS],
    deck_pos: [usize; NUM_CARDS],
    plays: [usize; NUM_CELLS],
    play_pos: [usize; NUM_CELLS],
    history: [UndoRecord; NUM_CELLS],
    num_plays: usize,
}

impl SimulationState {
    /// Creates an empty state with the full deck undealt
    pub fn new() -> Self {
        let mut state = SimulationState {
            grid: Grid::new(),
            deck: Card::deck(),
            deck_pos: [0; NUM_CARDS],
            plays: [0; NUM_CELLS],
            play_pos: [0; NUM_CELLS],
            history: [UndoRecord::default(); NUM_CELLS],
            num_plays: 0,
        };
        state.reset();
        state
    }

    /// Returns to an empty grid with every card undealt
    pub fn reset(&mut self) {
        self.grid.clear();
        self.num_plays = 0;
        for i in 0..NUM_CELLS {
            self.plays[i] = i;
            self.play_pos[i] = i;
        }
        for (pos, card) in self.deck.iter().enumerate() {
            self.deck_pos[card.id()] = pos;
        }
        self.history = [UndoRecord::default(); NUM_CELLS];
    }

    /// The simulated grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Cards placed so far, real and simulated
    pub fn num_plays(&self) -> usize {
        self.num_plays
    }

    pub fn is_complete(&self) -> bool {
        self.num_plays == NUM_CELLS
    }

    /// Row-major indices of the empty cells
    pub fn open_cells(&self) -> &[usize] {
        &self.plays[self.num_plays..]
    }

    /// Cards not yet placed, in simulation-deck order
    pub fn undealt(&self) -> &[Card] {
        &self.deck[self.num_plays..]
    }

    /// Moves a drawn card to the front of the undealt suffix
    ///
    /// Called when the real deck reveals `card`, so the suffix after the
    /// next play still holds exactly the cards that may yet be drawn.
    pub fn reveal(&mut self, card: Card) {
        let pos = self.deck_pos[card.id()];
        debug_assert!(pos >= self.num_plays, "{} was already placed", card);
        self.swap_deck(self.num_plays, pos);
    }

    /// Places `card` in the empty cell with row-major index `cell`
    ///
    /// `card` must be undealt and `cell` must be open.
    pub fn make_play(&mut self, card: Card, cell: usize) {
        let n = self.num_plays;
        let deck_swap = self.deck_pos[card.id()];
        let play_swap = self.play_pos[cell];
        debug_assert!(deck_swap >= n, "{} was already placed", card);
        debug_assert!(play_swap >= n, "cell {} is occupied", cell);

        self.swap_deck(n, deck_swap);
        self.swap_plays(n, play_swap);
        self.grid.set(Cell::from_index(cell), card);
        self.history[n] = UndoRecord {
            deck_swap,
            play_swap,
        };
        self.num_plays += 1;
    }

    /// Reverses the most recent [`SimulationState::make_play`]
    pub fn undo_play(&mut self) {
        debug_assert!(self.num_plays > 0, "nothing to undo");
        self.num_plays -= 1;
        let n = self.num_plays;
        let record = self.history[n];
        self.history[n] = UndoRecord::default();

        self.grid.remove(Cell::from_index(self.plays[n]));
        self.swap_plays(n, record.play_swap);
        self.swap_deck(n, record.deck_swap);
    }

    fn swap_deck(&mut self, a: usize, b: usize) {
        self.deck.swap(a, b);
        self.deck_pos[self.deck[a].id()] = a;
        self.deck_pos[self.deck[b].id()] = b;
    }

    fn swap_plays(&mut self, a: usize, b: usize) {
        self.plays.swap(a, b);
        self.play_pos[self.plays[a]] = a;
        self.play_pos[self.plays[b]] = b;
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}
