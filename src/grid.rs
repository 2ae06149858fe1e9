//! The 5×5 placement grid

use std::fmt;

use crate::card::Card;
use crate::hand::{Hand, HAND_SIZE};

/// Number of rows and columns
pub const SIZE: usize = HAND_SIZE;

/// Number of cells in the grid
pub const NUM_CELLS: usize = SIZE * SIZE;

/// A grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// Creates a cell; coordinates are not checked
    pub fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// Decodes a row-major index
    pub fn from_index(index: usize) -> Self {
        Cell {
            row: index / SIZE,
            col: index % SIZE,
        }
    }

    /// Row-major index: `row * 5 + col`
    pub fn index(&self) -> usize {
        self.row * SIZE + self.col
    }

    /// Returns true if both coordinates are in `[0, 5)`
    pub fn in_bounds(&self) -> bool {
        self.row < SIZE && self.col < SIZE
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Whether a line of the grid is a row or a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Row,
    Column,
}

impl Orientation {
    /// The cell at position `offset` along line `line`
    pub fn cell(self, line: usize, offset: usize) -> Cell {
        match self {
            Orientation::Row => Cell::new(line, offset),
            Orientation::Column => Cell::new(offset, line),
        }
    }
}

/// The play grid; `None` marks an empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    cells: [[Option<Card>; SIZE]; SIZE],
}

impl Grid {
    /// Creates an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// The card at `cell`, if any
    pub fn get(&self, cell: Cell) -> Option<Card> {
        self.cells[cell.row][cell.col]
    }

    /// Returns true if no card is at `cell`
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.get(cell).is_none()
    }

    /// Places a card; the caller is responsible for legality
    pub fn set(&mut self, cell: Cell, card: Card) {
        self.cells[cell.row][cell.col] = Some(card);
    }

    /// Takes the card off `cell`
    pub fn remove(&mut self, cell: Cell) -> Option<Card> {
        self.cells[cell.row][cell.col].take()
    }

    /// Removes every card
    pub fn clear(&mut self) {
        self.cells = [[None; SIZE]; SIZE];
    }

    /// The hand in row `row`
    pub fn row(&self, row: usize) -> Hand {
        self.cells[row]
    }

    /// The hand in column `col`
    pub fn column(&self, col: usize) -> Hand {
        let mut hand = [None; SIZE];
        for (row, slot) in hand.iter_mut().enumerate() {
            *slot = self.cells[row][col];
        }
        hand
    }

    /// The hand for a row or column
    pub fn line(&self, orientation: Orientation, line: usize) -> Hand {
        match orientation {
            Orientation::Row => self.row(line),
            Orientation::Column => self.column(line),
        }
    }

    /// Number of cards placed so far
    pub fn num_cards(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Returns true once all 25 cells hold a card
    pub fn is_full(&self) -> bool {
        self.num_cards() == NUM_CELLS
    }

    /// Empty cells in row-major order
    pub fn empty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..NUM_CELLS)
            .map(Cell::from_index)
            .filter(move |&cell| self.is_empty(cell))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for (col, card) in row.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                match card {
                    Some(card) => write!(f, "{}", card)?,
                    None => write!(f, "--")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
