//! # poker-squares
//!
//! Poker Squares solitaire with pluggable players, time-budgeted Monte Carlo
//! search and a genetic programming engine that evolves decision trees.
//!
//! Twenty-five cards from a shuffled deck are placed one at a time on a 5x5
//! grid. Once placed, a card never moves. When the grid is full, each of the
//! five rows and five columns is scored as a poker hand under a
//! [`PointSystem`], which maps the ten hand categories to points.
//!
//! ## Features
//!
//! - Exact hand classification and the American, British, Ameritish, random,
//!   hypercorner and single-hand point systems
//! - A game engine with a play clock, an illegal-play penalty and a soft
//!   deadline for point-system preparation
//! - Tournaments with per-system min-max normalized scores
//! - [`MonteCarloPlayer`]: evaluates each open cell by as many greedy rollouts
//!   as fit in its time slice, using an allocation-free reversible state
//! - [`ProgramPlayer`] and [`Evolution`]: program trees of rules and
//!   placement decisions, evolved by selection, mutation and crossover
//!
//! ## Basic Usage
//!
//! ```
//! use poker_squares::{GameConfig, PointSystem, PokerSquares, RandomPlayer};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), poker_squares::PokerSquaresError> {
//!     let mut player = RandomPlayer::new();
//!     let system = Arc::new(PointSystem::american());
//!     let mut game = PokerSquares::new(&mut player, system, GameConfig::default());
//!
//!     game.set_seed(42);
//!     let outcome = game.play()?;
//!     println!("Final score: {}", outcome.score());
//!     println!("{}", game.system().render(game.grid()));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Evolving a Player
//!
//! ```
//! use poker_squares::{EvolutionConfig, Evolution, PointSystem};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), poker_squares::PokerSquaresError> {
//!     let config = EvolutionConfig::default()
//!         .with_population_size(6)
//!         .with_replacements(2)
//!         .with_games_per_evaluation(2);
//!     let mut evolution = Evolution::new(Arc::new(PointSystem::british()), config)?;
//!
//!     let reports = evolution.run(2)?;
//!     assert_eq!(reports.len(), 2);
//!     if let Some((tree, fitness)) = evolution.best() {
//!         println!("Best tree ({}):\n{}", fitness, tree);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Examples
//!
//! ```bash
//! cargo run --release --example tournament
//! cargo run --release --example evolve
//! ```

pub mod card;
pub mod config;
pub mod evolution;
pub mod game;
pub mod grid;
pub mod hand;
pub mod monte_carlo;
pub mod player;
pub mod point_system;
pub mod policy;
pub mod program;
pub mod simulation;
pub mod stats;
pub mod tree;

pub use card::Card;
pub use config::{CrossoverStrategy, EvolutionConfig, GameConfig, MonteCarloConfig, RolloutKind};
pub use evolution::{Evolution, GenerationReport, Individual};
pub use game::{play_tournament, GameOutcome, PokerSquares};
pub use grid::{Cell, Grid, Orientation};
pub use hand::PokerHand;
pub use monte_carlo::MonteCarloPlayer;
pub use player::{Player, RandomPlayer, SetupTask};
pub use point_system::PointSystem;
pub use policy::{GreedyPolicy, RandomPolicy, RolloutPolicy};
pub use program::ProgramPlayer;
pub use simulation::SimulationState;
pub use stats::{GameStatistics, SearchStatistics};
pub use tree::{Decision, EvalContext, NodeId, ProgramTree, Rule, Strategy};

/// Error types for Poker Squares
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PokerSquaresError {
    /// A program tree referred to a node it does not contain
    #[error("Program tree node {0} not found")]
    NodeNotFound(NodeId),

    /// An operation for one node kind was applied to the other kind
    #[error("Program tree node {0} is not of the required kind")]
    WrongNodeKind(NodeId),

    /// Parent and child links of a program tree disagree
    #[error("Program tree links are inconsistent at node {0}")]
    CorruptTree(NodeId),

    /// A player was asked for a cell with the grid already full
    #[error("No empty cell left on the grid")]
    NoEmptyCell,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A card string could not be parsed
    #[error("Invalid card: {0}")]
    InvalidCard(String),
}

/// Result type for Poker Squares operations
pub type Result<T> = std::result::Result<T, PokerSquaresError>;
