//! Configuration for games, the Monte Carlo player and evolution
//!
//! Every struct has sensible defaults and builder-style `with_*` methods.

use std::time::Duration;

use crate::{PokerSquaresError, Result};

/// Maximum time for a player to process a new point system
pub const DEFAULT_PREPARE_TIME: Duration = Duration::from_secs(300);

/// Maximum time for one game
pub const DEFAULT_GAME_TIME: Duration = Duration::from_secs(30);

/// Timing limits for the game engine
///
/// # Example
///
/// ```
/// use poker_squares::GameConfig;
/// use std::time::Duration;
///
/// let config = GameConfig::default()
///     .with_game_time(Duration::from_millis(500))
///     .with_prepare_time(Duration::from_millis(100));
/// assert_eq!(config.game_time, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Total play clock for the 25 placements of one game
    pub game_time: Duration,

    /// How long the engine waits for a player's point-system setup
    ///
    /// Play proceeds after this deadline whether or not setup finished.
    pub prepare_time: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            game_time: DEFAULT_GAME_TIME,
            prepare_time: DEFAULT_PREPARE_TIME,
        }
    }
}

impl GameConfig {
    /// Sets the total play clock per game
    pub fn with_game_time(mut self, game_time: Duration) -> Self {
        self.game_time = game_time;
        self
    }

    /// Sets the soft deadline for player setup
    pub fn with_prepare_time(mut self, prepare_time: Duration) -> Self {
        self.prepare_time = prepare_time;
        self
    }
}

/// How simulated cards are placed during a rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutKind {
    /// Place in the cell that maximizes the current grid score,
    /// breaking ties uniformly at random
    Greedy,

    /// Place in a uniformly random empty cell
    Random,
}

/// Configuration for the Monte Carlo player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonteCarloConfig {
    /// Number of simulated plays per rollout
    ///
    /// Zero scores each candidate by the grid it produces, with no
    /// forward simulation.
    pub depth_limit: usize,

    /// Optional cap on rollouts per candidate cell
    ///
    /// The time slice still applies; this only stops earlier.
    pub max_rollouts: Option<usize>,

    /// Placement policy used inside rollouts
    pub rollout: RolloutKind,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        MonteCarloConfig {
            depth_limit: 2,
            max_rollouts: None,
            rollout: RolloutKind::Greedy,
        }
    }
}

impl MonteCarloConfig {
    /// Sets how many plays are searched ahead before rollouts
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Caps the rollouts per candidate cell
    pub fn with_max_rollouts(mut self, max_rollouts: usize) -> Self {
        self.max_rollouts = Some(max_rollouts);
        self
    }

    /// Sets the rollout policy
    pub fn with_rollout(mut self, rollout: RolloutKind) -> Self {
        self.rollout = rollout;
        self
    }
}

/// Crossover operator applied to paired individuals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverStrategy {
    /// Leave paired individuals unchanged
    None,

    /// Swap randomly chosen subtrees when both results respect the
    /// depth limit
    SubtreeExchange,
}

/// Configuration for the genetic programming engine
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionConfig {
    /// Number of individuals, constant across generations
    pub population_size: usize,

    /// Number of lowest-fitness individuals replaced by copies of the
    /// fittest each generation
    pub replacements: usize,

    /// Games played per individual to estimate fitness
    pub games_per_evaluation: usize,

    /// Seed of the first fitness game; game `i` uses `fitness_seed + i`
    pub fitness_seed: u64,

    /// Per-node mutation probability
    pub mutation_rate: f64,

    /// Probability that a mutated decision leaf stays a decision leaf
    /// rather than growing into a rule
    pub decision_bias: f64,

    /// Probability that a pair of individuals undergoes crossover
    pub crossover_rate: f64,

    pub crossover: CrossoverStrategy,

    /// Maximum number of rule nodes on any root-to-leaf path
    pub depth_limit: usize,

    /// Game limits used for fitness games
    pub game: GameConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            population_size: 100,
            replacements: 10,
            games_per_evaluation: 50,
            fitness_seed: 0,
            mutation_rate: 0.3,
            decision_bias: 0.7,
            crossover_rate: 0.5,
            crossover: CrossoverStrategy::SubtreeExchange,
            depth_limit: 4,
            game: GameConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// Sets the number of trees in the population
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Sets how many trees selection replaces per generation
    pub fn with_replacements(mut self, replacements: usize) -> Self {
        self.replacements = replacements;
        self
    }

    /// Sets the number of games played per fitness assessment
    pub fn with_games_per_evaluation(mut self, games: usize) -> Self {
        self.games_per_evaluation = games;
        self
    }

    /// Sets the seed of the first fitness deal
    pub fn with_fitness_seed(mut self, seed: u64) -> Self {
        self.fitness_seed = seed;
        self
    }

    /// Sets the per-node mutation probability
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the chance a mutated leaf is re-randomized instead of grown
    pub fn with_decision_bias(mut self, bias: f64) -> Self {
        self.decision_bias = bias;
        self
    }

    /// Sets the chance a pair exchanges subtrees
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the crossover strategy
    pub fn with_crossover(mut self, crossover: CrossoverStrategy) -> Self {
        self.crossover = crossover;
        self
    }

    /// Sets the maximum rule depth of a tree
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Sets the game configuration used for fitness games
    pub fn with_game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Checks that the parameters describe a runnable evolution
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(PokerSquaresError::InvalidConfiguration(format!(
                "population size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.replacements > self.population_size / 2 {
            return Err(PokerSquaresError::InvalidConfiguration(format!(
                "cannot replace {} of {} individuals; at most half may be replaced",
                self.replacements, self.population_size
            )));
        }
        if self.games_per_evaluation == 0 {
            return Err(PokerSquaresError::InvalidConfiguration(
                "fitness needs at least one game".to_string(),
            ));
        }
        if self.depth_limit == 0 {
            return Err(PokerSquaresError::InvalidConfiguration(
                "depth limit must allow the root rule".to_string(),
            ));
        }
        for (name, p) in [
            ("mutation rate", self.mutation_rate),
            ("decision bias", self.decision_bias),
            ("crossover rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(PokerSquaresError::InvalidConfiguration(format!(
                    "{} must be a probability, got {}",
                    name, p
                )));
            }
        }
        Ok(())
    }
}
