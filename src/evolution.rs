//! Genetic programming engine
//!
//! Each generation runs four phases over a fixed-size population of
//! program trees:
//!
//! 1. **Fitness**: every tree plays the same seeded games; its fitness is the
//!    rounded mean score.
//! 2. **Selection**: the lowest-fitness trees are replaced by deep copies of
//!    the fittest.
//! 3. **Mutation**: random nodes are re-parameterized, re-randomized or grown
//!    into new rules.
//! 4. **Crossover**: random pairs exchange subtrees.
//!
//! No operator ever lets a tree exceed the configured depth limit. Errors
//! from the trees themselves (a missing node) mean the population is
//! corrupted and are returned to the caller.

use std::cmp::Reverse;
use std::sync::Arc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::{CrossoverStrategy, EvolutionConfig};
use crate::game::PokerSquares;
use crate::grid::SIZE;
use crate::point_system::PointSystem;
use crate::program::ProgramPlayer;
use crate::stats::GameStatistics;
use crate::tree::{random_orientation, Decision, ProgramTree};
use crate::{PokerSquaresError, Result};

/// How many random node pairs crossover tries before giving up on a pair
const CROSSOVER_ATTEMPTS: usize = 8;

/// A member of the population
#[derive(Debug)]
pub struct Individual {
    pub tree: ProgramTree,

    /// Fitness from the last assessment; `None` once the tree changed
    pub fitness: Option<i32>,
}

impl Individual {
    pub fn new(tree: ProgramTree) -> Self {
        Individual {
            tree,
            fitness: None,
        }
    }
}

/// Fitness summary of one generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    pub best: i32,
    pub worst: i32,
    pub mean: f64,

    /// Deepest tree in the population, counted in rule nodes
    pub max_depth: usize,

    /// Average number of nodes per tree
    pub mean_size: f64,
}

/// Evolves program trees for one point system
pub struct Evolution {
    config: EvolutionConfig,
    system: Arc<PointSystem>,
    population: Vec<Individual>,
    champion: Option<(ProgramTree, i32)>,
    generation: usize,
    rng: StdRng,
}

impl Evolution {
    pub fn new(system: Arc<PointSystem>, config: EvolutionConfig) -> Result<Self> {
        Self::with_rng(system, config, StdRng::from_entropy())
    }

    /// Creates a random initial population using `rng` for every random
    /// choice of the engine
    pub fn with_rng(
        system: Arc<PointSystem>,
        config: EvolutionConfig,
        mut rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        let population = (0..config.population_size)
            .map(|_| Individual::new(ProgramTree::random(&mut rng)))
            .collect();

        Ok(Evolution {
            config,
            system,
            population,
            champion: None,
            generation: 0,
            rng,
        })
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Number of completed generations
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The fittest tree of the most recent assessment and its fitness
    pub fn best(&self) -> Option<(&ProgramTree, i32)> {
        self.champion
            .as_ref()
            .map(|(tree, fitness)| (tree, *fitness))
    }

    /// Plays the fitness games for every individual
    pub fn assess_fitness(&mut self) -> Result<()> {
        // Trees that did not change since the last generation are replayed
        // too; only the deals are shared, not the tie-break seeds.
        for individual in self.population.iter_mut() {
            let seed = self.rng.gen();
            individual.fitness = Some(fitness(
                &individual.tree,
                &self.system,
                &self.config,
                seed,
            )?);
        }

        let fittest = self
            .population
            .iter()
            .filter_map(|ind| ind.fitness.map(|f| (ind, f)))
            .max_by_key(|&(_, f)| f);
        // Keep a copy so later mutation cannot alter the reported champion.
        if let Some((individual, fitness)) = fittest {
            self.champion = Some((individual.tree.deep_copy()?, fitness));
        }
        Ok(())
    }

    /// Replaces the lowest-fitness individuals with copies of the fittest
    ///
    /// Copy `i` is made from the `i`-th fittest individual. Individuals
    /// without a fitness rank last.
    pub fn select(&mut self) -> Result<()> {
        self.population
            .sort_by_key(|ind| Reverse(ind.fitness.unwrap_or(i32::MIN)));

        // Copies are taken before truncation; replacements never exceed
        // half the population, so the fittest are still present.
        let replacements = self.config.replacements;
        let copies = self.population[..replacements]
            .iter()
            .map(|ind| {
                Ok(Individual {
                    tree: ind.tree.deep_copy()?,
                    fitness: ind.fitness,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let survivors = self.population.len() - replacements;
        self.population.truncate(survivors);
        self.population.extend(copies);
        Ok(())
    }

    /// Applies random node mutations to every individual
    pub fn mutate(&mut self) -> Result<()> {
        for individual in self.population.iter_mut() {
            let mutations = mutate_tree(&mut individual.tree, &self.config, &mut self.rng)?;
            if mutations > 0 {
                individual.fitness = None;
            }
        }
        Ok(())
    }

    /// Pairs individuals in random order and applies the crossover strategy
    pub fn crossover(&mut self) -> Result<()> {
        if self.config.crossover == CrossoverStrategy::None {
            return Ok(());
        }

        // An odd individual out sits this generation's crossover out.
        self.population.shuffle(&mut self.rng);
        for pair in self.population.chunks_exact_mut(2) {
            if !self.rng.gen_bool(self.config.crossover_rate) {
                continue;
            }
            let (first, second) = pair.split_at_mut(1);
            let exchanged = exchange_subtrees(
                &mut first[0].tree,
                &mut second[0].tree,
                self.config.depth_limit,
                &mut self.rng,
            )?;
            if exchanged {
                first[0].fitness = None;
                second[0].fitness = None;
            }
        }
        Ok(())
    }

    /// Runs one full generation and reports the assessed fitness
    pub fn step(&mut self) -> Result<GenerationReport> {
        // Report before selection so the numbers describe the assessed trees.
        self.assess_fitness()?;
        let report = self.report()?;
        info!(
            "generation {}: best {}, mean {:.2}, worst {}, max depth {}",
            report.generation, report.best, report.mean, report.worst, report.max_depth
        );

        self.select()?;
        self.mutate()?;
        self.crossover()?;
        self.generation += 1;
        Ok(report)
    }

    /// Runs `generations` generations
    pub fn run(&mut self, generations: usize) -> Result<Vec<GenerationReport>> {
        let mut reports = Vec::with_capacity(generations);
        for _ in 0..generations {
            reports.push(self.step()?);
        }
        if let Some((tree, fitness)) = self.best() {
            debug!("champion with fitness {}:\n{}", fitness, tree);
        }
        Ok(reports)
    }

    fn report(&self) -> Result<GenerationReport> {
        let scores: Vec<i32> = self
            .population
            .iter()
            .filter_map(|ind| ind.fitness)
            .collect();
        let stats = GameStatistics::from_scores(&scores).ok_or_else(|| {
            PokerSquaresError::InvalidConfiguration("population has no assessed fitness".into())
        })?;

        let mut max_depth = 0;
        let mut total_size = 0;
        for individual in &self.population {
            max_depth = max_depth.max(individual.tree.max_depth()?);
            total_size += individual.tree.len();
        }

        Ok(GenerationReport {
            generation: self.generation,
            best: stats.max,
            worst: stats.min,
            mean: stats.mean,
            max_depth,
            mean_size: total_size as f64 / self.population.len() as f64,
        })
    }
}

/// Rounded mean score of `tree` over the configured fitness games
///
/// Game `i` is dealt from `fitness_seed + i`, so every individual of a
/// population sees the same deals. `seed` drives the player's tie-breaks.
pub fn fitness(
    tree: &ProgramTree,
    system: &Arc<PointSystem>,
    config: &EvolutionConfig,
    seed: u64,
) -> Result<i32> {
    let mut player = ProgramPlayer::with_rng(tree, StdRng::seed_from_u64(seed));
    let mut game = PokerSquares::new(&mut player, Arc::clone(system), config.game.clone());

    // Games are played directly rather than through play_sequence to keep
    // per-game logging out of every assessment.
    let mut scores = Vec::with_capacity(config.games_per_evaluation);
    for i in 0..config.games_per_evaluation {
        game.set_seed(config.fitness_seed.wrapping_add(i as u64));
        scores.push(game.play()?.score());
    }
    Ok(GameStatistics::from_scores(&scores)
        .map(|stats| stats.rounded_mean())
        .unwrap_or_else(|| system.penalty()))
}

/// Mutates `tree` in place; returns the number of mutations applied
///
/// Each node gets a `mutation_rate` chance to trigger a mutation of a
/// uniformly chosen node. Rules get new parameters; decisions are
/// re-randomized with probability `decision_bias` and otherwise grow into a
/// rule with two new decisions, unless that would break the depth limit.
/// The tree may be compacted afterwards, so node identifiers taken before
/// the call should not be reused.
pub fn mutate_tree<R: Rng + ?Sized>(
    tree: &mut ProgramTree,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Result<usize> {
    config.validate()?;

    // The trial count is fixed up front; grown nodes do not get extra trials.
    let mut mutations = 0;
    for _ in 0..tree.len() {
        if !rng.gen_bool(config.mutation_rate) {
            continue;
        }
        // The mutated node is drawn afresh, independent of the trial.
        let id = *tree
            .node_ids()
            .choose(rng)
            .ok_or(PokerSquaresError::CorruptTree(tree.root()))?;

        if tree.get(id)?.is_rule() {
            // Rules keep their children and only get new parameters.
            tree.replace_rule(id, random_orientation(rng), rng.gen_range(0..SIZE))?;
        } else if rng.gen_bool(config.decision_bias)
            || tree.rule_depth(id)? + 1 > config.depth_limit
        {
            // Growing here would add a rule below the depth limit.
            tree.replace_decision(id, Decision::random(rng))?;
        } else {
            tree.grow(
                id,
                random_orientation(rng),
                rng.gen_range(0..SIZE),
                Decision::random(rng),
                Decision::random(rng),
            )?;
        }
        mutations += 1;
    }
    tree.compact()?;
    Ok(mutations)
}

/// Swaps a random subtree of `a` with a random subtree of `b`
///
/// Only pairs that keep both trees within `depth_limit` are exchanged.
/// Returns false if no such pair was found within a few attempts. Like
/// [`mutate_tree`], a successful exchange may renumber both trees.
pub fn exchange_subtrees<R: Rng + ?Sized>(
    a: &mut ProgramTree,
    b: &mut ProgramTree,
    depth_limit: usize,
    rng: &mut R,
) -> Result<bool> {
    let a_ids = a.node_ids();
    let b_ids = b.node_ids();

    for _ in 0..CROSSOVER_ATTEMPTS {
        let (Some(&x), Some(&y)) = (a_ids.choose(rng), b_ids.choose(rng)) else {
            return Ok(false);
        };
        // A subtree lands at the depth of the node it replaces.
        if a.rule_depth(x)? + b.rule_height(y)? > depth_limit
            || b.rule_depth(y)? + a.rule_height(x)? > depth_limit
        {
            continue;
        }

        // Both copies are taken before either graft invalidates x or y.
        let from_a = a.subtree(x)?;
        let from_b = b.subtree(y)?;
        a.graft(x, &from_b)?;
        b.graft(y, &from_a)?;
        a.compact()?;
        b.compact()?;
        return Ok(true);
    }
    Ok(false)
}
