//! The Poker Squares game engine
//!
//! Each turn the engine draws a card from a shuffled deck, asks the player
//! for a cell and places the card there. Once placed, cards never move.
//! After the 25th card the ten row and column hands are scored by the
//! current point system.
//!
//! An illegal play or running out of the play clock ends the game at once
//! with ten times the point system's lowest category score.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::card::Card;
use crate::config::GameConfig;
use crate::grid::{Cell, Grid, NUM_CELLS};
use crate::player::Player;
use crate::point_system::PointSystem;
use crate::stats::GameStatistics;
use crate::Result;

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// All 25 cards were placed legally
    Completed { score: i32 },

    /// The player chose an occupied or out-of-range cell
    IllegalPlay { cell: Cell, score: i32 },

    /// The player exhausted the play clock
    OutOfTime { score: i32 },
}

impl GameOutcome {
    /// The final game score (the penalty for disqualified games)
    pub fn score(&self) -> i32 {
        match *self {
            GameOutcome::Completed { score }
            | GameOutcome::IllegalPlay { score, .. }
            | GameOutcome::OutOfTime { score } => score,
        }
    }

    /// Returns true if the grid was filled without a fault
    pub fn is_completed(&self) -> bool {
        matches!(self, GameOutcome::Completed { .. })
    }
}

/// A game engine bound to one player and one point system
pub struct PokerSquares<'p> {
    player: &'p mut dyn Player,
    system: Arc<PointSystem>,
    config: GameConfig,
    grid: Grid,
    rng: StdRng,
}

impl<'p> PokerSquares<'p> {
    /// Creates an engine and prepares the player for `system`
    ///
    /// The player's background setup, if it has one, gets at most
    /// `config.prepare_time`; after that the engine stops waiting.
    pub fn new(player: &'p mut dyn Player, system: Arc<PointSystem>, config: GameConfig) -> Self {
        prepare_player(player, &system, &config);
        PokerSquares {
            player,
            system,
            config,
            grid: Grid::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeds the deck shuffle of subsequent games
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// The point system games are scored with
    pub fn system(&self) -> &PointSystem {
        &self.system
    }

    /// The grid of the current or most recent game
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Plays one game
    ///
    /// Illegal plays and timeouts are reported through the outcome. An
    /// error means the player itself is broken (for example a corrupted
    /// program tree) and is passed through unchanged.
    pub fn play(&mut self) -> Result<GameOutcome> {
        self.player.reset();

        let mut deck = Card::deck();
        deck.shuffle(&mut self.rng);
        self.grid.clear();

        let mut remaining = self.config.game_time;
        for &card in deck.iter().rev().take(NUM_CELLS) {
            let start = Instant::now();
            let cell = self.player.choose(card, remaining)?;
            remaining = match remaining.checked_sub(start.elapsed()) {
                Some(left) => left,
                None => {
                    warn!("{} ran out of time", self.player.name());
                    return Ok(GameOutcome::OutOfTime {
                        score: self.system.penalty(),
                    });
                }
            };

            if !cell.in_bounds() || !self.grid.is_empty(cell) {
                warn!("{} made an illegal play: {}", self.player.name(), cell);
                return Ok(GameOutcome::IllegalPlay {
                    cell,
                    score: self.system.penalty(),
                });
            }

            self.grid.set(cell, card);
            debug!(
                "{} placed at {}\n{}",
                card,
                cell,
                self.system.render(&self.grid)
            );
        }

        Ok(GameOutcome::Completed {
            score: self.system.score(&self.grid),
        })
    }

    /// Plays `num_games` games; game `i` is dealt from seed `start_seed + i`
    pub fn play_sequence(&mut self, num_games: usize, start_seed: u64) -> Result<Vec<i32>> {
        info!(
            "{}: {} games starting at seed {}",
            self.player.name(),
            num_games,
            start_seed
        );

        let mut scores = Vec::with_capacity(num_games);
        for i in 0..num_games {
            self.set_seed(start_seed.wrapping_add(i as u64));
            let score = self.play()?.score();
            debug!("game {}: {}", i, score);
            scores.push(score);
        }

        if let Some(stats) = GameStatistics::from_scores(&scores) {
            info!("{}", stats.summary());
        }
        Ok(scores)
    }
}

fn prepare_player(player: &mut dyn Player, system: &Arc<PointSystem>, config: &GameConfig) {
    player.prepare(Arc::clone(system), config.prepare_time);

    let Some(task) = player.setup_task(system) else {
        return;
    };

    let (done_tx, done_rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("point-system-setup".to_string())
        .spawn(move || {
            task();
            // The engine may have stopped listening.
            let _ = done_tx.send(());
        });
    if let Err(e) = spawned {
        warn!("could not start setup worker for {}: {}", player.name(), e);
        return;
    }

    match done_rx.recv_timeout(config.prepare_time) {
        Ok(()) => debug!("{} finished point system setup", player.name()),
        Err(RecvTimeoutError::Timeout) => warn!(
            "{} did not finish setup within {:?}; starting play anyway",
            player.name(),
            config.prepare_time
        ),
        Err(RecvTimeoutError::Disconnected) => {
            warn!("setup worker for {} ended without finishing", player.name())
        }
    }
}

/// Holds a tournament and returns each player's tournament score
///
/// For every point system, every player plays the same `games_per_system`
/// deals starting at `start_seed`. Player totals are scaled linearly so the
/// best total maps to 1.0 and the worst to 0.0 (all 0.0 when every total is
/// equal); the returned scores are the sums over all point systems.
pub fn play_tournament(
    players: &mut [Box<dyn Player>],
    systems: &[Arc<PointSystem>],
    games_per_system: usize,
    start_seed: u64,
    config: &GameConfig,
) -> Result<Vec<f64>> {
    let mut tournament_scores = vec![0.0; players.len()];

    for system in systems {
        info!("Point system:\n{}", system);

        let mut totals = Vec::with_capacity(players.len());
        for player in players.iter_mut() {
            let name = player.name();
            let mut game = PokerSquares::new(player.as_mut(), Arc::clone(system), config.clone());
            let total: i64 = game
                .play_sequence(games_per_system, start_seed)?
                .iter()
                .map(|&s| s as i64)
                .sum();
            info!("Player \"{}\" total score: {}", name, total);
            totals.push(total);
        }

        let (Some(&min), Some(&max)) = (totals.iter().min(), totals.iter().max()) else {
            continue;
        };
        for (i, &total) in totals.iter().enumerate() {
            let normalized = if max > min {
                (total - min) as f64 / (max - min) as f64
            } else {
                0.0
            };
            info!(
                "Player \"{}\" normalized score: {:.4}",
                players[i].name(),
                normalized
            );
            tournament_scores[i] += normalized;
        }
    }

    for (player, score) in players.iter().zip(&tournament_scores) {
        info!("{:>20} {:.4}", player.name(), score);
    }
    Ok(tournament_scores)
}
