//! Tournament example
//!
//! Pits the random baseline against Monte Carlo players of different
//! rollout depths over several point systems and prints each player's
//! normalized tournament score.
//!
//! Run with `RUST_LOG=info` to see per-system totals.

use std::sync::Arc;
use std::time::Duration;

use poker_squares::{
    play_tournament, GameConfig, MonteCarloConfig, MonteCarloPlayer, Player, PointSystem,
    RandomPlayer,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), poker_squares::PokerSquaresError> {
    // Initialize logging
    env_logger::init();

    println!("Poker Squares Tournament");
    println!("========================");
    println!();

    let mut rng = StdRng::seed_from_u64(2024);
    let systems = vec![
        Arc::new(PointSystem::american()),
        Arc::new(PointSystem::british()),
        Arc::new(PointSystem::ameritish(&mut rng)),
        Arc::new(PointSystem::random(&mut rng)),
        Arc::new(PointSystem::hypercorner(&mut rng)),
        Arc::new(PointSystem::random_single_hand(&mut rng)),
    ];

    let mut players: Vec<Box<dyn Player>> = vec![Box::new(RandomPlayer::new())];
    for depth in 0..=2 {
        let config = MonteCarloConfig::default().with_depth_limit(depth);
        players.push(Box::new(MonteCarloPlayer::new(config)));
    }

    // Short games keep the example quick
    let config = GameConfig::default()
        .with_game_time(Duration::from_secs(2))
        .with_prepare_time(Duration::from_secs(5));
    let scores = play_tournament(&mut players, &systems, 5, 0, &config)?;

    println!("Tournament results (maximum {}):", systems.len());
    for (player, score) in players.iter().zip(&scores) {
        println!("{:>20} {:.4}", player.name(), score);
    }

    Ok(())
}
