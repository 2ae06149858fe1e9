//! Genetic programming example
//!
//! Evolves program trees for the British point system, shows the best tree
//! found and compares it with the random baseline on fresh deals.

use std::sync::Arc;

use poker_squares::{
    Evolution, EvolutionConfig, GameConfig, PointSystem, PokerSquares, ProgramPlayer,
    RandomPlayer, Result,
};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    println!("Poker Squares Program Evolution");
    println!("===============================");
    println!();

    let system = Arc::new(PointSystem::british());
    println!("{}", system);

    let config = EvolutionConfig::default()
        .with_population_size(40)
        .with_replacements(8)
        .with_games_per_evaluation(20);
    let mut evolution = Evolution::new(Arc::clone(&system), config)?;

    for report in evolution.run(15)? {
        println!(
            "generation {:>2}: best {:>3}  mean {:>6.2}  worst {:>3}  depth {}  size {:.1}",
            report.generation,
            report.best,
            report.mean,
            report.worst,
            report.max_depth,
            report.mean_size
        );
    }

    let Some((tree, fitness)) = evolution.best() else {
        return Ok(());
    };
    println!();
    println!("Best tree (fitness {}):", fitness);
    println!("{}", tree);

    // Fresh deals, disjoint from the fitness games
    let games = 100;
    let start_seed = 1_000_000;
    let mut evolved = ProgramPlayer::new(tree);
    let evolved_scores = PokerSquares::new(&mut evolved, Arc::clone(&system), GameConfig::default())
        .play_sequence(games, start_seed)?;
    let mut random = RandomPlayer::new();
    let random_scores = PokerSquares::new(&mut random, Arc::clone(&system), GameConfig::default())
        .play_sequence(games, start_seed)?;

    let mean = |scores: &[i32]| scores.iter().sum::<i32>() as f64 / scores.len() as f64;
    println!("Evolved player mean over {} games: {:.2}", games, mean(&evolved_scores));
    println!("Random player mean over {} games:  {:.2}", games, mean(&random_scores));

    Ok(())
}
