use poker_squares::evolution::{exchange_subtrees, fitness, mutate_tree};
use poker_squares::{
    CrossoverStrategy, Decision, Evolution, EvolutionConfig, GameConfig, GameStatistics,
    Orientation, PointSystem, PokerSquares, PokerSquaresError, ProgramPlayer, ProgramTree,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

fn small_config() -> EvolutionConfig {
    EvolutionConfig::default()
        .with_population_size(8)
        .with_replacements(2)
        .with_games_per_evaluation(3)
        .with_fitness_seed(100)
}

/// Grows `tree` by always-growing mutations until it reaches `depth_limit`
fn grown_tree(rng: &mut StdRng, depth_limit: usize) -> ProgramTree {
    let config = EvolutionConfig::default()
        .with_mutation_rate(1.0)
        .with_decision_bias(0.0)
        .with_depth_limit(depth_limit);
    let mut tree = ProgramTree::random(rng);
    for _ in 0..20 {
        mutate_tree(&mut tree, &config, rng).unwrap();
    }
    tree
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = small_config().with_replacements(5);
    let result = Evolution::new(Arc::new(PointSystem::american()), config);
    assert!(matches!(
        result,
        Err(PokerSquaresError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_mutation_respects_depth_limit() {
    let mut rng = StdRng::seed_from_u64(1);
    for depth_limit in 1..=4 {
        let config = EvolutionConfig::default()
            .with_mutation_rate(0.8)
            .with_decision_bias(0.2)
            .with_depth_limit(depth_limit);
        let mut tree = ProgramTree::random(&mut rng);
        for _ in 0..200 {
            mutate_tree(&mut tree, &config, &mut rng).unwrap();
            assert!(tree.max_depth().unwrap() <= depth_limit);
            assert!(tree.validate().is_ok());
        }
    }
}

#[test]
fn test_mutation_grows_trees_to_the_limit() {
    let mut rng = StdRng::seed_from_u64(2);
    let tree = grown_tree(&mut rng, 3);
    assert_eq!(tree.max_depth().unwrap(), 3);
    assert!(tree.validate().is_ok());
}

#[test]
fn test_zero_mutation_rate_changes_nothing() {
    let mut rng = StdRng::seed_from_u64(3);
    let config = EvolutionConfig::default().with_mutation_rate(0.0);
    let mut tree = ProgramTree::random(&mut rng);
    let before = tree.to_string();
    assert_eq!(mutate_tree(&mut tree, &config, &mut rng).unwrap(), 0);
    assert_eq!(tree.to_string(), before);
}

#[test]
fn test_invalid_mutation_rate_is_rejected() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut tree = ProgramTree::random(&mut rng);
    let before = tree.to_string();
    for rate in [1.5, -0.1] {
        let config = EvolutionConfig::default().with_mutation_rate(rate);
        assert!(matches!(
            mutate_tree(&mut tree, &config, &mut rng),
            Err(PokerSquaresError::InvalidConfiguration(_))
        ));
    }
    assert_eq!(tree.to_string(), before);
}

#[test]
fn test_arena_stays_proportional_to_tree_size() {
    let mut rng = StdRng::seed_from_u64(12);
    let config = EvolutionConfig::default();
    let mut a = ProgramTree::random(&mut rng);
    let mut b = ProgramTree::random(&mut rng);

    for _ in 0..2000 {
        mutate_tree(&mut a, &config, &mut rng).unwrap();
        mutate_tree(&mut b, &config, &mut rng).unwrap();
        assert!(a.slots() <= 2 * a.len(), "{} slots for {} nodes", a.slots(), a.len());
        assert!(b.slots() <= 2 * b.len(), "{} slots for {} nodes", b.slots(), b.len());

        exchange_subtrees(&mut a, &mut b, config.depth_limit, &mut rng).unwrap();
        assert!(a.slots() <= 2 * a.len());
        assert!(b.slots() <= 2 * b.len());
    }
    assert!(a.validate().is_ok());
    assert!(b.validate().is_ok());
}

#[test]
fn test_subtree_exchange_keeps_trees_valid() {
    let mut rng = StdRng::seed_from_u64(4);
    let depth_limit = 3;
    let mut a = grown_tree(&mut rng, depth_limit);
    let mut b = ProgramTree::random(&mut rng);
    let total = a.len() + b.len();

    let mut exchanges = 0;
    for _ in 0..100 {
        if exchange_subtrees(&mut a, &mut b, depth_limit, &mut rng).unwrap() {
            exchanges += 1;
        }
        assert!(a.validate().is_ok());
        assert!(b.validate().is_ok());
        assert!(a.max_depth().unwrap() <= depth_limit);
        assert!(b.max_depth().unwrap() <= depth_limit);
        assert_eq!(a.len() + b.len(), total);
    }
    assert!(exchanges > 0);
}

#[test]
fn test_exchange_between_leaves_swaps_them() {
    let mut rng = StdRng::seed_from_u64(5);
    let first = Decision::new(poker_squares::Strategy::TopLeft, Orientation::Row);
    let second = Decision::new(poker_squares::Strategy::MostSuit, Orientation::Column);
    let mut a = ProgramTree::leaf(first);
    let mut b = ProgramTree::leaf(second);

    assert!(exchange_subtrees(&mut a, &mut b, 1, &mut rng).unwrap());
    assert_eq!(a.to_string(), ProgramTree::leaf(second).to_string().replace("[0]", "[1]"));
    assert_eq!(b.to_string(), ProgramTree::leaf(first).to_string().replace("[0]", "[1]"));
}

#[test]
fn test_fitness_is_rounded_mean_of_seeded_games() {
    let mut rng = StdRng::seed_from_u64(6);
    let tree = ProgramTree::random(&mut rng);
    let system = Arc::new(PointSystem::american());
    let config = small_config();

    let expected = {
        let mut player = ProgramPlayer::with_rng(&tree, StdRng::seed_from_u64(77));
        let mut game = PokerSquares::new(&mut player, Arc::clone(&system), GameConfig::default());
        let scores = game.play_sequence(3, 100).unwrap();
        GameStatistics::from_scores(&scores).unwrap().rounded_mean()
    };
    assert_eq!(fitness(&tree, &system, &config, 77).unwrap(), expected);
}

#[test]
fn test_selection_replaces_the_weakest() {
    let mut evolution = Evolution::with_rng(
        Arc::new(PointSystem::british()),
        small_config(),
        StdRng::seed_from_u64(7),
    )
    .unwrap();
    evolution.assess_fitness().unwrap();
    let mut fitnesses: Vec<i32> = evolution
        .population()
        .iter()
        .map(|ind| ind.fitness.unwrap())
        .collect();
    fitnesses.sort_unstable_by(|a, b| b.cmp(a));

    evolution.select().unwrap();
    let after: Vec<i32> = evolution
        .population()
        .iter()
        .map(|ind| ind.fitness.unwrap())
        .collect();

    assert_eq!(after.len(), 8);
    assert_eq!(&after[..6], &fitnesses[..6]);
    assert_eq!(&after[6..], &fitnesses[..2]);
    for individual in evolution.population() {
        assert!(individual.tree.validate().is_ok());
    }
    assert_eq!(evolution.best().unwrap().1, fitnesses[0]);
}

#[test]
fn test_crossover_none_leaves_trees_alone() {
    let config = small_config()
        .with_crossover(CrossoverStrategy::None)
        .with_crossover_rate(1.0);
    let mut evolution = Evolution::with_rng(
        Arc::new(PointSystem::american()),
        config,
        StdRng::seed_from_u64(8),
    )
    .unwrap();

    let mut before: Vec<String> = evolution
        .population()
        .iter()
        .map(|ind| ind.tree.to_string())
        .collect();
    evolution.crossover().unwrap();
    let mut after: Vec<String> = evolution
        .population()
        .iter()
        .map(|ind| ind.tree.to_string())
        .collect();

    before.sort();
    after.sort();
    assert_eq!(before, after);
}

#[test]
fn test_run_keeps_population_within_limits() {
    let config = small_config().with_depth_limit(2).with_mutation_rate(0.5);
    let mut evolution = Evolution::with_rng(
        Arc::new(PointSystem::american()),
        config,
        StdRng::seed_from_u64(9),
    )
    .unwrap();

    let reports = evolution.run(4).unwrap();
    assert_eq!(reports.len(), 4);
    assert_eq!(evolution.generation(), 4);
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.generation, i);
        assert!(report.worst as f64 <= report.mean && report.mean <= report.best as f64);
        assert!(report.max_depth <= 2);
    }

    assert_eq!(evolution.population().len(), 8);
    for individual in evolution.population() {
        assert!(individual.tree.validate().is_ok());
        assert!(individual.tree.max_depth().unwrap() <= 2);
        assert!(individual.tree.slots() <= 2 * individual.tree.len());
    }
    let (champion, champion_fitness) = evolution.best().unwrap();
    assert_eq!(champion_fitness, reports[3].best);
    assert!(champion.validate().is_ok());
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = |seed| {
        let mut evolution = Evolution::with_rng(
            Arc::new(PointSystem::british()),
            small_config(),
            StdRng::seed_from_u64(seed),
        )
        .unwrap();
        evolution.run(2).unwrap()
    };
    assert_eq!(run(10), run(10));
}
