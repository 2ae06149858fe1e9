use poker_squares::grid::NUM_CELLS;
use poker_squares::{
    Card, Cell, GameConfig, GreedyPolicy, MonteCarloConfig, MonteCarloPlayer, Player, PointSystem,
    PokerSquares, PokerSquaresError, RandomPolicy, RolloutKind, RolloutPolicy, SimulationState,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

fn shuffled_deck(seed: u64) -> Vec<Card> {
    let mut deck = Card::deck().to_vec();
    deck.shuffle(&mut StdRng::seed_from_u64(seed));
    deck
}

/// Plays `count` random cards into random open cells, revealing each first
fn play_randomly(state: &mut SimulationState, rng: &mut StdRng, count: usize) {
    for _ in 0..count {
        let card = *state.undealt().choose(rng).unwrap();
        let cell = *state.open_cells().choose(rng).unwrap();
        state.reveal(card);
        state.make_play(card, cell);
    }
}

#[test]
fn test_undo_restores_state_exactly() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut state = SimulationState::new();
    play_randomly(&mut state, &mut rng, 7);
    let snapshot = state.clone();

    for depth in [1, 5, 18] {
        for _ in 0..depth {
            let card = *state.undealt().choose(&mut rng).unwrap();
            let cell = *state.open_cells().choose(&mut rng).unwrap();
            state.make_play(card, cell);
        }
        for _ in 0..depth {
            state.undo_play();
        }
        assert_eq!(state, snapshot, "undo after {} plays", depth);
    }
}

#[test]
fn test_partitions_track_plays() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut state = SimulationState::new();
    assert_eq!(state.open_cells().len(), NUM_CELLS);
    assert_eq!(state.undealt().len(), 52);

    play_randomly(&mut state, &mut rng, 10);
    assert_eq!(state.num_plays(), 10);
    assert_eq!(state.open_cells().len(), 15);
    assert_eq!(state.undealt().len(), 42);
    assert_eq!(state.grid().num_cards(), 10);
    for &cell in state.open_cells() {
        assert!(state.grid().is_empty(Cell::from_index(cell)));
    }
    for card in state.undealt() {
        assert!((0..NUM_CELLS).all(|i| state.grid().get(Cell::from_index(i)) != Some(*card)));
    }

    play_randomly(&mut state, &mut rng, 15);
    assert!(state.is_complete());
    assert!(state.open_cells().is_empty());

    state.reset();
    assert_eq!(state.num_plays(), 0);
    assert_eq!(state.grid().num_cards(), 0);
}

#[test]
fn test_greedy_gain_matches_score_difference() {
    let system = PointSystem::american();
    let mut rng = StdRng::seed_from_u64(3);
    let mut state = SimulationState::new();
    play_randomly(&mut state, &mut rng, 12);

    let card = state.undealt()[0];
    let before = system.score(state.grid());
    for &index in state.open_cells() {
        let cell = Cell::from_index(index);
        let mut grid = *state.grid();
        grid.set(cell, card);
        assert_eq!(
            GreedyPolicy::gain(&state, card, cell, &system),
            system.score(&grid) - before
        );
    }

    let chosen = GreedyPolicy::new().place(&state, card, &system, &mut rng);
    let best = state
        .open_cells()
        .iter()
        .map(|&i| GreedyPolicy::gain(&state, card, Cell::from_index(i), &system))
        .max()
        .unwrap();
    assert_eq!(
        GreedyPolicy::gain(&state, card, Cell::from_index(chosen), &system),
        best
    );

    let random = RandomPolicy::new().place(&state, card, &system, &mut rng);
    assert!(state.open_cells().contains(&random));
}

#[test]
fn test_search_statistics_over_a_game() {
    let mut player = MonteCarloPlayer::with_rng(
        MonteCarloConfig::default()
            .with_depth_limit(1)
            .with_max_rollouts(2),
        StdRng::seed_from_u64(4),
    );
    let system = Arc::new(PointSystem::american());
    let outcome = {
        let config = GameConfig::default().with_game_time(Duration::from_secs(10));
        let mut game = PokerSquares::new(&mut player, Arc::clone(&system), config);
        game.set_seed(9);
        let outcome = game.play().unwrap();
        assert_eq!(outcome.score(), system.score(game.grid()));
        outcome
    };
    assert!(outcome.is_completed());

    let stats = player.statistics();
    // The 25th card has only one open cell and is not searched.
    assert_eq!(stats.searched_moves, 24);
    assert_eq!(stats.candidates, (2..=NUM_CELLS).sum::<usize>());
    assert!(stats.rollouts <= 2 * stats.candidates);
    assert!(stats.summary().contains("Searched moves: 24"));
    assert!(player.state().is_complete());
}

#[test]
fn test_depth_zero_picks_best_immediate_score() {
    let system = Arc::new(PointSystem::british());
    let mut player = MonteCarloPlayer::with_rng(
        MonteCarloConfig::default().with_depth_limit(0),
        StdRng::seed_from_u64(5),
    );
    player.prepare(Arc::clone(&system), Duration::from_secs(1));
    player.reset();

    let mut grid = poker_squares::Grid::new();
    for card in shuffled_deck(21).into_iter().take(NUM_CELLS) {
        let best = grid
            .empty_cells()
            .map(|cell| {
                let mut next = grid;
                next.set(cell, card);
                system.score(&next)
            })
            .max()
            .unwrap();

        let cell = player.choose(card, Duration::from_secs(1)).unwrap();
        assert!(grid.is_empty(cell));
        grid.set(cell, card);
        assert_eq!(system.score(&grid), best);
    }
    assert_eq!(player.statistics().rollouts, 0);
}

#[test]
fn test_zero_time_slices_still_choose() {
    let mut player = MonteCarloPlayer::with_rng(
        MonteCarloConfig::default().with_rollout(RolloutKind::Random),
        StdRng::seed_from_u64(6),
    );
    player.prepare(Arc::new(PointSystem::american()), Duration::ZERO);
    player.reset();

    let card: Card = "7H".parse().unwrap();
    let cell = player.choose(card, Duration::ZERO).unwrap();
    assert!(cell.in_bounds());

    let stats = player.statistics();
    assert_eq!(stats.candidates, NUM_CELLS);
    assert_eq!(stats.degenerate_slices, NUM_CELLS);
    assert_eq!(stats.rollouts, 0);
}

#[test]
fn test_full_grid_has_no_cell_to_choose() {
    let mut player = MonteCarloPlayer::with_rng(
        MonteCarloConfig::default()
            .with_depth_limit(0)
            .with_rollout(RolloutKind::Greedy),
        StdRng::seed_from_u64(7),
    );
    player.prepare(Arc::new(PointSystem::american()), Duration::ZERO);
    player.reset();

    let mut rng = StdRng::seed_from_u64(8);
    let deck = shuffled_deck(rng.gen());
    for &card in deck.iter().take(NUM_CELLS) {
        player.choose(card, Duration::from_secs(1)).unwrap();
    }
    assert!(matches!(
        player.choose(deck[NUM_CELLS], Duration::from_secs(1)),
        Err(PokerSquaresError::NoEmptyCell)
    ));
    assert_eq!(player.name(), "MonteCarloDepth0");
}
