use poker_squares::{
    play_tournament, Card, Cell, GameConfig, GameOutcome, GameStatistics, Player, PointSystem,
    PokerSquares, RandomPlayer, Result, SetupTask,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Fills the grid in row-major order and remembers every card it was dealt
#[derive(Default)]
struct RowMajorPlayer {
    next: usize,
    dealt: Vec<Card>,
}

impl Player for RowMajorPlayer {
    fn prepare(&mut self, _system: Arc<PointSystem>, _budget: Duration) {}

    fn reset(&mut self) {
        self.next = 0;
    }

    fn choose(&mut self, card: Card, _remaining: Duration) -> Result<Cell> {
        self.dealt.push(card);
        let cell = Cell::from_index(self.next);
        self.next += 1;
        Ok(cell)
    }

    fn name(&self) -> String {
        "RowMajorPlayer".to_string()
    }
}

/// Always answers with the same cell
struct StubbornPlayer {
    cell: Cell,
}

impl Player for StubbornPlayer {
    fn prepare(&mut self, _system: Arc<PointSystem>, _budget: Duration) {}

    fn reset(&mut self) {}

    fn choose(&mut self, _card: Card, _remaining: Duration) -> Result<Cell> {
        Ok(self.cell)
    }

    fn name(&self) -> String {
        format!("Stubborn{}", self.cell)
    }
}

/// Thinks longer than any reasonable play clock
struct SlowPlayer {
    inner: RowMajorPlayer,
    delay: Duration,
}

impl Player for SlowPlayer {
    fn prepare(&mut self, _system: Arc<PointSystem>, _budget: Duration) {}

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn choose(&mut self, card: Card, remaining: Duration) -> Result<Cell> {
        thread::sleep(self.delay);
        self.inner.choose(card, remaining)
    }

    fn name(&self) -> String {
        "SlowPlayer".to_string()
    }
}

/// Hands the engine a background setup task of a given length
struct SetupPlayer {
    setup: Duration,
    finished: Arc<AtomicBool>,
    prepared: Arc<AtomicUsize>,
    inner: RowMajorPlayer,
}

impl SetupPlayer {
    fn new(setup: Duration) -> Self {
        SetupPlayer {
            setup,
            finished: Arc::new(AtomicBool::new(false)),
            prepared: Arc::new(AtomicUsize::new(0)),
            inner: RowMajorPlayer::default(),
        }
    }
}

impl Player for SetupPlayer {
    fn prepare(&mut self, _system: Arc<PointSystem>, _budget: Duration) {
        self.prepared.fetch_add(1, Ordering::SeqCst);
    }

    fn setup_task(&self, _system: &Arc<PointSystem>) -> Option<SetupTask> {
        let setup = self.setup;
        let finished = Arc::clone(&self.finished);
        Some(Box::new(move || {
            thread::sleep(setup);
            finished.store(true, Ordering::SeqCst);
        }))
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn choose(&mut self, card: Card, remaining: Duration) -> Result<Cell> {
        self.inner.choose(card, remaining)
    }

    fn name(&self) -> String {
        "SetupPlayer".to_string()
    }
}

fn quick_config() -> GameConfig {
    GameConfig::default()
        .with_game_time(Duration::from_secs(5))
        .with_prepare_time(Duration::from_millis(100))
}

#[test]
fn test_completed_game_score_matches_grid() {
    let mut player = RandomPlayer::with_rng(StdRng::seed_from_u64(3));
    let system = Arc::new(PointSystem::american());
    let mut game = PokerSquares::new(&mut player, Arc::clone(&system), quick_config());
    game.set_seed(17);

    let outcome = game.play().unwrap();
    assert!(outcome.is_completed());
    assert!(game.grid().is_full());
    assert_eq!(outcome.score(), system.score(game.grid()));
}

#[test]
fn test_seeded_deals_are_reproducible() {
    let mut player = RowMajorPlayer::default();
    {
        let mut game = PokerSquares::new(&mut player, Arc::new(PointSystem::british()), quick_config());
        game.set_seed(5);
        game.play().unwrap();
        game.set_seed(5);
        game.play().unwrap();
    }

    assert_eq!(player.dealt.len(), 50);
    let (first, second) = player.dealt.split_at(25);
    assert_eq!(first, second);

    let mut ids: Vec<usize> = first.iter().map(|c| c.id()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 25, "a deal never repeats a card");
}

#[test]
fn test_play_sequence_uses_consecutive_seeds() {
    let system = Arc::new(PointSystem::american());

    let mut player = RowMajorPlayer::default();
    let scores = {
        let mut game = PokerSquares::new(&mut player, Arc::clone(&system), quick_config());
        game.play_sequence(3, 40).unwrap()
    };
    assert_eq!(scores.len(), 3);

    let mut single = RowMajorPlayer::default();
    let mut game = PokerSquares::new(&mut single, system, quick_config());
    game.set_seed(42);
    let third = game.play().unwrap().score();
    assert_eq!(scores[2], third);
}

#[test]
fn test_occupied_cell_ends_game_with_penalty() {
    let system = Arc::new(PointSystem::new([-2, 1, 2, 3, 4, 5, 6, 7, 8, 9]));
    let mut player = StubbornPlayer {
        cell: Cell::new(2, 3),
    };
    let mut game = PokerSquares::new(&mut player, system, quick_config());

    let outcome = game.play().unwrap();
    assert_eq!(
        outcome,
        GameOutcome::IllegalPlay {
            cell: Cell::new(2, 3),
            score: -20
        }
    );
    assert_eq!(game.grid().num_cards(), 1, "play stops at the illegal move");
}

#[test]
fn test_out_of_range_cell_is_illegal() {
    let system = Arc::new(PointSystem::british());
    let mut player = StubbornPlayer {
        cell: Cell::new(0, 5),
    };
    let mut game = PokerSquares::new(&mut player, system, quick_config());

    let outcome = game.play().unwrap();
    assert!(matches!(outcome, GameOutcome::IllegalPlay { score: 0, .. }));
    assert_eq!(game.grid().num_cards(), 0);
}

#[test]
fn test_exhausted_clock_ends_game() {
    let system = Arc::new(PointSystem::new([-1, 1, 2, 3, 4, 5, 6, 7, 8, 9]));
    let mut player = SlowPlayer {
        inner: RowMajorPlayer::default(),
        delay: Duration::from_millis(30),
    };
    let config = GameConfig::default().with_game_time(Duration::from_millis(50));
    let mut game = PokerSquares::new(&mut player, system, config);

    let outcome = game.play().unwrap();
    assert_eq!(outcome, GameOutcome::OutOfTime { score: -10 });
    assert!(!outcome.is_completed());
}

#[test]
fn test_slow_setup_does_not_block_play() {
    let mut player = SetupPlayer::new(Duration::from_secs(2));
    let finished = Arc::clone(&player.finished);
    let prepared = Arc::clone(&player.prepared);

    let start = Instant::now();
    let mut game = PokerSquares::new(
        &mut player,
        Arc::new(PointSystem::american()),
        quick_config(),
    );
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(!finished.load(Ordering::SeqCst));
    assert_eq!(prepared.load(Ordering::SeqCst), 1);

    assert!(game.play().unwrap().is_completed());
}

#[test]
fn test_fast_setup_is_awaited() {
    let mut player = SetupPlayer::new(Duration::from_millis(5));
    let finished = Arc::clone(&player.finished);
    let config = quick_config().with_prepare_time(Duration::from_secs(5));

    let _game = PokerSquares::new(&mut player, Arc::new(PointSystem::american()), config);
    assert!(finished.load(Ordering::SeqCst));
}

#[test]
fn test_tournament_normalization() {
    let mut players: Vec<Box<dyn Player>> = vec![
        Box::new(RowMajorPlayer::default()),
        Box::new(StubbornPlayer {
            cell: Cell::new(0, 0),
        }),
        Box::new(RowMajorPlayer::default()),
    ];
    let systems = vec![
        Arc::new(PointSystem::american()),
        Arc::new(PointSystem::british()),
    ];

    let scores = play_tournament(&mut players, &systems, 3, 0, &quick_config()).unwrap();
    assert_eq!(scores.len(), 3);
    assert_eq!(scores[0], 2.0);
    assert_eq!(scores[1], 0.0);
    assert_eq!(scores[2], 2.0);
}

#[test]
fn test_tournament_tie_scores_zero() {
    let mut players: Vec<Box<dyn Player>> = vec![
        Box::new(StubbornPlayer {
            cell: Cell::new(1, 1),
        }),
        Box::new(StubbornPlayer {
            cell: Cell::new(4, 4),
        }),
    ];
    let systems = vec![Arc::new(PointSystem::american())];

    let scores = play_tournament(&mut players, &systems, 2, 7, &quick_config()).unwrap();
    assert_eq!(scores, vec![0.0, 0.0]);
}

#[test]
fn test_rounded_mean_rounds_halves_up() {
    let mean = |scores: &[i32]| GameStatistics::from_scores(scores).unwrap().rounded_mean();
    assert_eq!(mean(&[2, 3]), 3);
    assert_eq!(mean(&[-2, -3]), -2);
    assert_eq!(mean(&[-5, -6, -6]), -6);
    assert_eq!(mean(&[-1, 0]), 0);
    assert_eq!(mean(&[7]), 7);
    assert!(GameStatistics::from_scores(&[]).is_none());
}
