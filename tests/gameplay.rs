use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use snekade::audio::{AudioSink, Cue, SoundScheduler};
use snekade::input::START_KEY;
use snekade::{
    Cell, ConfigError, Direction, FrameOutcome, Game, GameConfig, GameState, InputBuffer,
    LoopDriver, Progression, ProgressionRules, StepResult,
};

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<Cue>>>);

impl AudioSink for Recorder {
    fn play(&mut self, cue: Cue) -> io::Result<()> {
        self.0.borrow_mut().push(cue);
        Ok(())
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[test]
fn test_full_game_with_sounds() {
    let config = GameConfig::default()
        .with_snek(vec![Cell::new(500, 0), Cell::new(475, 0)], Direction::Right)
        .with_food(Cell::new(525, 0))
        .with_level_threshold(1);
    let mut game = Game::with_seed(&config, InputBuffer::new(), 42).unwrap();
    let recorder = Recorder::default();
    let mut sounds = SoundScheduler::new(Box::new(recorder.clone()));

    let t0 = Instant::now();
    let mut driver = LoopDriver::new(t0);

    game.input_mut().press(START_KEY);
    driver.frame(&mut game, t0);
    game.input_mut().release(START_KEY);
    sounds.handle_events(&game.drain_events(), t0);
    assert_eq!(game.state(), GameState::Started);

    // First move lands on the food
    driver.frame(&mut game, t0 + ms(200));
    sounds.handle_events(&game.drain_events(), t0 + ms(200));
    assert_eq!(game.progression().score(), 1);
    assert_eq!(game.progression().level(), 2);
    assert_eq!(game.tick_interval(), ms(180));

    // Keep going right until the wall
    let mut now = t0 + ms(200);
    let mut crashed_at = None;
    for _ in 0..500 {
        now += ms(10);
        match driver.frame(&mut game, now) {
            FrameOutcome::Continue { .. } => {}
            FrameOutcome::Halted => break,
        }
        sounds.handle_events(&game.drain_events(), now);
        if crashed_at.is_none() && game.state() == GameState::Over {
            crashed_at = Some(now);
        }
    }

    let crashed_at = crashed_at.expect("snek reaches the right wall");
    assert_eq!(game.snek().head(), Cell::new(575, 0));
    assert_eq!(
        game.progression().level(),
        game.progression().score() + 1,
        "one level per point"
    );

    let played = recorder.0.borrow().clone();
    assert_eq!(played.first(), Some(&Cue::GameStart));
    assert_eq!(played.get(1), Some(&Cue::Eat));
    assert_eq!(played.last(), Some(&Cue::Explode));
    assert!(!played.contains(&Cue::GameOver));

    sounds.poll(crashed_at + ms(499));
    assert!(!recorder.0.borrow().contains(&Cue::GameOver));
    sounds.poll(crashed_at + ms(500));
    assert_eq!(recorder.0.borrow().last(), Some(&Cue::GameOver));
}

#[test]
fn test_turns_queue_up_to_two() {
    let config = GameConfig::default().with_food(Cell::new(0, 375));
    let mut game = Game::with_seed(&config, InputBuffer::new(), 1).unwrap();
    game.input_mut().press(START_KEY);
    assert!(game.check_start());

    // Three turns in one tick interval: the third never makes it in
    game.input_mut().press(KeyCode::Down);
    game.input_mut().press(KeyCode::Left);
    game.input_mut().press(KeyCode::Up);
    assert_eq!(game.input().queued(), 2);

    assert_eq!(game.tick(), StepResult::Ongoing);
    assert_eq!(game.snek().head(), Cell::new(75, 25));
    assert_eq!(game.tick(), StepResult::Ongoing);
    assert_eq!(game.snek().head(), Cell::new(50, 25));
    assert_eq!(game.tick(), StepResult::Ongoing);
    assert_eq!(game.snek().head(), Cell::new(25, 25));
    assert_eq!(game.snek().direction(), Direction::Left);
}

#[test]
fn test_speed_bottoms_out() {
    let rules = ProgressionRules {
        level_threshold: 1,
        ..ProgressionRules::default()
    };
    let mut progression = Progression::new(rules);

    let level_ups = (0..20).filter_map(|_| progression.record_food()).count();

    assert_eq!(level_ups, 20);
    assert_eq!(progression.score(), 20);
    assert_eq!(progression.level(), 21);
    assert_eq!(progression.tick_interval(), ms(50));
}

#[test]
fn test_bad_config_is_refused() {
    let config = GameConfig::default().with_food(Cell::new(75, 0));
    assert!(matches!(
        Game::new(&config, InputBuffer::new()),
        Err(ConfigError::FoodOnSnek(_))
    ));

    let config = GameConfig::default().with_min_interval(ms(300));
    assert!(matches!(
        Game::new(&config, InputBuffer::new()),
        Err(ConfigError::FloorAboveInitial { .. })
    ));
}
