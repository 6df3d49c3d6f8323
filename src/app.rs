use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use ratatui::Frame;

use crate::audio::{AudioSink, SoundScheduler};
use crate::config::{ConfigError, GameConfig};
use crate::driver::{FrameOutcome, LoopDriver};
use crate::engine::{Game, GameState, Snapshot};
use crate::error::{self, InitError};
use crate::input::InputBuffer;
use crate::render;

/// Keys the shell handles itself instead of passing to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellAction {
    Quit,
    Restart,
}

pub fn shell_action(key: &KeyEvent) -> Option<ShellAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(ShellAction::Quit);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(ShellAction::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(ShellAction::Restart),
        _ => None,
    }
}

/// A play session: the current game instance plus everything that outlives it.
pub struct App {
    config: GameConfig,
    seed: Option<u64>,
    game: Game<InputBuffer>,
    driver: LoopDriver,
    sounds: SoundScheduler,
    halted: bool,
    best: u32,
    games_played: u32,
    release_each_frame: bool,
    should_quit: bool,
}

impl App {
    /// Fails if the config is invalid or `surface` (columns, rows) can't show the field.
    pub fn new(
        config: GameConfig,
        surface: (u16, u16),
        sink: Box<dyn AudioSink>,
        seed: Option<u64>,
        now: Instant,
    ) -> Result<Self, InitError> {
        config.validate()?;
        error::check_surface(config.field, surface)?;
        let game = Self::build_game(&config, seed)?;

        Ok(App {
            config,
            seed,
            game,
            driver: LoopDriver::new(now),
            sounds: SoundScheduler::new(sink),
            halted: false,
            best: 0,
            games_played: 0,
            release_each_frame: false,
            should_quit: false,
        })
    }

    fn build_game(config: &GameConfig, seed: Option<u64>) -> Result<Game<InputBuffer>, ConfigError> {
        match seed {
            Some(seed) => Game::with_seed(config, InputBuffer::new(), seed),
            None => Game::new(config, InputBuffer::new()),
        }
    }

    /// Terminals that never send key releases get presses that last one frame.
    pub fn set_release_each_frame(&mut self, release: bool) {
        self.release_each_frame = release;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn game(&self) -> &Game<InputBuffer> {
        &self.game
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        self.game.snapshot()
    }

    pub fn pending_sounds(&self) -> usize {
        self.sounds.pending()
    }

    pub fn handle_key_event(&mut self, key: KeyEvent, now: Instant) -> Result<(), ConfigError> {
        match shell_action(&key) {
            Some(ShellAction::Quit) => {
                info!("Quit requested");
                self.should_quit = true;
            }
            Some(ShellAction::Restart) => self.restart(now)?,
            None => self.game.input_mut().handle_key_event(key),
        }
        Ok(())
    }

    /// Throws the current game away and builds a fresh one.
    pub fn restart(&mut self, now: Instant) -> Result<(), ConfigError> {
        let seed = self
            .seed
            .map(|seed| seed.wrapping_add(u64::from(self.games_played) + 1));
        self.game = Self::build_game(&self.config, seed)?;
        self.driver = LoopDriver::new(now);
        self.sounds.cancel_pending();
        self.halted = false;
        info!("Restarted, best score so far {}", self.best);
        Ok(())
    }

    /// One pass of the frame loop, minus the drawing.
    pub fn frame(&mut self, now: Instant) {
        if !self.halted {
            let was_over = self.game.state() == GameState::Over;
            if self.driver.frame(&mut self.game, now) == FrameOutcome::Halted {
                self.halted = true;
            }

            let events = self.game.drain_events();
            self.sounds.handle_events(&events, now);

            if !was_over && self.game.state() == GameState::Over {
                self.record_game_over();
            }
        }

        self.sounds.poll(now);

        if self.release_each_frame {
            self.game.input_mut().release_all();
        }
    }

    fn record_game_over(&mut self) {
        let score = self.game.progression().score();
        self.games_played += 1;
        if score > self.best {
            self.best = score;
        }
        info!(
            "Game {} over: score {}, level {}, best {}",
            self.games_played,
            score,
            self.game.progression().level(),
            self.best
        );
    }

    pub fn draw(&self, frame: &mut Frame) {
        render::draw(frame, &self.game.snapshot(), self.best);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silent;
    use crate::grid::{Cell, Direction};
    use crate::input::InputSource;
    use crossterm::event::KeyEventState;
    use std::time::Duration;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn doomed_config() -> GameConfig {
        GameConfig::default()
            .with_food(Cell::new(575, 0))
            .with_snek(vec![Cell::new(550, 0), Cell::new(525, 0)], Direction::Right)
    }

    fn app(config: GameConfig, t0: Instant) -> App {
        App::new(config, (80, 24), Box::new(Silent), Some(5), t0).unwrap()
    }

    #[test]
    fn test_shell_keys() {
        assert_eq!(shell_action(&press(KeyCode::Esc)), Some(ShellAction::Quit));
        assert_eq!(shell_action(&press(KeyCode::Char('Q'))), Some(ShellAction::Quit));
        assert_eq!(
            shell_action(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ShellAction::Quit)
        );
        assert_eq!(shell_action(&press(KeyCode::Char('r'))), Some(ShellAction::Restart));
        assert_eq!(shell_action(&press(KeyCode::Char(' '))), None);
        assert_eq!(shell_action(&press(KeyCode::Up)), None);

        let release = KeyEvent {
            code: KeyCode::Esc,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(shell_action(&release), None);
    }

    #[test]
    fn test_surface_too_small() {
        let result = App::new(GameConfig::default(), (40, 24), Box::new(Silent), None, Instant::now());
        assert!(matches!(result, Err(InitError::SurfaceTooSmall { .. })));

        // More columns than a terminal can have
        let huge = GameConfig::new(65_536 * 25, 400, 25);
        let result = App::new(huge, (80, 24), Box::new(Silent), None, Instant::now());
        assert!(matches!(result, Err(InitError::SurfaceTooSmall { .. })));
    }

    #[test]
    fn test_invalid_config() {
        let result = App::new(
            GameConfig::new(601, 400, 25),
            (80, 24),
            Box::new(Silent),
            None,
            Instant::now(),
        );
        assert!(matches!(result, Err(InitError::Config(_))));
    }

    #[test]
    fn test_session_tracks_best_and_restarts() {
        let t0 = Instant::now();
        let mut app = app(doomed_config(), t0);
        app.set_release_each_frame(true);

        app.handle_key_event(press(KeyCode::Char(' ')), t0).unwrap();
        app.frame(t0);
        assert_eq!(app.game().state(), GameState::Started);

        // Eat at 575, crash at 600
        app.frame(t0 + Duration::from_millis(200));
        assert_eq!(app.game().progression().score(), 1);
        app.frame(t0 + Duration::from_millis(400));
        assert_eq!(app.game().state(), GameState::Over);
        assert_eq!(app.best(), 1);
        assert_eq!(app.games_played(), 1);
        assert_eq!(app.pending_sounds(), 1, "game-over cue waits for its delay");

        app.frame(t0 + Duration::from_millis(1000));
        assert_eq!(app.pending_sounds(), 0);

        app.handle_key_event(press(KeyCode::Char('r')), t0 + Duration::from_millis(1100))
            .unwrap();
        assert_eq!(app.game().state(), GameState::NotStarted);
        assert_eq!(app.game().progression().score(), 0);
        assert_eq!(app.best(), 1, "best survives the restart");
        assert_eq!(app.snapshot().snek.len(), 2);
    }

    #[test]
    fn test_space_only_lasts_one_frame_without_release_events() {
        let t0 = Instant::now();
        let mut app = app(GameConfig::default(), t0);
        app.set_release_each_frame(true);

        app.handle_key_event(press(KeyCode::Char(' ')), t0).unwrap();
        assert!(app.game().input().is_pressed(KeyCode::Char(' ')));
        app.frame(t0);
        assert!(!app.game().input().is_pressed(KeyCode::Char(' ')));
    }

    #[test]
    fn test_quit() {
        let t0 = Instant::now();
        let mut app = app(GameConfig::default(), t0);
        assert!(!app.should_quit());
        app.handle_key_event(press(KeyCode::Esc), t0).unwrap();
        assert!(app.should_quit());
    }
}
