use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::Show,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use log::{error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use simplelog::{Config, LevelFilter, WriteLogger};

use snekade::audio::{AudioSink, Bell, Silent};
use snekade::{consts, App, GameConfig, InitError};

#[derive(Parser)]
#[command(name = "snekade")]
#[command(version, about = "Grid snake arcade game for the terminal")]
struct Cli {
    /// Field width in pixels, a multiple of --unit and at least four units
    #[arg(long, default_value_t = consts::FIELD_WIDTH)]
    width: i32,

    /// Field height in pixels, a multiple of --unit
    #[arg(long, default_value_t = consts::FIELD_HEIGHT)]
    height: i32,

    /// Grid cell size in pixels
    #[arg(long, default_value_t = consts::UNIT)]
    unit: i32,

    /// Tick interval at level 1, in milliseconds
    #[arg(long, default_value_t = consts::INITIAL_SPEED.as_millis() as u64)]
    speed_ms: u64,

    /// Fastest allowed tick interval, in milliseconds
    #[arg(long, default_value_t = consts::MIN_SPEED.as_millis() as u64)]
    min_speed_ms: u64,

    /// How much faster each level ticks, in milliseconds
    #[arg(long, default_value_t = consts::SPEED_DECREASE.as_millis() as u64)]
    speed_decrease_ms: u64,

    /// Points per level
    #[arg(long, default_value_t = consts::SCORE_THRESHOLD)]
    level_threshold: u32,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Don't ring the terminal bell
    #[arg(long)]
    mute: bool,

    /// Frames per second
    #[arg(long, default_value_t = consts::DEFAULT_FPS)]
    fps: u32,

    #[arg(long, default_value = "snekade.log")]
    log_file: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

impl Cli {
    fn game_config(&self) -> GameConfig {
        GameConfig::new(self.width, self.height, self.unit)
            .with_initial_interval(Duration::from_millis(self.speed_ms))
            .with_min_interval(Duration::from_millis(self.min_speed_ms))
            .with_interval_decrement(Duration::from_millis(self.speed_decrease_ms))
            .with_level_threshold(self.level_threshold)
    }
}

type Term = Terminal<CrosstermBackend<Stdout>>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging before anything else
    WriteLogger::init(
        cli.log_level,
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?,
    )
    .context("Failed to initialize logger")?;

    info!("Starting Snekade");

    let config = cli.game_config();
    let size = terminal::size()
        .map_err(InitError::Terminal)
        .context("Failed to read terminal size")?;
    let sink: Box<dyn AudioSink> = if cli.mute {
        Box::new(Silent)
    } else {
        Box::new(Bell::new(io::stdout()))
    };
    // Bad settings are rejected here, before the terminal is touched
    let mut app = App::new(config, size, sink, cli.seed, Instant::now())
        .context("Could not start the game")?;

    let mut terminal = setup_terminal(&mut app)?;
    let frame_budget = Duration::from_secs(1) / cli.fps.max(1);
    let result = run(&mut terminal, &mut app, frame_budget);

    // Always hand the terminal back, even if the loop failed
    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {:#}", e);
    }
    if let Err(e) = &result {
        error!("Game loop failed: {:#}", e);
    }

    info!(
        "Exiting after {} games, best score {}",
        app.games_played(),
        app.best()
    );
    result
}

fn setup_terminal(app: &mut App) -> Result<Term> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    match enter_game_screen(app) {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            // Whatever got switched on before the failure goes back off
            let _ = reset_terminal(&mut io::stdout(), keyboard_flags_pushed());
            Err(e)
        }
    }
}

fn enter_game_screen(app: &mut App) -> Result<Term> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    // Without release events a held key would stay pressed forever
    match terminal::supports_keyboard_enhancement() {
        Ok(true) => {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .context("Failed to enable key release events")?;
            info!("Terminal reports key releases");
        }
        Ok(false) => {
            info!("Terminal can't report key releases, presses last one frame");
            app.set_release_each_frame(true);
        }
        Err(e) => {
            warn!("Could not query keyboard enhancement support: {}", e);
            app.set_release_each_frame(true);
        }
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.hide_cursor().context("Failed to hide cursor")?;
    terminal.clear().context("Failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    reset_terminal(terminal.backend_mut(), keyboard_flags_pushed())
}

fn keyboard_flags_pushed() -> bool {
    terminal::supports_keyboard_enhancement().unwrap_or(false)
}

/// Undoes every terminal mode the game may have turned on. Each step runs
/// even if an earlier one failed; the first failure is returned.
fn reset_terminal(out: &mut impl Write, pop_keyboard_flags: bool) -> Result<()> {
    let steps = [
        if pop_keyboard_flags {
            execute!(out, PopKeyboardEnhancementFlags).context("Failed to reset keyboard flags")
        } else {
            Ok(())
        },
        disable_raw_mode().context("Failed to disable raw mode"),
        execute!(out, LeaveAlternateScreen).context("Failed to leave alternate screen"),
        execute!(out, Show).context("Failed to show cursor"),
    ];

    let mut first_error = None;
    for step in steps {
        if let Err(e) = step {
            warn!("{:#}", e);
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Input, simulate, draw, once per frame until the player quits.
fn run(terminal: &mut Term, app: &mut App, frame_budget: Duration) -> Result<()> {
    let mut next_frame = Instant::now();

    loop {
        next_frame += frame_budget;

        // Keys pile up in the input buffer until the frame is due
        while event::poll(next_frame.saturating_duration_since(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key_event(key, Instant::now())
                    .context("Failed to restart the game")?;
            }
            if app.should_quit() {
                return Ok(());
            }
        }

        let now = Instant::now();
        // Don't try to replay frames we slept through
        if next_frame < now {
            next_frame = now;
        }

        app.frame(now);
        terminal.draw(|f| app.draw(f))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fails the first `failures` writes, then records everything.
    struct FlakyWriter {
        failures: usize,
        written: Vec<u8>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(io::ErrorKind::Other, "pipe closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reset_keeps_going_after_a_failed_step() {
        let mut out = FlakyWriter {
            failures: 1,
            written: Vec::new(),
        };

        let err = reset_terminal(&mut out, true).unwrap_err();

        assert_eq!(err.to_string(), "Failed to reset keyboard flags");
        let written = String::from_utf8_lossy(&out.written);
        assert!(written.contains("\x1b[?1049l"), "left the alternate screen");
        assert!(written.contains("\x1b[?25h"), "cursor shown again");
    }

    #[test]
    fn test_reset_without_keyboard_flags() {
        let mut out = FlakyWriter {
            failures: 0,
            written: Vec::new(),
        };

        reset_terminal(&mut out, false).unwrap();
        let written = String::from_utf8_lossy(&out.written);
        assert!(!written.contains("\x1b[<1u"));
        assert!(written.contains("\x1b[?1049l"));
    }

    #[test]
    fn test_cli_defaults_build_the_classic_game() {
        let cli = Cli::parse_from(["snekade"]);
        assert_eq!(cli.game_config(), GameConfig::default());
        assert_eq!(cli.fps, 60);
        assert!(!cli.mute);
    }
}
