use std::time::{Duration, Instant};

use log::debug;

use crate::engine::{Game, GameState, StepResult};
use crate::input::InputSource;

/// What the host should do after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Render and schedule another frame. `ticks` is how many moves ran.
    Continue { ticks: u32 },
    /// The game is over, stop scheduling frames for this instance.
    Halted,
}

/// Fixed-timestep driver: frames come at whatever rate the host manages,
/// ticks come at the game's current speed.
#[derive(Debug, Clone)]
pub struct LoopDriver {
    last_frame: Instant,
    accumulator: Duration,
}

impl LoopDriver {
    pub fn new(now: Instant) -> Self {
        LoopDriver {
            last_frame: now,
            accumulator: Duration::ZERO,
        }
    }

    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// One frame callback.
    pub fn frame<I: InputSource>(&mut self, game: &mut Game<I>, now: Instant) -> FrameOutcome {
        game.check_start();

        if game.state() == GameState::Over {
            return FrameOutcome::Halted;
        }

        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        if game.state() != GameState::Started {
            return FrameOutcome::Continue { ticks: 0 };
        }

        self.accumulator += elapsed;

        let mut ticks = 0;
        while self.accumulator >= game.tick_interval() {
            self.accumulator -= game.tick_interval();
            ticks += 1;

            if let StepResult::Collision(_) = game.tick() {
                self.accumulator = Duration::ZERO;
                break;
            }
        }

        if ticks > 1 {
            debug!("Caught up {} ticks in one frame", ticks);
        }

        FrameOutcome::Continue { ticks }
    }
}
