//! Snekade - the classic grid snake, in a terminal
//!
//! - `engine`: snek movement, collisions, food and game state
//! - `driver`: fixed-timestep loop driving the engine from frame callbacks
//! - `input`: pressed keys and the queue of pending turns
//! - `progression`: score, level and speed
//! - `render` / `audio`: how the game is shown and heard
//! - `app`: a play session around one game instance at a time

pub mod app;
pub mod audio;
pub mod config;
pub mod consts;
pub mod driver;
pub mod engine;
pub mod error;
pub mod grid;
pub mod input;
pub mod progression;
pub mod render;

pub use app::App;
pub use config::{ConfigError, GameConfig};
pub use driver::{FrameOutcome, LoopDriver};
pub use engine::{Collision, Game, GameEvent, GameState, Snapshot, StepResult};
pub use error::InitError;
pub use grid::{Cell, Direction, Field};
pub use input::{InputBuffer, InputSource};
pub use progression::{Progression, ProgressionRules};
