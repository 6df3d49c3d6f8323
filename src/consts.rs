//! Hard-coded defaults for the classic game

use std::time::Duration;

/// Size of one grid cell in field pixels. Every position is a multiple of it.
pub const UNIT: i32 = 25;

pub const FIELD_WIDTH: i32 = 600;
pub const FIELD_HEIGHT: i32 = 400;

/// Starting body, head first, heading right along the top row.
pub const INITIAL_SNEK: [(i32, i32); 4] = [(UNIT * 3, 0), (UNIT * 2, 0), (UNIT, 0), (0, 0)];

pub const INITIAL_FOOD: (i32, i32) = (UNIT * 8, 0);

/// Tick interval at level 1
pub const INITIAL_SPEED: Duration = Duration::from_millis(200);

/// How much faster each level gets
pub const SPEED_DECREASE: Duration = Duration::from_millis(20);

/// Ticks never get closer together than this
pub const MIN_SPEED: Duration = Duration::from_millis(50);

/// Points per level
pub const SCORE_THRESHOLD: u32 = 5;

pub const INITIAL_LEVEL: u32 = 1;
pub const INITIAL_SCORE: u32 = 0;

/// Pause between the crash and the game-over jingle
pub const GAME_OVER_SOUND_DELAY: Duration = Duration::from_millis(500);

/// Capacity of the pending-direction queue
pub const DIRECTION_QUEUE_CAPACITY: usize = 2;

/// Storage key reserved for a persisted high score. Nothing reads or writes it yet.
pub const HIGH_SCORE_KEY: &str = "snake-game-high-score";

/// Frame cadence of the terminal loop
pub const DEFAULT_FPS: u32 = 60;
