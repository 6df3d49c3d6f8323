use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;

use crate::consts;
use crate::grid::{Cell, Direction, Field};
use crate::progression::ProgressionRules;

/// Reasons a [`GameConfig`] cannot be used to build a game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid unit must be positive, got {0}")]
    InvalidUnit(i32),
    #[error("field must be at least one unit in each direction, got {width}x{height}")]
    EmptyField { width: i32, height: i32 },
    #[error("field {width}x{height} is not a multiple of the {unit}px unit")]
    MisalignedField { width: i32, height: i32, unit: i32 },
    #[error("field is {columns}x{rows} cells, the starting snek needs {needed_columns}x{needed_rows}")]
    SnekDoesNotFit {
        columns: i32,
        rows: i32,
        needed_columns: i32,
        needed_rows: i32,
    },
    #[error("starting snek fills all {0} cells of the field, leaving no room for food")]
    NoRoomForFood(usize),
    #[error("initial snek has no cells")]
    EmptySnek,
    #[error("initial snek cell {0} is not on the grid")]
    MisalignedSnek(Cell),
    #[error("initial snek cell {0} is outside the field")]
    SnekOutOfBounds(Cell),
    #[error("initial snek occupies {0} twice")]
    OverlappingSnek(Cell),
    #[error("initial snek is broken between {0} and {1}")]
    DisjointSnek(Cell, Cell),
    #[error("initial heading {0} points back into the snek's own neck")]
    ReversedHeading(Direction),
    #[error("initial food {0} is not on the grid")]
    MisalignedFood(Cell),
    #[error("initial food {0} is outside the field")]
    FoodOutOfBounds(Cell),
    #[error("initial food {0} is on the snek")]
    FoodOnSnek(Cell),
    #[error("tick intervals must be non-zero")]
    ZeroInterval,
    #[error("minimum tick interval {min:?} is above the initial interval {initial:?}")]
    FloorAboveInitial { min: Duration, initial: Duration },
    #[error("level threshold must be at least one point")]
    ZeroThreshold,
}

/// Everything a game instance is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub field: Field,
    /// Head first
    pub initial_snek: Vec<Cell>,
    pub initial_direction: Direction,
    pub initial_food: Cell,
    pub rules: ProgressionRules,
    /// How long the audio side should wait between the crash and the game-over cue
    pub game_over_sound_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            field: Field {
                width: consts::FIELD_WIDTH,
                height: consts::FIELD_HEIGHT,
                unit: consts::UNIT,
            },
            initial_snek: consts::INITIAL_SNEK.iter().copied().map(Cell::from).collect(),
            initial_direction: Direction::Right,
            initial_food: Cell::from(consts::INITIAL_FOOD),
            rules: ProgressionRules::default(),
            game_over_sound_delay: consts::GAME_OVER_SOUND_DELAY,
        }
    }
}

impl GameConfig {
    /// Classic layout scaled onto a field of the given size: a four cell snek
    /// along the top row, food eight columns in if there is room. Fields
    /// narrower than four cells fail [`GameConfig::validate`].
    pub fn new(width: i32, height: i32, unit: i32) -> Self {
        let field = Field {
            width,
            height,
            unit,
        };
        let initial_snek = (0..consts::INITIAL_SNEK.len() as i32)
            .rev()
            .map(|column| field.cell_at(column, 0))
            .collect();
        let snek_len = consts::INITIAL_SNEK.len() as i32;
        let food_column = consts::INITIAL_FOOD.0 / consts::UNIT;
        let initial_food = if unit <= 0 {
            Cell::new(0, 0)
        } else if food_column < field.columns() {
            field.cell_at(food_column, 0)
        } else if field.rows() > 1 {
            field.cell_at(0, field.rows() - 1)
        } else {
            // Single row: right in front of the head
            field.cell_at(snek_len, 0)
        };

        GameConfig {
            field,
            initial_snek,
            initial_food,
            ..Default::default()
        }
    }

    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.rules.initial_interval = interval;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.rules.min_interval = interval;
        self
    }

    pub fn with_interval_decrement(mut self, decrement: Duration) -> Self {
        self.rules.interval_decrement = decrement;
        self
    }

    pub fn with_level_threshold(mut self, threshold: u32) -> Self {
        self.rules.level_threshold = threshold;
        self
    }

    pub fn with_snek(mut self, cells: Vec<Cell>, direction: Direction) -> Self {
        self.initial_snek = cells;
        self.initial_direction = direction;
        self
    }

    pub fn with_food(mut self, food: Cell) -> Self {
        self.initial_food = food;
        self
    }

    /// Checks every precondition the collision math and food sampling rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Field {
            width,
            height,
            unit,
        } = self.field;

        if unit <= 0 {
            return Err(ConfigError::InvalidUnit(unit));
        }
        if width < unit || height < unit {
            return Err(ConfigError::EmptyField { width, height });
        }
        if width % unit != 0 || height % unit != 0 {
            return Err(ConfigError::MisalignedField {
                width,
                height,
                unit,
            });
        }

        self.check_room()?;
        self.validate_snek()?;

        let food = self.initial_food;
        if !food.is_aligned(unit) {
            return Err(ConfigError::MisalignedFood(food));
        }
        if !self.field.contains(food) {
            return Err(ConfigError::FoodOutOfBounds(food));
        }
        if self.initial_snek.contains(&food) {
            return Err(ConfigError::FoodOnSnek(food));
        }

        self.validate_rules()
    }

    /// The starting snek has to fit on the field with a cell to spare for food.
    fn check_room(&self) -> Result<(), ConfigError> {
        let unit = self.field.unit;
        let (needed_columns, needed_rows) = self
            .initial_snek
            .iter()
            .filter(|cell| cell.x >= 0 && cell.y >= 0 && cell.is_aligned(unit))
            .fold((0, 0), |(columns, rows), cell| {
                (columns.max(cell.x / unit + 1), rows.max(cell.y / unit + 1))
            });

        let (columns, rows) = (self.field.columns(), self.field.rows());
        if needed_columns > columns || needed_rows > rows {
            return Err(ConfigError::SnekDoesNotFit {
                columns,
                rows,
                needed_columns,
                needed_rows,
            });
        }

        let cells = self.field.cell_count();
        if !self.initial_snek.is_empty() && self.initial_snek.len() >= cells {
            return Err(ConfigError::NoRoomForFood(cells));
        }
        Ok(())
    }

    fn validate_snek(&self) -> Result<(), ConfigError> {
        let unit = self.field.unit;
        let Some(&head) = self.initial_snek.first() else {
            return Err(ConfigError::EmptySnek);
        };

        let mut seen = HashSet::new();
        for &cell in &self.initial_snek {
            if !cell.is_aligned(unit) {
                return Err(ConfigError::MisalignedSnek(cell));
            }
            if !self.field.contains(cell) {
                return Err(ConfigError::SnekOutOfBounds(cell));
            }
            if !seen.insert(cell) {
                return Err(ConfigError::OverlappingSnek(cell));
            }
        }

        for pair in self.initial_snek.windows(2) {
            let distance = (pair[0].x - pair[1].x).abs() + (pair[0].y - pair[1].y).abs();
            if distance != unit {
                return Err(ConfigError::DisjointSnek(pair[0], pair[1]));
            }
        }

        if let Some(&neck) = self.initial_snek.get(1) {
            if head.stepped(self.initial_direction, unit) == neck {
                return Err(ConfigError::ReversedHeading(self.initial_direction));
            }
        }

        Ok(())
    }

    fn validate_rules(&self) -> Result<(), ConfigError> {
        let rules = &self.rules;
        if rules.initial_interval.is_zero() || rules.min_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if rules.min_interval > rules.initial_interval {
            return Err(ConfigError::FloorAboveInitial {
                min: rules.min_interval,
                initial: rules.initial_interval,
            });
        }
        if rules.level_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }
}
