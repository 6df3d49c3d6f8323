use std::collections::VecDeque;
use std::time::Duration;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, GameConfig};
use crate::grid::{Cell, Direction, Field};
use crate::input::{InputSource, START_KEY};
use crate::progression::Progression;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    Started,
    Over,
}

/// What the snek ran into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Itself,
}

/// Things the outside world may want to react to, in the order they happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Turned(Direction),
    Ate { cell: Cell, score: u32 },
    LeveledUp { level: u32, tick_interval: Duration },
    Collided(Collision),
    /// The game-over cue, to be played `delay` after the collision
    GameOver { delay: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Idle,                 // Not running, nothing moved
    Ongoing,              // Normal movement
    Nommed,               // Ate food and grew
    Collision(Collision), // Game over
}

/// Head at the front, tail at the back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snek {
    body: VecDeque<Cell>,
    direction: Direction,
}

impl Snek {
    /// Head first. `None` if there are no cells.
    pub fn new(cells: impl IntoIterator<Item = Cell>, direction: Direction) -> Option<Self> {
        let body: VecDeque<Cell> = cells.into_iter().collect();
        if body.is_empty() {
            return None;
        }
        Some(Snek { body, direction })
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn cells(&self) -> &VecDeque<Cell> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Adopts `direction` unless it would reverse into the neck. Returns `true`
    /// if the heading changed.
    fn change_direction(&mut self, direction: Direction) -> bool {
        if direction == self.direction || direction.is_opposite(self.direction) {
            return false;
        }
        self.direction = direction;
        true
    }

    fn slither(&mut self, new_head: Cell, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }
}

/// Read-only view handed to renderers once per frame.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub field: Field,
    pub snek: &'a VecDeque<Cell>,
    pub food: Cell,
    pub direction: Direction,
    pub state: GameState,
    pub score: u32,
    pub level: u32,
    pub tick_interval: Duration,
}

/// One game instance. A finished game is thrown away, never reset.
pub struct Game<I> {
    field: Field,
    snek: Snek,
    food: Cell,
    state: GameState,
    progression: Progression,
    game_over_sound_delay: Duration,
    input: I,
    rng: StdRng,
    events: Vec<GameEvent>,
}

impl<I: InputSource> Game<I> {
    pub fn new(config: &GameConfig, input: I) -> Result<Self, ConfigError> {
        Self::with_rng(config, input, StdRng::from_entropy())
    }

    /// Same as [`Game::new`] with reproducible food placement
    pub fn with_seed(config: &GameConfig, input: I, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, input, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, input: I, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let snek = Snek::new(config.initial_snek.iter().copied(), config.initial_direction)
            .ok_or(ConfigError::EmptySnek)?;

        Ok(Game {
            field: config.field,
            snek,
            food: config.initial_food,
            state: GameState::NotStarted,
            progression: Progression::new(config.rules),
            game_over_sound_delay: config.game_over_sound_delay,
            input,
            rng,
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn snek(&self) -> &Snek {
        &self.snek
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn tick_interval(&self) -> Duration {
        self.progression.tick_interval()
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            field: self.field,
            snek: self.snek.cells(),
            food: self.food,
            direction: self.snek.direction(),
            state: self.state,
            score: self.progression.score(),
            level: self.progression.level(),
            tick_interval: self.progression.tick_interval(),
        }
    }

    /// Hands over everything emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Starts the game if the start key is down and it hasn't started yet.
    /// Input queued before the start is thrown away.
    pub fn check_start(&mut self) -> bool {
        if self.state != GameState::NotStarted || !self.input.is_pressed(START_KEY) {
            return false;
        }

        info!("Game started");
        self.state = GameState::Started;
        self.input.clear_queue();
        self.events.push(GameEvent::Started);
        true
    }

    /// Advances the snek by one cell.
    pub fn tick(&mut self) -> StepResult {
        if self.state != GameState::Started {
            return StepResult::Idle;
        }

        if let Some(direction) = self.input.dequeue_next_direction() {
            if self.snek.change_direction(direction) {
                self.events.push(GameEvent::Turned(direction));
            }
        }

        let new_head = self.snek.head().stepped(self.snek.direction(), self.field.unit);

        if let Some(collision) = self.check_collision(new_head) {
            info!(
                "Collision ({:?}) at {} with score {}",
                collision,
                new_head,
                self.progression.score()
            );
            self.state = GameState::Over;
            self.events.push(GameEvent::Collided(collision));
            self.events.push(GameEvent::GameOver {
                delay: self.game_over_sound_delay,
            });
            return StepResult::Collision(collision);
        }

        let nommed = new_head == self.food;
        self.snek.slither(new_head, nommed);

        if !nommed {
            return StepResult::Ongoing;
        }

        let level_up = self.progression.record_food();
        self.events.push(GameEvent::Ate {
            cell: new_head,
            score: self.progression.score(),
        });
        if let Some(level_up) = level_up {
            info!(
                "Level {} reached, ticking every {:?}",
                level_up.level, level_up.tick_interval
            );
            self.events.push(GameEvent::LeveledUp {
                level: level_up.level,
                tick_interval: level_up.tick_interval,
            });
        }
        self.respawn_food();

        StepResult::Nommed
    }

    fn check_collision(&self, cell: Cell) -> Option<Collision> {
        if !self.field.contains(cell) {
            return Some(Collision::Wall);
        }
        if self.snek.occupies(cell) {
            return Some(Collision::Itself);
        }
        None
    }

    fn respawn_food(&mut self) {
        match random_free_cell(&mut self.rng, self.field, &self.snek) {
            Some(cell) => self.food = cell,
            None => warn!("Snek fills the whole field, no room left for food"),
        }
    }
}

/// Rejection-samples grid cells until one is off the snek. `None` only when
/// the snek covers every cell.
fn random_free_cell(rng: &mut impl Rng, field: Field, snek: &Snek) -> Option<Cell> {
    if snek.len() >= field.cell_count() {
        return None;
    }

    loop {
        let cell = field.cell_at(
            rng.gen_range(0..field.columns()),
            rng.gen_range(0..field.rows()),
        );

        if !snek.occupies(cell) {
            return Some(cell);
        }
    }
}
