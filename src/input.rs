use std::collections::{HashSet, VecDeque};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::debug;

use crate::consts::DIRECTION_QUEUE_CAPACITY;
use crate::grid::Direction;

/// Key that starts a fresh game
pub const START_KEY: KeyCode = KeyCode::Char(' ');

/// What the game needs from a keyboard.
pub trait InputSource {
    fn is_pressed(&self, key: KeyCode) -> bool;

    /// Pops the oldest pending direction
    fn dequeue_next_direction(&mut self) -> Option<Direction>;

    fn peek_next_direction(&self) -> Option<Direction>;

    /// Drops every pending direction
    fn clear_queue(&mut self);
}

/// Arrow keys plus the WASD aliases
pub fn direction_for_key(key: KeyCode) -> Option<Direction> {
    match normalize(key) {
        KeyCode::Up | KeyCode::Char('w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(Direction::Right),
        _ => None,
    }
}

fn normalize(key: KeyCode) -> KeyCode {
    match key {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Bounded FIFO of turn requests. Once full, new requests are dropped and the
/// queued ones keep their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionQueue {
    pending: VecDeque<Direction>,
}

impl DirectionQueue {
    pub fn new() -> Self {
        DirectionQueue {
            pending: VecDeque::with_capacity(DIRECTION_QUEUE_CAPACITY),
        }
    }

    /// Returns `false` if the request was dropped
    pub fn push(&mut self, direction: Direction) -> bool {
        if self.pending.len() >= DIRECTION_QUEUE_CAPACITY {
            return false;
        }
        self.pending.push_back(direction);
        true
    }

    pub fn pop(&mut self) -> Option<Direction> {
        self.pending.pop_front()
    }

    pub fn peek(&self) -> Option<Direction> {
        self.pending.front().copied()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Keyboard state fed from terminal key events.
#[derive(Debug, Default)]
pub struct InputBuffer {
    pressed: HashSet<KeyCode>,
    queue: DirectionQueue,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => self.press(key.code),
            KeyEventKind::Release => self.release(key.code),
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(normalize(key));

        if let Some(direction) = direction_for_key(key) {
            if !self.queue.push(direction) {
                debug!("Direction queue full, dropping {}", direction);
            }
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        self.pressed.remove(&normalize(key));
    }

    /// For terminals that never report key releases: every press only lasts
    /// until the end of the frame.
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for InputBuffer {
    fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&normalize(key))
    }

    fn dequeue_next_direction(&mut self) -> Option<Direction> {
        self.queue.pop()
    }

    fn peek_next_direction(&self) -> Option<Direction> {
        self.queue.peek()
    }

    fn clear_queue(&mut self) {
        self.queue.clear();
    }
}
