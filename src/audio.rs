//! Sound effects for game events.
//!
//! The game only says what happened; this module decides what to play and
//! when. Cues tied to a delay (the game-over jingle) wait in the
//! [`SoundScheduler`] until they are due.

use std::io::{self, Write};
use std::time::Instant;

use log::{debug, warn};

use crate::engine::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    GameStart,
    Swoosh,
    Eat,
    Explode,
    GameOver,
}

impl Cue {
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::Started => Some(Cue::GameStart),
            GameEvent::Turned(_) => Some(Cue::Swoosh),
            GameEvent::Ate { .. } => Some(Cue::Eat),
            GameEvent::Collided(_) => Some(Cue::Explode),
            GameEvent::GameOver { .. } => Some(Cue::GameOver),
            GameEvent::LeveledUp { .. } => None,
        }
    }
}

/// Something that can make noise. Playback is fire and forget.
pub trait AudioSink {
    fn play(&mut self, cue: Cue) -> io::Result<()>;
}

/// Plays nothing
#[derive(Debug, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: Cue) -> io::Result<()> {
        Ok(())
    }
}

/// Rings the terminal bell. Turns are too frequent to ring for.
#[derive(Debug)]
pub struct Bell<W: Write> {
    out: W,
}

impl<W: Write> Bell<W> {
    pub fn new(out: W) -> Self {
        Bell { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for Bell<W> {
    fn play(&mut self, cue: Cue) -> io::Result<()> {
        if cue == Cue::Swoosh {
            return Ok(());
        }
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Instant,
    cue: Cue,
}

pub struct SoundScheduler {
    sink: Box<dyn AudioSink>,
    pending: Vec<Pending>,
}

impl SoundScheduler {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        SoundScheduler {
            sink,
            pending: Vec::new(),
        }
    }

    /// Plays immediate cues now and parks delayed ones.
    pub fn handle_events(&mut self, events: &[GameEvent], now: Instant) {
        for event in events {
            let Some(cue) = Cue::for_event(event) else {
                continue;
            };
            match event {
                GameEvent::GameOver { delay } => self.pending.push(Pending {
                    due: now + *delay,
                    cue,
                }),
                _ => self.play(cue),
            }
        }
    }

    /// Plays every parked cue whose time has come.
    pub fn poll(&mut self, now: Instant) {
        let (due, waiting): (Vec<Pending>, Vec<Pending>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.due <= now);
        self.pending = waiting;
        for pending in due {
            self.play(pending.cue);
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drops parked cues, e.g. when a new game replaces the old one.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }

    fn play(&mut self, cue: Cue) {
        debug!("Playing {:?}", cue);
        if let Err(e) = self.sink.play(cue) {
            warn!("Could not play {:?}: {}", cue, e);
        }
    }
}
