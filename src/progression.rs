use std::time::Duration;

use crate::consts;

/// Knobs for how score turns into levels and speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionRules {
    pub initial_interval: Duration,
    pub interval_decrement: Duration,
    pub min_interval: Duration,
    /// Points needed per level
    pub level_threshold: u32,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        ProgressionRules {
            initial_interval: consts::INITIAL_SPEED,
            interval_decrement: consts::SPEED_DECREASE,
            min_interval: consts::MIN_SPEED,
            level_threshold: consts::SCORE_THRESHOLD,
        }
    }
}

/// Level reached for a given score
pub fn level_for_score(score: u32, rules: &ProgressionRules) -> u32 {
    consts::INITIAL_LEVEL + score / rules.level_threshold.max(1)
}

/// Tick interval at a given level, clamped to the floor
pub fn interval_for_level(level: u32, rules: &ProgressionRules) -> Duration {
    let steps = level.saturating_sub(consts::INITIAL_LEVEL);
    rules
        .initial_interval
        .saturating_sub(rules.interval_decrement.saturating_mul(steps))
        .max(rules.min_interval)
}

/// Emitted when a meal pushes the score over a level boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub level: u32,
    pub tick_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    rules: ProgressionRules,
    score: u32,
    level: u32,
    tick_interval: Duration,
}

impl Progression {
    pub fn new(rules: ProgressionRules) -> Self {
        Progression {
            rules,
            score: consts::INITIAL_SCORE,
            level: consts::INITIAL_LEVEL,
            tick_interval: rules.initial_interval,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn rules(&self) -> &ProgressionRules {
        &self.rules
    }

    /// One point per food. Every `level_threshold` points the level goes up and
    /// ticks come faster, but never faster than the floor.
    pub fn record_food(&mut self) -> Option<LevelUp> {
        self.score += 1;
        if self.score % self.rules.level_threshold.max(1) != 0 {
            return None;
        }

        self.level += 1;
        self.tick_interval = self
            .tick_interval
            .saturating_sub(self.rules.interval_decrement)
            .max(self.rules.min_interval);

        Some(LevelUp {
            level: self.level,
            tick_interval: self.tick_interval,
        })
    }
}
