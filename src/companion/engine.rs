use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tracing::trace;

use crate::{config::MoodConfig, utils::happiness::Happiness};

/// Owns the happiness score. Recent activity is rewarded right away, inactivity is punished
/// gradually and the punishment per update is capped.
///
/// The score is kept as `f64` bits in an atomic, so readers never wait for an update.
pub struct MoodEngine {
    score: AtomicU64,
    reward: f64,
    activity_window: Duration,
    decay_cap: f64,
    decay_unit: Duration,
}

impl MoodEngine {
    pub fn new(config: &MoodConfig) -> Self {
        Self {
            score: AtomicU64::new(Happiness::clamped(config.initial).value().to_bits()),
            reward: config.reward,
            activity_window: config.activity_window,
            decay_cap: config.decay_cap,
            decay_unit: config.decay_unit,
        }
    }

    pub fn score(&self) -> Happiness {
        Happiness::clamped(f64::from_bits(self.score.load(Ordering::Acquire)))
    }

    /// Applies one tick worth of reward or decay and returns the new score.
    pub fn update(&self, idle: Duration) -> Happiness {
        let change = self.change_for(idle);
        let apply = |bits: u64| Happiness::clamped(f64::from_bits(bits) + change);

        let previous = self
            .score
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some(apply(bits).value().to_bits())
            })
            .unwrap_or_else(|bits| bits);
        let score = apply(previous);
        trace!("Score moved by {change:.3} to {}", *score);
        score
    }

    fn change_for(&self, idle: Duration) -> f64 {
        if idle < self.activity_window {
            self.reward
        } else {
            let decay = idle.as_secs_f64() / self.decay_unit.as_secs_f64();
            -decay.min(self.decay_cap)
        }
    }
}
