use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::time::Instant;

use crate::utils::clock::Clock;

/// Remembers when the user was last active.
///
/// The timestamp is stored as nanoseconds since the clock was created and only ever moves
/// forward, so concurrent registrations can't overwrite a newer one with an older one.
/// Creating the clock counts as activity.
pub struct ActivityClock {
    origin: Instant,
    last_activity: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl ActivityClock {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            origin: clock.instant(),
            last_activity: AtomicU64::new(0),
            clock,
        }
    }

    pub fn register(&self) {
        self.register_at(self.clock.instant());
    }

    /// Records activity that happened at `at`, which may lie in the past. Activity from before
    /// the clock was created is ignored.
    pub fn register_at(&self, at: Instant) {
        let offset = at.saturating_duration_since(self.origin).as_nanos();
        let offset = u64::try_from(offset).unwrap_or(u64::MAX);
        self.last_activity.fetch_max(offset, Ordering::AcqRel);
    }

    pub fn last_activity(&self) -> Instant {
        self.origin + Duration::from_nanos(self.last_activity.load(Ordering::Acquire))
    }

    /// Time since the last activity. Zero if the activity was registered ahead of the clock.
    pub fn elapsed(&self) -> Duration {
        self.clock
            .instant()
            .saturating_duration_since(self.last_activity())
    }
}
