use std::sync::Arc;

use crate::{config::MoodConfig, utils::clock::Clock};

use super::{activity::ActivityClock, engine::MoodEngine};

/// State shared between the activity listeners and the scheduler. Listeners only write the
/// activity clock, the scheduler reads it and owns every score update.
pub struct CompanionState {
    activity: ActivityClock,
    mood: MoodEngine,
}

impl CompanionState {
    pub fn new(mood: &MoodConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            activity: ActivityClock::new(clock),
            mood: MoodEngine::new(mood),
        }
    }

    pub fn activity(&self) -> &ActivityClock {
        &self.activity
    }

    pub fn mood(&self) -> &MoodEngine {
        &self.mood
    }
}
