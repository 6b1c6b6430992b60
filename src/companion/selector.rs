use std::{fmt::Display, time::Duration};

use rand::{seq::SliceRandom, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    config::{StatusConfig, Trigger},
    processes::ProcessNameSet,
    utils::happiness::Happiness,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodBucket {
    Happy,
    Neutral,
    Sad,
    VerySad,
}

impl MoodBucket {
    pub const ALL: [MoodBucket; 4] = [
        MoodBucket::Happy,
        MoodBucket::Neutral,
        MoodBucket::Sad,
        MoodBucket::VerySad,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MoodBucket::Happy => "happy",
            MoodBucket::Neutral => "neutral",
            MoodBucket::Sad => "sad",
            MoodBucket::VerySad => "very_sad",
        }
    }
}

impl Display for MoodBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Turns happiness, inactivity and running processes into a bucket and a status message.
///
/// Inside a bucket the configured rules are checked in order and the first one that fires
/// provides the message. When none fires a default message is picked with the injected random
/// source, so two selectors created with the same seed produce the same sequence.
pub struct StatusSelector {
    config: StatusConfig,
    rng: Pcg64Mcg,
}

impl StatusSelector {
    pub fn new(config: StatusConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64Mcg::seed_from_u64(seed),
            None => Pcg64Mcg::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn bucket_for(&self, score: Happiness) -> MoodBucket {
        let thresholds = &self.config.thresholds;
        if *score > thresholds.happy {
            MoodBucket::Happy
        } else if *score > thresholds.neutral {
            MoodBucket::Neutral
        } else if *score > thresholds.sad {
            MoodBucket::Sad
        } else {
            MoodBucket::VerySad
        }
    }

    pub fn select(
        &mut self,
        score: Happiness,
        idle: Duration,
        processes: &ProcessNameSet,
    ) -> (MoodBucket, String) {
        let bucket = self.bucket_for(score);
        let bucket_config = self.config.bucket(bucket);

        let fired = bucket_config
            .rules
            .iter()
            .find(|rule| self.fires(&rule.when, idle, processes));
        if let Some(rule) = fired {
            trace!("Rule {:?} fired for {bucket}", rule.when);
            return (bucket, rule.message.clone());
        }

        // Validated configs never have an empty pool.
        let message = bucket_config
            .defaults
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        (bucket, message)
    }

    fn fires(&self, trigger: &Trigger, idle: Duration, processes: &ProcessNameSet) -> bool {
        match trigger {
            Trigger::RunningAny(names) => {
                processes.contains_any(names, self.config.process_matching)
            }
            Trigger::IdleLongerThan { idle: threshold } => idle > *threshold,
        }
    }
}
