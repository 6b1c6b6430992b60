//! Static configuration of the companion. Everything that is data rather than logic lives here:
//! tick interval, score dynamics, bucket thresholds, recognized process names and the messages.
//! It is loaded once at startup and never changes afterwards.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::companion::selector::MoodBucket;

/// Upper bound for the tick and poll intervals. Deadlines are computed by adding the interval
/// to a monotonic instant, which has to stay representable.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    #[serde(with = "duration_ser")]
    pub tick_interval: Duration,
    /// Fixed seed for message selection. Picked from entropy when absent.
    pub seed: Option<u64>,
    pub portraits_dir: PathBuf,
    pub activity: ActivityConfig,
    pub mood: MoodConfig,
    pub status: StatusConfig,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            seed: None,
            portraits_dir: PathBuf::from("assets/portraits"),
            activity: ActivityConfig::default(),
            mood: MoodConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

impl CompanionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: CompanionConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() || self.tick_interval > MAX_INTERVAL {
            bail!(
                "tick_interval must be positive and at most {}s",
                MAX_INTERVAL.as_secs()
            );
        }
        if self.activity.poll_interval.is_zero() || self.activity.poll_interval > MAX_INTERVAL {
            bail!(
                "activity.poll_interval must be positive and at most {}s",
                MAX_INTERVAL.as_secs()
            );
        }
        self.mood.validate()?;
        self.status.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Watch the idle time reported by the OS. Requires the `x11` or `win` feature.
    pub os_idle: bool,
    pub terminal_lines: TerminalLines,
    #[serde(with = "duration_ser")]
    pub poll_interval: Duration,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            os_idle: true,
            terminal_lines: TerminalLines::default(),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Whether lines typed into the companion's own terminal count as activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalLines {
    Always,
    /// Only when no OS idle source could be opened.
    #[default]
    Fallback,
    Never,
}

impl TerminalLines {
    pub fn enabled(self, os_idle_available: bool) -> bool {
        match self {
            TerminalLines::Always => true,
            TerminalLines::Fallback => !os_idle_available,
            TerminalLines::Never => false,
        }
    }
}

/// Score dynamics. Activity within `activity_window` adds `reward`, otherwise the score loses
/// one point per `decay_unit` of inactivity, but never more than `decay_cap` per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodConfig {
    pub initial: f64,
    pub reward: f64,
    #[serde(with = "duration_ser")]
    pub activity_window: Duration,
    pub decay_cap: f64,
    #[serde(with = "duration_ser")]
    pub decay_unit: Duration,
}

impl Default for MoodConfig {
    fn default() -> Self {
        Self {
            initial: 80.,
            reward: 1.,
            activity_window: Duration::from_secs(1),
            decay_cap: 2.,
            decay_unit: Duration::from_secs(60),
        }
    }
}

impl MoodConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.initial) {
            bail!("mood.initial must be between 0 and 100, got {}", self.initial);
        }
        if self.reward.is_nan() || self.reward < 0. {
            bail!("mood.reward must not be negative, got {}", self.reward);
        }
        if self.decay_cap.is_nan() || self.decay_cap < 0. {
            bail!("mood.decay_cap must not be negative, got {}", self.decay_cap);
        }
        if self.decay_unit.is_zero() {
            bail!("mood.decay_unit must be positive");
        }
        Ok(())
    }
}

/// Lower bounds (exclusive) of the buckets. Anything not above `sad` is very sad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub happy: f64,
    pub neutral: f64,
    pub sad: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            happy: 75.,
            neutral: 50.,
            sad: 25.,
        }
    }
}

/// How names from [ProcessNameSet](crate::processes::ProcessNameSet) are compared with the
/// configured ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessMatching {
    /// Byte for byte.
    Exact,
    /// Case insensitive, ignoring the directory and a trailing `.exe`.
    #[default]
    Normalized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    RunningAny(Vec<String>),
    IdleLongerThan {
        #[serde(with = "duration_ser")]
        idle: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRule {
    pub when: Trigger,
    pub message: String,
}

impl StatusRule {
    fn running(processes: &[&str], message: &str) -> Self {
        Self {
            when: Trigger::RunningAny(processes.iter().map(|v| v.to_string()).collect()),
            message: message.into(),
        }
    }

    fn idle(seconds: u64, message: &str) -> Self {
        Self {
            when: Trigger::IdleLongerThan {
                idle: Duration::from_secs(seconds),
            },
            message: message.into(),
        }
    }
}

/// Rules of a single bucket. Rules are tried in order and the first one that fires wins,
/// otherwise one of `defaults` is picked at random.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    pub rules: Vec<StatusRule>,
    pub defaults: Vec<String>,
}

impl BucketConfig {
    fn new(rules: Vec<StatusRule>, defaults: &[&str]) -> Self {
        Self {
            rules,
            defaults: defaults.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub thresholds: Thresholds,
    pub process_matching: ProcessMatching,
    pub happy: BucketConfig,
    pub neutral: BucketConfig,
    pub sad: BucketConfig,
    pub very_sad: BucketConfig,
}

impl StatusConfig {
    pub fn bucket(&self, bucket: MoodBucket) -> &BucketConfig {
        match bucket {
            MoodBucket::Happy => &self.happy,
            MoodBucket::Neutral => &self.neutral,
            MoodBucket::Sad => &self.sad,
            MoodBucket::VerySad => &self.very_sad,
        }
    }

    fn validate(&self) -> Result<()> {
        let Thresholds { happy, neutral, sad } = self.thresholds;
        let descending = 100. >= happy && happy > neutral && neutral > sad && sad >= 0.;
        if !descending {
            bail!(
                "Thresholds must be strictly descending within [0, 100], got {happy}, {neutral}, {sad}"
            );
        }
        for bucket in MoodBucket::ALL {
            let config = self.bucket(bucket);
            if config.defaults.is_empty() {
                bail!("Bucket {bucket} needs at least one default message");
            }
            for rule in &config.rules {
                if let Trigger::RunningAny(names) = &rule.when {
                    if names.is_empty() {
                        bail!("Bucket {bucket} has a process rule without process names");
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            process_matching: ProcessMatching::default(),
            happy: BucketConfig::new(
                vec![
                    StatusRule::running(&["chrome"], "I love when you research coding topics!"),
                    StatusRule::running(
                        &["python", "python3"],
                        "Watching you code is so exciting!",
                    ),
                ],
                &[
                    "You're the best human ever!",
                    "I'm so happy to be your coding buddy!",
                    "This is the best day ever!",
                ],
            ),
            neutral: BucketConfig::new(
                vec![
                    StatusRule::idle(
                        300,
                        "I'm getting bored... maybe we could code something?",
                    ),
                    StatusRule::running(
                        &["discord", "slack"],
                        "Are you talking about coding in there?",
                    ),
                ],
                &[
                    "I'm content, but could use more attention",
                    "What are we working on next?",
                    "I'm here when you need me",
                ],
            ),
            sad: BucketConfig::new(
                vec![
                    StatusRule::running(
                        &["steam", "dota2", "csgo"],
                        "Playing games instead of coding with me? :(",
                    ),
                    StatusRule::idle(
                        600,
                        "I'm feeling lonely... haven't seen you code in a while",
                    ),
                ],
                &[
                    "I could really use some coding time...",
                    "Are you mad at me?",
                    "I'm not feeling great today...",
                ],
            ),
            very_sad: BucketConfig::new(
                vec![
                    StatusRule::idle(1800, "I think you've forgotten about me completely..."),
                    StatusRule::running(
                        &["netflix", "spotify"],
                        "Entertainment is more fun than coding with me?",
                    ),
                ],
                &[
                    "I'm so sad I can barely function...",
                    "Please code with me, I'm miserable...",
                    "*whimper* I need attention...",
                ],
            ),
        }
    }
}

/// Durations are stored as (possibly fractional) seconds.
mod duration_ser {
    use std::time::Duration;

    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(s).map_err(D::Error::custom)
    }
}
