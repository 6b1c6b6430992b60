use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Args;

use crate::{
    companion::selector::{MoodBucket, StatusSelector},
    config::CompanionConfig,
    processes::ProcessNameSet,
    utils::happiness::Happiness,
};

#[derive(Args, Debug)]
pub struct MoodCommand {
    #[arg(long, help = "Happiness between 0 and 100, for example 42 or 42%")]
    pub score: Happiness,
    #[arg(long, default_value_t = 0, help = "Seconds since the last input")]
    pub idle: u64,
    #[arg(
        long = "process",
        help = "Name of a running process. Can be repeated, for example --process chrome.exe"
    )]
    pub processes: Vec<String>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, help = "JSON configuration file. Built-in defaults are used when absent")]
    pub config: Option<PathBuf>,
}

impl MoodCommand {
    pub fn evaluate(&self) -> Result<(MoodBucket, String)> {
        let config = match &self.config {
            Some(path) => CompanionConfig::load(path)?,
            None => CompanionConfig::default(),
        };
        let mut selector = StatusSelector::new(config.status, self.seed.or(config.seed));
        let processes = self.processes.iter().cloned().collect::<ProcessNameSet>();
        Ok(selector.select(self.score, Duration::from_secs(self.idle), &processes))
    }
}

pub fn process_mood_command(command: MoodCommand) -> Result<()> {
    let (bucket, status) = command.evaluate()?;
    println!("{bucket} ({}): {status}", command.score);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::MoodCommand;
    use crate::companion::selector::MoodBucket;

    fn command(score: f64, idle: u64, processes: &[&str]) -> MoodCommand {
        MoodCommand {
            score: score.to_string().parse().unwrap(),
            idle,
            processes: processes.iter().map(|v| v.to_string()).collect(),
            seed: Some(1),
            config: None,
        }
    }

    #[test]
    fn evaluates_like_the_running_companion() {
        let (bucket, status) = command(90., 10, &["chrome.exe"]).evaluate().unwrap();
        assert_eq!(bucket, MoodBucket::Happy);
        assert_eq!(status, "I love when you research coding topics!");

        let (bucket, status) = command(10., 2000, &[]).evaluate().unwrap();
        assert_eq!(bucket, MoodBucket::VerySad);
        assert_eq!(status, "I think you've forgotten about me completely...");
    }

    #[test]
    fn seeded_evaluation_is_repeatable() {
        let first = command(60., 3, &[]).evaluate().unwrap();
        let second = command(60., 3, &[]).evaluate().unwrap();
        assert_eq!(first, second);
    }
}
