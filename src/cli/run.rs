use std::{io::IsTerminal, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Args;

use crate::{
    companion::start_companion,
    config::{CompanionConfig, TerminalLines},
};

#[derive(Args, Debug)]
pub struct RunCommand {
    #[arg(long, help = "JSON configuration file. Built-in defaults are used when absent")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Seed for picking messages, for reproducible runs")]
    pub seed: Option<u64>,
    #[arg(long = "tick", help = "Seconds between mood updates")]
    pub tick_seconds: Option<f64>,
    #[arg(long, help = "Directory with happy.txt, neutral.txt, sad.txt and very_sad.txt")]
    pub portraits: Option<PathBuf>,
    #[arg(
        long = "terminal-activity",
        help = "Count lines typed into this terminal as activity, even when the OS reports idle time"
    )]
    pub terminal_activity: bool,
    #[arg(
        long = "no-terminal-activity",
        conflicts_with = "terminal_activity",
        help = "Never read activity from this terminal"
    )]
    pub no_terminal_activity: bool,
    #[arg(long = "no-idle", help = "Don't read idle time from the OS")]
    pub no_idle: bool,
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl RunCommand {
    /// Loads the configuration and applies the command line overrides on top of it.
    pub fn resolve_config(&self) -> Result<CompanionConfig> {
        let mut config = match &self.config {
            Some(path) => CompanionConfig::load(path)?,
            None => CompanionConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(tick) = self.tick_seconds {
            config.tick_interval = Duration::try_from_secs_f64(tick)
                .with_context(|| format!("Invalid tick interval {tick}"))?;
        }
        if let Some(portraits) = &self.portraits {
            config.portraits_dir = portraits.clone();
        }
        if self.terminal_activity {
            config.activity.terminal_lines = TerminalLines::Always;
        }
        if self.no_terminal_activity {
            config.activity.terminal_lines = TerminalLines::Never;
        }
        if self.no_idle {
            config.activity.os_idle = false;
        }

        config.validate()?;
        Ok(config)
    }
}

pub async fn process_run_command(command: RunCommand) -> Result<()> {
    let config = command.resolve_config()?;
    let colors = !command.no_color && std::io::stdout().is_terminal();
    start_companion(config, colors).await
}
