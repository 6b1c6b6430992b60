pub mod mood;
pub mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mood::{process_mood_command, MoodCommand};
use run::{process_run_command, RunCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    config::CompanionConfig,
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, LOG_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "codepal", version, long_about = None)]
#[command(about = "A terminal companion that gets sad when you stop coding", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        help = "Application directory for logs. By default $XDG_STATE_HOME/codepal or $HOME/.local/state/codepal"
    )]
    dir: Option<PathBuf>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console", help = "Mirror logs to stderr")]
    log_console: bool,
    #[arg(long = "log-filter", help = "Log level. Falls back to RUST_LOG, then debug")]
    log: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Run the companion in this terminal until Ctrl-C")]
    Run {
        #[command(flatten)]
        command: RunCommand,
    },
    #[command(about = "Evaluate the mood once for the given score, idle time and processes")]
    Mood {
        #[command(flatten)]
        command: MoodCommand,
    },
    #[command(about = "Print the default configuration as JSON")]
    Config {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    enable_logging(LOG_PREFIX, &app_dir, args.log, args.log_console)?;

    match args.commands {
        Commands::Run { command } => process_run_command(command).await,
        Commands::Mood { command } => process_mood_command(command),
        Commands::Config {} => {
            println!(
                "{}",
                serde_json::to_string_pretty(&CompanionConfig::default())?
            );
            Ok(())
        }
    }
}
