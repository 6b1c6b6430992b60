use std::sync::Arc;

use anyhow::Result;
use listener::{IdleWatcher, LineActivityWatcher};
use scheduler::Scheduler;
use selector::StatusSelector;
use state::CompanionState;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    config::CompanionConfig,
    display::{portraits::PortraitSet, DisplaySink, TerminalDisplay},
    idle_api::{GenericIdleProbe, IdleProbe},
    processes::{ProcessObserver, SysinfoProcessObserver},
    utils::clock::{Clock, SystemClock},
};

pub mod activity;
pub mod engine;
pub mod listener;
pub mod scheduler;
pub mod selector;
pub mod shutdown;
pub mod state;

/// Represents the starting point for the companion. Runs until Ctrl-C.
pub async fn start_companion(config: CompanionConfig, colors: bool) -> Result<()> {
    let shutdown_token = CancellationToken::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = Arc::new(CompanionState::new(&config.mood, clock.clone()));

    let idle_watcher = if config.activity.os_idle {
        create_idle_watcher(&config, &state, &shutdown_token, clock.clone())
    } else {
        None
    };
    let line_watcher = watch_terminal_lines(&config, idle_watcher.is_some()).then(|| {
        LineActivityWatcher::new(
            BufReader::new(tokio::io::stdin()),
            state.clone(),
            shutdown_token.clone(),
        )
    });

    let display = TerminalDisplay::new(
        std::io::stdout(),
        PortraitSet::load(&config.portraits_dir),
        colors,
    );
    let scheduler = create_scheduler(
        &config,
        state,
        SysinfoProcessObserver::new(),
        display,
        &shutdown_token,
        clock,
    );

    info!("Companion started");
    let (_, scheduler_result, idle_result, line_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        scheduler.run(),
        async {
            match idle_watcher {
                Some(watcher) => watcher.run().await,
                None => Ok(()),
            }
        },
        async {
            match line_watcher {
                Some(watcher) => watcher.run().await,
                None => Ok(()),
            }
        },
    );

    if let Err(e) = idle_result {
        error!("Idle watcher got an error {e:?}");
    }

    if let Err(e) = line_result {
        error!("Terminal watcher got an error {e:?}");
    }

    scheduler_result
}

/// Decides whether the terminal is read for activity. Logs when no source is left at all.
fn watch_terminal_lines(config: &CompanionConfig, os_idle_available: bool) -> bool {
    let enabled = config.activity.terminal_lines.enabled(os_idle_available);
    if enabled && !os_idle_available {
        info!("Reading activity from terminal lines, press Enter while coding");
    } else if !os_idle_available {
        warn!("No activity source is available, happiness will only decay");
    }
    enabled
}

/// Failing to open the platform idle source only disables that source.
fn create_idle_watcher(
    config: &CompanionConfig,
    state: &Arc<CompanionState>,
    shutdown_token: &CancellationToken,
    clock: Arc<dyn Clock>,
) -> Option<IdleWatcher<GenericIdleProbe>> {
    match GenericIdleProbe::new() {
        Ok(probe) => Some(create_watcher(probe, config, state, shutdown_token, clock)),
        Err(e) => {
            warn!("OS idle time is unavailable {e:?}");
            None
        }
    }
}

fn create_watcher<P: IdleProbe>(
    probe: P,
    config: &CompanionConfig,
    state: &Arc<CompanionState>,
    shutdown_token: &CancellationToken,
    clock: Arc<dyn Clock>,
) -> IdleWatcher<P> {
    IdleWatcher::new(
        probe,
        state.clone(),
        shutdown_token.clone(),
        config.activity.poll_interval,
        clock,
    )
}

fn create_scheduler(
    config: &CompanionConfig,
    state: Arc<CompanionState>,
    observer: impl ProcessObserver + 'static,
    display: impl DisplaySink + 'static,
    shutdown_token: &CancellationToken,
    clock: Arc<dyn Clock>,
) -> Scheduler {
    Scheduler::new(
        state,
        StatusSelector::new(config.status.clone(), config.seed),
        Box::new(observer),
        Box::new(display),
        shutdown_token.clone(),
        config.tick_interval,
        clock,
    )
}
