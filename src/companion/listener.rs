//! Sources of activity events. Each watcher runs until the shutdown token is cancelled and only
//! ever touches the [ActivityClock](super::activity::ActivityClock).

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{idle_api::IdleProbe, utils::clock::Clock};

use super::state::CompanionState;

/// Polls the OS idle time and turns it into activity timestamps.
pub struct IdleWatcher<P: IdleProbe> {
    probe: P,
    state: Arc<CompanionState>,
    shutdown: CancellationToken,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl<P: IdleProbe> IdleWatcher<P> {
    pub fn new(
        probe: P,
        state: Arc<CompanionState>,
        shutdown: CancellationToken,
        poll_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            probe,
            state,
            shutdown,
            poll_interval,
            clock,
        }
    }

    fn poll(&mut self) -> Result<()> {
        let idle = self.probe.idle_time()?;
        let now = self.clock.instant();
        // Input older than the monotonic clock itself can't be represented and can't be
        // recent either.
        if let Some(input_at) = now.checked_sub(idle) {
            self.state.activity().register_at(input_at);
        }
        Ok(())
    }

    pub async fn run(mut self) -> Result<()> {
        let mut poll_point = self.clock.instant();
        loop {
            poll_point += self.poll_interval;

            if let Err(e) = self.poll() {
                error!("Failed to poll idle time {e:?}");
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.clock.sleep_until(poll_point) => ()
            }
        }
    }
}

/// Treats every line read from `input` as a keystroke burst. Used with the companion's own
/// terminal when the OS can't report idle time.
///
/// Lines are read as raw bytes, their content (and encoding) doesn't matter.
pub struct LineActivityWatcher<R> {
    input: R,
    // Survives cancelled reads, `read_until` appends partial lines here.
    line: Vec<u8>,
    state: Arc<CompanionState>,
    shutdown: CancellationToken,
}

impl<R: AsyncBufRead + Unpin> LineActivityWatcher<R> {
    pub fn new(input: R, state: Arc<CompanionState>, shutdown: CancellationToken) -> Self {
        Self {
            input,
            line: Vec::new(),
            state,
            shutdown,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                read = self.input.read_until(b'\n', &mut self.line) => match read {
                    Ok(0) => {
                        info!("Terminal input closed, no more activity will be read from it");
                        return Ok(())
                    }
                    Ok(_) => {
                        debug!("Registered terminal input");
                        self.state.activity().register();
                        self.line.clear();
                    }
                    Err(e) => {
                        error!("Failed to read terminal input {e:?}");
                        return Err(e.into())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use anyhow::{anyhow, Result};
    use tokio::io::{AsyncWriteExt, BufReader};
    use tokio_util::sync::CancellationToken;

    use super::{IdleWatcher, LineActivityWatcher};
    use crate::{
        companion::state::CompanionState,
        config::MoodConfig,
        idle_api::MockIdleProbe,
        utils::{clock::SystemClock, logging::TEST_LOGGING},
    };

    fn state() -> Arc<CompanionState> {
        Arc::new(CompanionState::new(
            &MoodConfig::default(),
            Arc::new(SystemClock),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn idle_watcher_backdates_activity() -> Result<()> {
        *TEST_LOGGING;
        let state = state();
        let shutdown = CancellationToken::new();

        let mut probe = MockIdleProbe::new();
        let mut answers = vec![
            Ok(Duration::from_secs(3)),
            Err(anyhow!("display went away")),
            Ok(Duration::from_millis(200)),
        ]
        .into_iter();
        probe
            .expect_idle_time()
            .returning(move || answers.next().unwrap_or(Ok(Duration::from_secs(3600))));

        tokio::time::advance(Duration::from_secs(10)).await;
        let watcher = IdleWatcher::new(
            probe,
            state.clone(),
            shutdown.clone(),
            Duration::from_secs(1),
            Arc::new(SystemClock),
        );

        let observed = state.clone();
        let (result, _) = tokio::join!(watcher.run(), async move {
            // First poll happened at t=10 with 3s of idle time.
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(observed.activity().elapsed(), Duration::from_millis(3500));
            // Second poll failed, third one saw input 200ms before t=12.
            tokio::time::sleep(Duration::from_secs(2)).await;
            assert_eq!(observed.activity().elapsed(), Duration::from_millis(700));
            shutdown.cancel();
        });
        result
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_lines_count_as_activity() -> Result<()> {
        let state = state();
        let shutdown = CancellationToken::new();
        let (mut writer, reader) = tokio::io::duplex(64);
        let watcher = LineActivityWatcher::new(BufReader::new(reader), state.clone(), shutdown);

        let observed = state.clone();
        let (result, _) = tokio::join!(watcher.run(), async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            assert_eq!(observed.activity().elapsed(), Duration::from_secs(30));

            writer.write_all(b"fn main() {}\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            assert_eq!(observed.activity().elapsed(), Duration::from_secs(2));

            // Closing the input ends the watcher without cancellation.
            drop(writer);
        });
        result
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_lines_still_count_as_activity() -> Result<()> {
        *TEST_LOGGING;
        let state = state();
        let shutdown = CancellationToken::new();
        let (mut writer, reader) = tokio::io::duplex(64);
        let watcher =
            LineActivityWatcher::new(BufReader::new(reader), state.clone(), shutdown.clone());

        let observed = state.clone();
        let (result, _) = tokio::join!(watcher.run(), async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            writer.write_all(b"caf\xe9\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(observed.activity().elapsed(), Duration::from_secs(1));

            // The watcher is still reading after the invalid line.
            tokio::time::sleep(Duration::from_secs(5)).await;
            writer.write_all(b"cafe\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(observed.activity().elapsed(), Duration::from_secs(1));
            shutdown.cancel();
        });
        result
    }

    #[tokio::test(start_paused = true)]
    async fn partial_line_is_not_activity_until_finished() -> Result<()> {
        let state = state();
        let shutdown = CancellationToken::new();
        let (mut writer, reader) = tokio::io::duplex(64);
        let watcher =
            LineActivityWatcher::new(BufReader::new(reader), state.clone(), shutdown.clone());

        let observed = state.clone();
        let (result, _) = tokio::join!(watcher.run(), async move {
            tokio::time::sleep(Duration::from_secs(4)).await;
            writer.write_all(b"let x").await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(observed.activity().elapsed(), Duration::from_secs(5));

            writer.write_all(b" = 1;\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(observed.activity().elapsed(), Duration::from_secs(1));
            shutdown.cancel();
        });
        result
    }
}
