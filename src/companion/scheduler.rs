use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, warn};

use crate::{
    display::{DisplaySink, MoodFrame},
    processes::{ProcessNameSet, ProcessObserver},
    utils::clock::Clock,
};

use super::{selector::StatusSelector, state::CompanionState};

/// Drives the companion. Every tick reads the inactivity, updates the score, looks at the
/// running processes, picks a status and hands the result to the display.
pub struct Scheduler {
    state: Arc<CompanionState>,
    selector: StatusSelector,
    observer: Box<dyn ProcessObserver>,
    sink: Box<dyn DisplaySink>,
    shutdown: CancellationToken,
    tick_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    pub fn new(
        state: Arc<CompanionState>,
        selector: StatusSelector,
        observer: Box<dyn ProcessObserver>,
        sink: Box<dyn DisplaySink>,
        shutdown: CancellationToken,
        tick_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state,
            selector,
            observer,
            sink,
            shutdown,
            tick_interval,
            clock,
        }
    }

    fn tick(&mut self) -> MoodFrame {
        let idle = self.state.activity().elapsed();
        let happiness = self.state.mood().update(idle);

        let processes = self.observer.running_processes().unwrap_or_else(|e| {
            warn!("Failed to list processes, treating as none running {e:?}");
            ProcessNameSet::default()
        });

        let (bucket, status) = self.selector.select(happiness, idle, &processes);
        MoodFrame {
            bucket,
            status,
            happiness,
            idle,
            at: self.clock.time(),
        }
    }

    /// Executes the tick loop. The first tick happens right away.
    pub async fn run(mut self) -> Result<()> {
        let mut tick_point = self.clock.instant();
        loop {
            tick_point += self.tick_interval;

            {
                let _span = info_span!("Mood tick").entered();
                let frame = self.tick();
                debug!("Computed frame {:?}", frame);
                if let Err(e) = self.sink.show(&frame) {
                    error!("Failed to display frame {e:?}");
                }
            }

            tokio::select! {
                // Cancellation doesn't wait for the next tick.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.clock.sleep_until(tick_point) => ()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use anyhow::{anyhow, Result};
    use tokio_util::sync::CancellationToken;

    use super::Scheduler;
    use crate::{
        companion::{
            selector::{MoodBucket, StatusSelector},
            state::CompanionState,
        },
        config::{MoodConfig, StatusConfig},
        display::{DisplaySink, MockDisplaySink, MoodFrame},
        processes::{MockProcessObserver, ProcessNameSet},
        utils::{clock::SystemClock, logging::TEST_LOGGING},
    };

    #[derive(Clone, Default)]
    struct RecordingSink {
        frames: Arc<Mutex<Vec<MoodFrame>>>,
    }

    impl DisplaySink for RecordingSink {
        fn show(&mut self, frame: &MoodFrame) -> Result<()> {
            self.frames.lock().unwrap().push(frame.clone());
            Ok(())
        }
    }

    fn scheduler(
        initial: f64,
        observer: MockProcessObserver,
        sink: Box<dyn DisplaySink>,
        shutdown: &CancellationToken,
    ) -> (Scheduler, Arc<CompanionState>) {
        let mood = MoodConfig {
            initial,
            ..MoodConfig::default()
        };
        let state = Arc::new(CompanionState::new(&mood, Arc::new(SystemClock)));
        let scheduler = Scheduler::new(
            state.clone(),
            StatusSelector::new(StatusConfig::default(), Some(3)),
            Box::new(observer),
            sink,
            shutdown.clone(),
            Duration::from_secs(5),
            Arc::new(SystemClock),
        );
        (scheduler, state)
    }

    async fn run_for(
        scheduler: Scheduler,
        shutdown: &CancellationToken,
        duration: Duration,
    ) -> Result<()> {
        let (result, _) = tokio::join!(scheduler.run(), async {
            tokio::time::sleep(duration).await;
            shutdown.cancel();
        });
        result
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_until_cancelled() -> Result<()> {
        *TEST_LOGGING;
        let shutdown = CancellationToken::new();
        let mut observer = MockProcessObserver::new();
        observer
            .expect_running_processes()
            .times(3)
            .returning(|| Ok(ProcessNameSet::default()));
        let sink = RecordingSink::default();
        let (scheduler, state) = scheduler(80., observer, Box::new(sink.clone()), &shutdown);

        run_for(scheduler, &shutdown, Duration::from_millis(12_500)).await?;

        let frames = sink.frames.lock().unwrap();
        assert_eq!(frames.len(), 3);
        // The companion was just created, which counts as activity.
        assert_eq!(*frames[0].happiness, 81.);
        assert_eq!(frames[1].idle, Duration::from_secs(5));
        assert_eq!(*frames[1].happiness, 81. - 5. / 60.);
        assert_eq!(frames[2].idle, Duration::from_secs(10));
        assert_eq!(frames[2].happiness, state.mood().score());
        assert!(frames.iter().all(|frame| frame.bucket == MoodBucket::Happy));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn process_rules_reach_the_display() -> Result<()> {
        let shutdown = CancellationToken::new();
        let mut observer = MockProcessObserver::new();
        observer
            .expect_running_processes()
            .returning(|| Ok(["chrome.exe", "bash"].into_iter().collect()));
        let sink = RecordingSink::default();
        let (scheduler, _) = scheduler(90., observer, Box::new(sink.clone()), &shutdown);

        run_for(scheduler, &shutdown, Duration::from_secs(1)).await?;

        let frames = sink.frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].status, "I love when you research coding topics!");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn failing_collaborators_do_not_stop_ticks() -> Result<()> {
        *TEST_LOGGING;
        let shutdown = CancellationToken::new();
        let mut observer = MockProcessObserver::new();
        observer
            .expect_running_processes()
            .returning(|| Err(anyhow!("access denied")));
        let mut sink = MockDisplaySink::new();
        let shown = Arc::new(Mutex::new(Vec::new()));
        let recorded = shown.clone();
        sink.expect_show().times(4).returning(move |frame| {
            recorded.lock().unwrap().push(frame.clone());
            Err(anyhow!("portrait missing"))
        });
        let (scheduler, _) = scheduler(10., observer, Box::new(sink), &shutdown);

        // Without activity the score keeps decaying even though nothing can be displayed.
        run_for(scheduler, &shutdown, Duration::from_secs(16)).await?;

        let shown = shown.lock().unwrap();
        assert_eq!(shown.len(), 4);
        assert!(shown.iter().all(|frame| frame.bucket == MoodBucket::VerySad));
        assert!(shown[3].happiness < shown[1].happiness);
        Ok(())
    }
}
