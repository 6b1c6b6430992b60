use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Provides time to the companion. Both the activity clock and the scheduler read time through
/// this trait, so tests can run them under paused tokio time.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall clock time. Only used for labeling frames.
    fn time(&self) -> DateTime<Utc>;

    /// Monotonic time used for every inactivity computation.
    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
