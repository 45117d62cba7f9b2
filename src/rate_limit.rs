use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Minimum-interval limiter for calls to the translation API.
///
/// Callers are served one at a time; each grant happens no sooner than
/// `1000ms / calls_per_second` after the previous grant.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_granted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(calls_per_second: u32) -> Self {
        let min_interval = Duration::from_millis(1000) / calls_per_second.max(1);
        Self {
            min_interval,
            last_granted: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a call is allowed, then record the grant time.
    pub async fn acquire(&self) {
        // Held across the sleep so concurrent callers queue behind each other
        let mut last = self.last_granted.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                debug!(
                    "Rate limit: waiting {:?}",
                    ready_at.saturating_duration_since(Instant::now())
                );
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
