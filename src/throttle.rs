//! Remote-call pacing.
//!
//! Every cache miss pays a minimum spacing before the outbound inference
//! call so the service self-throttles against the third-party API. The
//! gate is shared process-wide: concurrent misses queue on the internal
//! lock and leave at least one interval between successive remote calls,
//! instead of each request sleeping a fixed amount independently.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Process-wide minimum-interval gate for outbound calls.
pub struct RequestGate {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RequestGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until at least `min_interval` has passed since the previous
    /// acquisition, then stamp the clock.
    ///
    /// The lock is held across the wait so concurrent callers are spaced
    /// out one interval apart rather than released in a burst.
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "Pacing remote call");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}
