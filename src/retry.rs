//! Exponential backoff for translation calls.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff schedule for one retried operation.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts including the first one
    pub max_attempts: u32,
    /// Wait after the first failure; doubled after every further failure
    pub initial_delay: Duration,
    /// Upper bound for a single wait
    pub max_delay: Duration,
}

impl RetryConfig {
    /// After failed attempt n the wait is 2^n seconds: 2s, 4s, 8s, ... capped at 30s.
    pub fn translation(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Wait before the given attempt (0-indexed). The first attempt never waits.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::translation(3)
    }
}

/// Run `operation` until it succeeds or `config.max_attempts` is used up.
///
/// The operation receives the 1-based attempt number. It always runs at
/// least once, even when `config.max_attempts` is 0. On exhaustion the error
/// of the last attempt is returned.
pub async fn with_retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);

    for attempt in 0..max_attempts {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            debug!(
                "{}: waiting {:?} before attempt {}/{}",
                operation_name,
                delay,
                attempt + 1,
                max_attempts
            );
            sleep(delay).await;
        }

        let err = match operation(attempt + 1).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{}: succeeded on attempt {}", operation_name, attempt + 1);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if attempt + 1 == max_attempts {
            warn!(
                "{}: giving up after {} attempts: {}",
                operation_name, max_attempts, err
            );
            return Err(err);
        }
        warn!(
            "{}: attempt {}/{} failed: {}",
            operation_name,
            attempt + 1,
            max_attempts,
            err
        );
    }

    unreachable!("the final attempt always returns")
}
