// src/retry.rs
use crate::config::Settings;
use crate::error::QuestResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Uniform wrapper for remote calls that can fail transiently: re-invoke
/// after a fixed delay, up to the attempt ceiling, and only while the error
/// reports itself retryable. The final failure propagates to the caller.
///
/// Tier-level retry loops in the quest engine encode their own
/// success/failure semantics and are intentionally not built on this.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.retry, Duration::from_secs(settings.retry_delay_secs))
    }

    pub async fn run<T, F, Fut>(&self, mut op: F) -> QuestResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = QuestResult<T>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.attempts || !err.is_retryable() {
                        return Err(err);
                    }
                    warn!(
                        "attempt {attempt}/{} failed: {err}; retrying in {:?}",
                        self.attempts, self.delay
                    );
                    sleep(self.delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}
