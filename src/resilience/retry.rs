//! Retry engine
//!
//! Wraps a single-exchange operation with bounded retries and exponential backoff
//! (`base * 2^attempt`). Cancellation short-circuits both the attempts and the
//! backoff wait.

use crate::{Error, Result};
use std::future::Future;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(200);

/// Configuration for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero means exactly one attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay after the failed `attempt` (0-based): `base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(base.saturating_mul(factor))
    }

    /// Run `op` for attempts `0..=max_retries`.
    ///
    /// Non-retryable errors (cancellation, decode, configuration) are returned at once.
    /// When the budget is exhausted the last error is returned as is.
    pub async fn execute<T, F, Fut>(&self, cancel: Option<&CancellationToken>, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            if cancel.map(|t| t.is_cancelled()).unwrap_or(false) {
                return Err(Error::Cancelled);
            }

            let err = match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= self.max_retries {
                if self.max_retries > 0 {
                    warn!(attempts = attempt + 1, error = %err, "retry budget exhausted");
                }
                return Err(err);
            }

            let delay = self.backoff(attempt);
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "attempt failed, backing off"
            );
            sleep_or_cancel(delay, cancel).await?;
            attempt += 1;
        }
    }
}

async fn sleep_or_cancel(delay: Duration, cancel: Option<&CancellationToken>) -> Result<()> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        },
        None => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}
