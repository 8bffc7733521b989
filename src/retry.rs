//! Reusable retry/backoff policy for external calls.
//!
//! The policy is a fixed pre-request delay before every attempt (the
//! external generation service rate-limits bursts) plus an exponential
//! backoff between failed attempts. One policy value is applied
//! uniformly to any call site instead of hand-rolled loops.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

/// Configuration for retrying an external call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts before the call is declared failed.
    pub max_attempts: u32,
    /// Delay in milliseconds applied before every attempt.
    pub pre_delay_ms: u64,
    /// Multiplier applied to the backoff delay after each failed attempt.
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pre_delay_ms: 3000,
            backoff_multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Policy with no delays, for tests and local mock servers.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            pre_delay_ms: 0,
            backoff_multiplier: 2,
        }
    }

    /// The constant delay applied before each request.
    pub fn pre_delay(&self) -> Duration {
        Duration::from_millis(self.pre_delay_ms)
    }

    /// Backoff delay after `failed_attempts` failures:
    /// pre_delay * multiplier^failed_attempts.
    pub fn backoff_delay(&self, failed_attempts: u32) -> Duration {
        let factor = u64::from(self.backoff_multiplier).saturating_pow(failed_attempts);
        Duration::from_millis(self.pre_delay_ms.saturating_mul(factor))
    }

    /// Run `op` until it succeeds or the attempt budget is spent,
    /// returning the last error on exhaustion. The closure receives the
    /// 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            sleep(self.pre_delay()).await;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= max => return Err(err),
                Err(_) => sleep(self.backoff_delay(attempt)).await,
            }
        }
    }
}
