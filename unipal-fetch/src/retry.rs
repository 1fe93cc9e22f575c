//! Bounded retry with jittered backoff.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// Retry schedule: a fixed base delay plus a uniformly random jitter,
/// applied between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub base_delay: Duration,
    /// Upper bound of the random jitter added to each delay.
    pub jitter: Duration,
}

impl RetryPolicy {
    /// A policy with the given attempt count and no delay.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Sets the fixed delay between attempts.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Sets the jitter upper bound.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Computes the next sleep: base delay plus random jitter.
    fn delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base_delay;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..self.jitter.as_millis() as u64);
        self.base_delay + Duration::from_millis(jitter_ms)
    }
}

/// Runs `op` up to `policy.max_attempts` times, sleeping between failed
/// attempts. The closure receives the 1-based attempt number. The last
/// error is returned when all attempts fail.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                debug!(attempt, error = %err, "Attempt failed, retrying");
                tokio::time::sleep(policy.delay()).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
