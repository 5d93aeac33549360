use tokio::time::{sleep, Duration};
use tracing::warn;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct RetrySettings {
    /// rate-limited attempts allowed per request
    pub attempts: u32,
    /// first delay, doubled after every rate-limited attempt, no upper cap
    pub base_delay: Duration,
}

impl RetrySettings {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self { attempts, base_delay }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            max_attempts: self.attempts,
            attempts: 0,
            delay: self.base_delay,
            total_delay: Duration::ZERO,
        }
    }
}

/// Per-request backoff state: 1, 2, 4, 8, ... base delays
#[derive(Debug)]
pub struct Backoff {
    max_attempts: u32,
    attempts: u32,
    delay: Duration,
    total_delay: Duration,
}

impl Backoff {
    pub fn exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn total_delay(&self) -> Duration {
        self.total_delay
    }

    /// Delay the next `wait` will sleep for
    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the current delay, then double it and count the attempt.
    pub async fn wait(&mut self) {
        warn!(
            "rate limited, attempt {}/{}, backing off {:?}",
            self.attempts + 1,
            self.max_attempts,
            self.delay
        );
        sleep(self.delay).await;
        self.total_delay += self.delay;
        self.delay = self.delay.saturating_mul(2);
        self.attempts += 1;
    }

    pub fn exceeded(&self) -> ApiError {
        ApiError::MaxAttemptsExceeded(self.max_attempts)
    }
}
