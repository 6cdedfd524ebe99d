use std::time::Duration;

/// Retry schedule for background tasks.
///
/// A task gets at most `max_attempts` attempts. The wait before attempt `n`
/// (n >= 2) is `base_delay * (n - 1)`: with the defaults that is 60s before
/// the second attempt and 120s before the third and last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub base_delay: Duration,
}

/// What to do after attempt `attempt` failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then run `next_attempt`.
    Retry { next_attempt: u8, delay: Duration },
    /// No attempts left; the task is a terminal failure.
    Exhausted,
}

impl RetryPolicy {
    pub fn new(max_attempts: u8, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay inserted before the given attempt number. Attempt 1 runs
    /// immediately.
    pub fn delay_before(&self, attempt: u8) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.base_delay * u32::from(attempt - 1)
        }
    }

    /// Decide the follow-up after a retryable failure of `attempt`.
    pub fn after_failure(&self, attempt: u8) -> RetryDecision {
        if attempt >= self.max_attempts {
            RetryDecision::Exhausted
        } else {
            let next_attempt = attempt + 1;
            RetryDecision::Retry {
                next_attempt,
                delay: self.delay_before(next_attempt),
            }
        }
    }

    /// Total time spent waiting when every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (2..=self.max_attempts).map(|n| self.delay_before(n)).sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(60),
        }
    }
}
