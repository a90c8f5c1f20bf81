//! Retry schedule for CDX index fetches.
//!
//! A fetch gets a bounded number of automatic attempts with exponentially
//! doubling delays. Once the schedule is exhausted the operator is asked,
//! through [`RetryPrompt`], whether to wait out a longer cool-down and start
//! the schedule over, or give up on the domain.

use std::time::Duration;

/// Automatic attempts before the operator is consulted.
pub const MAX_FETCH_ATTEMPTS: u32 = 5;

/// Cool-down applied when the operator opts to keep trying.
pub const OPERATOR_WAIT: Duration = Duration::from_secs(120);

/// Exponential backoff schedule with a fixed attempt budget.
///
/// Delays double per attempt starting from the configured base:
/// `base, 2*base, 4*base, ...`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given base delay and the standard
    /// [`MAX_FETCH_ATTEMPTS`] budget.
    #[must_use]
    pub fn new(base_delay: Duration) -> Self {
        Self {
            max_attempts: MAX_FETCH_ATTEMPTS,
            base_delay,
        }
    }

    /// The attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to sleep after the given failed attempt (1-indexed), or `None`
    /// when the budget is exhausted and the operator should be consulted.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        Some(self.base_delay.saturating_mul(factor))
    }
}

/// Operator decision point after the automatic retry budget is spent.
///
/// Implemented by the interactive shell with a console prompt; one-shot CLI
/// runs and tests inject [`AbortOnExhaustion`].
pub trait RetryPrompt: Send + Sync {
    /// Returns true to wait [`OPERATOR_WAIT`] and restart the schedule,
    /// false to give up on the domain.
    fn wait_and_retry(&self, domain: &str) -> bool;
}

/// Always gives up once the automatic attempts are spent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnExhaustion;

impl RetryPrompt for AbortOnExhaustion {
    fn wait_and_retry(&self, _domain: &str) -> bool {
        false
    }
}
