//! Advisory retry strategy derived from an error's kind.
//!
//! Nothing in the SDK retries on its own beyond the transport's 5xx retry;
//! callers decide whether to follow this advice.

use super::{DEFAULT_RATE_LIMIT_DELAY, Error, ErrorKind};

/// How the delay grows between consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy {
    pub should_retry: bool,
    /// Initial delay in seconds.
    pub delay: u64,
    pub backoff: Option<Backoff>,
    pub max_retries: u32,
    pub reason: &'static str,
}

impl RetryStrategy {
    /// Delay in seconds before the given 1-based attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        let attempt = attempt.max(1);
        match self.backoff {
            None | Some(Backoff::Fixed) => self.delay,
            Some(Backoff::Linear) => self.delay.saturating_mul(attempt as u64),
            Some(Backoff::Exponential) => self
                .delay
                .saturating_mul(2u64.saturating_pow(attempt - 1)),
        }
    }
}

impl Error {
    pub fn retry_strategy(&self) -> RetryStrategy {
        if !self.retry_suggested() {
            return RetryStrategy {
                should_retry: false,
                delay: 0,
                backoff: None,
                max_retries: 0,
                reason: "Error type not suitable for retry",
            };
        }

        let (delay, backoff, max_retries, reason) = match self.kind() {
            ErrorKind::RateLimit { retry_after } => (
                retry_after.unwrap_or(DEFAULT_RATE_LIMIT_DELAY),
                Backoff::Fixed,
                3,
                "Rate limit - use fixed delay",
            ),
            ErrorKind::Timeout { .. } => (
                5,
                Backoff::Exponential,
                3,
                "Timeout - use exponential backoff",
            ),
            ErrorKind::Server => (2, Backoff::Exponential, 5, "Server error - aggressive retry"),
            ErrorKind::JobFailed { .. } => (10, Backoff::Linear, 2, "Job failure - limited retry"),
            _ => (3, Backoff::Exponential, 3, "General error - standard retry"),
        };

        RetryStrategy {
            should_retry: true,
            delay,
            backoff: Some(backoff),
            max_retries,
            reason,
        }
    }
}
