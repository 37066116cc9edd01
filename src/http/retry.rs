//! Connection-level retry policy for transient server failures.

use reqwest::StatusCode;
use std::time::Duration;

use crate::error::{Error, ErrorKind, FAILED_ID};

/// Status codes retried by the transport.
pub const RETRY_STATUSES: [u16; 5] = [500, 501, 502, 503, 504];

/// Base of the exponential backoff, in seconds.
pub const BACKOFF_FACTOR: f64 = 0.1;

pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRY_STATUSES.contains(&status.as_u16())
}

/// Sleep before retry number `attempt` (0-based): 0.1s, 0.2s, 0.4s, ...
pub fn backoff_delay(attempt: u32) -> Duration {
    let base_ms = (BACKOFF_FACTOR * 1000.0) as u64;
    Duration::from_millis(base_ms.saturating_mul(1 << attempt.min(16)))
}

/// Converts a reqwest failure that produced no HTTP response into an [`Error`].
pub fn classify_error(error: &reqwest::Error, timeout: Duration) -> Error {
    if error.is_timeout() {
        return Error::new(
            ErrorKind::Timeout {
                timeout_duration: Some(timeout.as_secs_f64()),
            },
            "Request timed out",
        )
        .with_request_id(FAILED_ID);
    }

    Error::other(format!("Request failed: {}", error)).with_request_id(FAILED_ID)
}

/// Connection failures are transient; everything else reached the server.
pub(crate) fn is_retryable_transport(error: &reqwest::Error) -> bool {
    error.is_connect()
}
