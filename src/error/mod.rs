//! Typed error taxonomy for Cerevox API failures.
//!
//! Every failure surfaced by the SDK is an [`Error`]: a message plus the
//! HTTP status, request id and raw response body when the server produced
//! one. The [`ErrorKind`] discriminant carries the kind-specific payload and
//! drives the retry advice in [`Error::retry_suggested`] and
//! [`Error::retry_strategy`].
//!
//! # Structure
//!
//! - `mapper` - `(status, body) -> Error` classification
//! - `strategy` - advisory retry strategy per kind

mod mapper;
mod strategy;

use serde_json::Value;

pub use strategy::{Backoff, RetryStrategy};

/// Request id used when the server response carried no `x-request-id` header.
pub const FAILED_ID: &str = "Failed to get request ID from response";

/// Default delay in seconds suggested for rate-limited requests without `retry_after`.
pub const DEFAULT_RATE_LIMIT_DELAY: u64 = 60;

/// Job failure reasons that will not succeed on a retry.
const PERMANENT_JOB_FAILURES: &[&str] = &[
    "invalid_file_format",
    "file_corrupted",
    "file_too_large",
    "unsupported_format",
];

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Discriminant of an [`Error`] together with its kind-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Authentication failed (HTTP 401/403, or no usable token)
    Auth,
    /// Caller is authenticated but lacks admin rights for the endpoint
    InsufficientPermissions,
    /// HTTP 429
    RateLimit { retry_after: Option<u64> },
    /// Transport timeout, HTTP 408, or a job exceeding its wait time
    Timeout { timeout_duration: Option<f64> },
    /// HTTP 400 or client-side input validation
    Validation { validation_errors: Option<Value> },
    /// Processing job reached a failure state
    JobFailed {
        job_id: Option<String>,
        failure_reason: Option<String>,
    },
    /// HTTP 415 or an unsupported file reported by the server
    UnsupportedFile {
        file_type: Option<String>,
        supported_types: Vec<String>,
    },
    /// HTTP 402 or a quota error reported by the server
    QuotaExceeded {
        quota_type: Option<String>,
        reset_time: Option<String>,
    },
    /// HTTP 5xx
    Server,
    /// HTTP 404
    NotFound,
    /// Invalid client configuration (credentials, URLs)
    Config,
    /// Local file could not be read
    Io,
    /// Anything else, including transport failures
    Other,
}

impl ErrorKind {
    /// Message used when an error of this kind is raised without one.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "Authentication failed",
            ErrorKind::InsufficientPermissions => "Insufficient permissions",
            ErrorKind::RateLimit { .. } => "Rate limit exceeded",
            ErrorKind::Timeout { .. } => "Request timed out",
            ErrorKind::Validation { .. } => "Request validation failed",
            ErrorKind::JobFailed { .. } => "Processing job failed",
            ErrorKind::UnsupportedFile { .. } => "Unsupported file type",
            ErrorKind::QuotaExceeded { .. } => "Usage quota exceeded",
            ErrorKind::Server => "Internal server error",
            ErrorKind::NotFound => "Resource not found",
            ErrorKind::Config => "Invalid configuration",
            ErrorKind::Io => "File operation failed",
            ErrorKind::Other => "Unknown error",
        }
    }
}

/// An error returned by any Cerevox SDK operation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", render(.message, .status_code, .request_id))]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status_code: Option<u16>,
    request_id: Option<String>,
    response_data: Option<Value>,
}

fn render(message: &str, status_code: &Option<u16>, request_id: &Option<String>) -> String {
    let mut out = match status_code {
        Some(code) => format!("[{}] {}", code, message),
        None => message.to_string(),
    };
    if let Some(id) = request_id {
        out.push_str(&format!(" (Request ID: {})", id));
    }
    out
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            response_data: None,
        }
    }

    /// Creates an error carrying the kind's default message.
    pub fn from_kind(kind: ErrorKind) -> Self {
        let message = kind.default_message();
        Self::new(kind, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Validation {
                validation_errors: None,
            },
            message,
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Other, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_response_data(mut self, data: Value) -> Self {
        self.response_data = Some(data);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn response_data(&self) -> Option<&Value> {
        self.response_data.as_ref()
    }

    /// Whether retrying the failed operation may succeed.
    pub fn retry_suggested(&self) -> bool {
        match &self.kind {
            ErrorKind::RateLimit { .. } | ErrorKind::Timeout { .. } | ErrorKind::Server => true,
            ErrorKind::QuotaExceeded { reset_time, .. } => reset_time.is_some(),
            ErrorKind::JobFailed { failure_reason, .. } => {
                let reason = failure_reason.as_deref().unwrap_or_default().to_lowercase();
                !PERMANENT_JOB_FAILURES
                    .iter()
                    .any(|permanent| reason.contains(permanent))
            }
            ErrorKind::Auth
            | ErrorKind::InsufficientPermissions
            | ErrorKind::Validation { .. }
            | ErrorKind::UnsupportedFile { .. }
            | ErrorKind::NotFound
            | ErrorKind::Config
            | ErrorKind::Io
            | ErrorKind::Other => false,
        }
    }

    /// Seconds the server asked the caller to wait, for rate-limited requests.
    pub fn retry_delay(&self) -> Option<u64> {
        match &self.kind {
            ErrorKind::RateLimit { retry_after } => {
                Some(retry_after.unwrap_or(DEFAULT_RATE_LIMIT_DELAY))
            }
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Auth | ErrorKind::InsufficientPermissions
        )
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Error::config(format!("Invalid header value: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_status_and_request_id() {
        let err = Error::validation("Bad input")
            .with_status(400)
            .with_request_id("req-123");
        assert_eq!(err.to_string(), "[400] Bad input (Request ID: req-123)");
    }

    #[test]
    fn test_display_variants() {
        assert_eq!(
            Error::new(ErrorKind::NotFound, "gone").with_status(404).to_string(),
            "[404] gone"
        );
        assert_eq!(
            Error::other("boom").with_request_id("x").to_string(),
            "boom (Request ID: x)"
        );
        assert_eq!(Error::other("plain").to_string(), "plain");
    }

    #[test]
    fn test_default_messages() {
        assert_eq!(
            Error::from_kind(ErrorKind::Auth).message(),
            "Authentication failed"
        );
        assert_eq!(
            Error::from_kind(ErrorKind::RateLimit { retry_after: None }).message(),
            "Rate limit exceeded"
        );
        assert_eq!(
            Error::from_kind(ErrorKind::Server).message(),
            "Internal server error"
        );
    }

    #[test]
    fn test_retry_suggested_by_kind() {
        assert!(Error::from_kind(ErrorKind::Server).retry_suggested());
        assert!(
            Error::from_kind(ErrorKind::Timeout {
                timeout_duration: Some(30.0)
            })
            .retry_suggested()
        );
        assert!(!Error::from_kind(ErrorKind::Auth).retry_suggested());
        assert!(!Error::from_kind(ErrorKind::NotFound).retry_suggested());
        assert!(!Error::validation("bad").retry_suggested());
    }

    #[test]
    fn test_quota_retry_depends_on_reset_time() {
        let no_reset = Error::from_kind(ErrorKind::QuotaExceeded {
            quota_type: Some("pages".into()),
            reset_time: None,
        });
        assert!(!no_reset.retry_suggested());

        let with_reset = Error::from_kind(ErrorKind::QuotaExceeded {
            quota_type: Some("pages".into()),
            reset_time: Some("2026-01-01T00:00:00Z".into()),
        });
        assert!(with_reset.retry_suggested());
    }

    #[test]
    fn test_job_failed_permanent_reasons() {
        let job = |reason: Option<&str>| {
            Error::from_kind(ErrorKind::JobFailed {
                job_id: Some("job-1".into()),
                failure_reason: reason.map(str::to_string),
            })
        };

        assert!(job(None).retry_suggested());
        assert!(job(Some("worker crashed")).retry_suggested());
        assert!(!job(Some("INVALID_FILE_FORMAT")).retry_suggested());
        assert!(!job(Some("file_too_large: 2GB")).retry_suggested());
    }

    #[test]
    fn test_rate_limit_delay_defaults_to_60() {
        let err = Error::from_kind(ErrorKind::RateLimit { retry_after: None });
        assert_eq!(err.retry_delay(), Some(60));

        let err = Error::from_kind(ErrorKind::RateLimit {
            retry_after: Some(15),
        });
        assert_eq!(err.retry_delay(), Some(15));

        assert_eq!(Error::from_kind(ErrorKind::Server).retry_delay(), None);
    }
}
