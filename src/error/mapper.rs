//! Maps an HTTP error response to a typed [`Error`].

use serde_json::Value;

use super::{Error, ErrorKind};

const UNKNOWN_ERROR: &str = "Unknown error";

impl Error {
    /// Classifies an error response.
    ///
    /// `error_type` in the body wins over the status code, followed by an
    /// "unsupported" message, followed by the status code itself.
    pub fn from_response(status: u16, body: Option<&Value>, request_id: Option<String>) -> Self {
        Self::classify(status, body, request_id, None)
    }

    /// Like [`Error::from_response`], for endpoints that require admin rights.
    ///
    /// A 403 becomes [`ErrorKind::InsufficientPermissions`] with a message
    /// naming `action`, e.g. "Admin permissions required to create users".
    pub fn from_admin_response(
        status: u16,
        body: Option<&Value>,
        request_id: Option<String>,
        action: &str,
    ) -> Self {
        Self::classify(status, body, request_id, Some(action))
    }

    fn classify(
        status: u16,
        body: Option<&Value>,
        request_id: Option<String>,
        admin_action: Option<&str>,
    ) -> Self {
        let message = body
            .and_then(|b| str_field(b, "error").or_else(|| str_field(b, "message")))
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        let error_type = body
            .and_then(|b| str_field(b, "error_type"))
            .unwrap_or_default()
            .to_lowercase();

        let (kind, message) = if error_type.contains("quota") {
            (quota_kind(body), message)
        } else if error_type.contains("job") {
            (job_kind(body), message)
        } else if error_type.contains("file_type")
            || error_type.contains("unsupported")
            || message.to_lowercase().contains("unsupported")
        {
            (unsupported_kind(body), message)
        } else {
            by_status(status, body, message, admin_action)
        };

        let mut error = Error::new(kind, message).with_status(status);
        error.request_id = request_id;
        error.response_data = body.cloned();
        error
    }
}

fn by_status(
    status: u16,
    body: Option<&Value>,
    message: String,
    admin_action: Option<&str>,
) -> (ErrorKind, String) {
    match status {
        401 => (ErrorKind::Auth, message),
        403 => match admin_action {
            Some(action) => (
                ErrorKind::InsufficientPermissions,
                format!("Admin permissions required to {}", action),
            ),
            None => (ErrorKind::Auth, format!("Access forbidden: {}", message)),
        },
        429 => (
            ErrorKind::RateLimit {
                retry_after: body.and_then(|b| seconds_field(b, "retry_after")),
            },
            message,
        ),
        400 => (
            ErrorKind::Validation {
                validation_errors: body
                    .and_then(|b| b.get("validation_errors"))
                    .filter(|v| !v.is_null())
                    .cloned(),
            },
            message,
        ),
        402 => (quota_kind(body), message),
        404 => (ErrorKind::NotFound, format!("Resource not found: {}", message)),
        408 => (
            ErrorKind::Timeout {
                timeout_duration: body
                    .and_then(|b| b.get("timeout_duration"))
                    .and_then(Value::as_f64),
            },
            message,
        ),
        415 => (unsupported_kind(body), message),
        500..=599 => (ErrorKind::Server, message),
        _ => (ErrorKind::Other, message),
    }
}

fn quota_kind(body: Option<&Value>) -> ErrorKind {
    ErrorKind::QuotaExceeded {
        quota_type: body.and_then(|b| str_field(b, "quota_type")),
        reset_time: body.and_then(|b| str_field(b, "reset_time")),
    }
}

fn job_kind(body: Option<&Value>) -> ErrorKind {
    ErrorKind::JobFailed {
        job_id: body.and_then(|b| str_field(b, "job_id")),
        failure_reason: body.and_then(|b| str_field(b, "failure_reason")),
    }
}

fn unsupported_kind(body: Option<&Value>) -> ErrorKind {
    let supported_types = body
        .and_then(|b| b.get("supported_types"))
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    ErrorKind::UnsupportedFile {
        file_type: body.and_then(|b| str_field(b, "file_type")),
        supported_types,
    }
}

fn str_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Seconds as `30`, `1.5` or `"30"`. Fractions round up.
fn seconds_field(body: &Value, key: &str) -> Option<u64> {
    let secs = match body.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (secs.is_finite() && secs >= 0.0).then(|| secs.ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn label(kind: &ErrorKind) -> &'static str {
        match kind {
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimit { .. } => "rate_limit",
            ErrorKind::Validation { .. } => "validation",
            ErrorKind::QuotaExceeded { .. } => "quota",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Timeout { .. } => "timeout",
            ErrorKind::UnsupportedFile { .. } => "unsupported",
            ErrorKind::Server => "server",
            ErrorKind::Other => "other",
            _ => "unexpected",
        }
    }

    #[test]
    fn test_status_mapping() {
        let body = json!({"error": "nope"});
        let cases = [
            (401, "auth"),
            (403, "auth"),
            (429, "rate_limit"),
            (400, "validation"),
            (402, "quota"),
            (404, "not_found"),
            (408, "timeout"),
            (415, "unsupported"),
            (500, "server"),
            (503, "server"),
            (418, "other"),
        ];

        for (status, expected) in cases {
            let err = Error::from_response(status, Some(&body), None);
            assert_eq!(label(err.kind()), expected, "status {}", status);
            assert_eq!(err.status_code(), Some(status));
        }
    }

    #[test]
    fn test_message_prefers_error_then_message() {
        let err = Error::from_response(400, Some(&json!({"error": "a", "message": "b"})), None);
        assert_eq!(err.message(), "a");

        let err = Error::from_response(400, Some(&json!({"message": "b"})), None);
        assert_eq!(err.message(), "b");
    }

    #[test]
    fn test_missing_body_is_unknown_error() {
        let err = Error::from_response(500, None, None);
        assert_eq!(err.kind(), &ErrorKind::Server);
        assert_eq!(err.message(), "Unknown error");

        let err = Error::from_response(500, Some(&json!({})), None);
        assert_eq!(err.message(), "Unknown error");
    }

    #[test]
    fn test_forbidden_and_not_found_prefix() {
        let err = Error::from_response(403, Some(&json!({"error": "no access"})), None);
        assert_eq!(err.message(), "Access forbidden: no access");

        let err = Error::from_response(404, Some(&json!({"error": "Folder missing"})), None);
        assert_eq!(err.message(), "Resource not found: Folder missing");
    }

    #[test]
    fn test_admin_endpoint_forbidden() {
        let body = json!({"error": "Forbidden"});
        let err = Error::from_admin_response(403, Some(&body), None, "create users");
        assert_eq!(err.kind(), &ErrorKind::InsufficientPermissions);
        assert_eq!(err.message(), "Admin permissions required to create users");

        // 401 on an admin endpoint stays an authentication failure
        let err = Error::from_admin_response(401, Some(&body), None, "create users");
        assert_eq!(err.kind(), &ErrorKind::Auth);
    }

    #[test]
    fn test_error_type_takes_priority_over_status() {
        let err = Error::from_response(
            400,
            Some(&json!({
                "error": "Monthly pages exhausted",
                "error_type": "QUOTA_EXCEEDED",
                "quota_type": "pages",
                "reset_time": "2026-11-01"
            })),
            None,
        );
        assert_eq!(
            err.kind(),
            &ErrorKind::QuotaExceeded {
                quota_type: Some("pages".into()),
                reset_time: Some("2026-11-01".into())
            }
        );

        let err = Error::from_response(
            500,
            Some(&json!({"error": "boom", "error_type": "job_error", "job_id": "j1"})),
            None,
        );
        assert!(matches!(
            err.kind(),
            ErrorKind::JobFailed { job_id: Some(id), .. } if id == "j1"
        ));

        let err = Error::from_response(
            400,
            Some(&json!({"error": "bad", "error_type": "file_type_error"})),
            None,
        );
        assert!(matches!(err.kind(), ErrorKind::UnsupportedFile { .. }));
    }

    #[test]
    fn test_unsupported_message_detected() {
        let err = Error::from_response(
            400,
            Some(&json!({
                "error": "Unsupported file format",
                "file_type": "exe",
                "supported_types": ["pdf", "docx"]
            })),
            None,
        );
        assert_eq!(
            err.kind(),
            &ErrorKind::UnsupportedFile {
                file_type: Some("exe".into()),
                supported_types: vec!["pdf".into(), "docx".into()]
            }
        );
    }

    #[test]
    fn test_rate_limit_retry_after() {
        let err = Error::from_response(429, Some(&json!({"retry_after": 30})), None);
        assert_eq!(err.kind(), &ErrorKind::RateLimit { retry_after: Some(30) });
        assert_eq!(err.retry_delay(), Some(30));

        let err = Error::from_response(429, Some(&json!({"retry_after": "12"})), None);
        assert_eq!(err.retry_delay(), Some(12));

        let err = Error::from_response(429, Some(&json!({"retry_after": 1.5})), None);
        assert_eq!(err.retry_delay(), Some(2));

        let err = Error::from_response(429, Some(&json!({"retry_after": "0.2"})), None);
        assert_eq!(err.retry_delay(), Some(1));

        let err = Error::from_response(429, Some(&json!({"retry_after": -5})), None);
        assert_eq!(err.retry_delay(), Some(60));

        let err = Error::from_response(429, Some(&json!({"error": "slow down"})), None);
        assert_eq!(err.retry_delay(), Some(60));
    }

    #[test]
    fn test_validation_errors_and_request_id_kept() {
        let body = json!({"error": "bad", "validation_errors": {"name": "required"}});
        let err = Error::from_response(400, Some(&body), Some("req-9".into()));

        assert_eq!(
            err.kind(),
            &ErrorKind::Validation {
                validation_errors: Some(json!({"name": "required"}))
            }
        );
        assert_eq!(err.request_id(), Some("req-9"));
        assert_eq!(err.response_data(), Some(&body));
        assert_eq!(err.to_string(), "[400] bad (Request ID: req-9)");
    }
}
