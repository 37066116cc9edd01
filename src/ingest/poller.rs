//! Job status lookup and the bounded polling loop.

use async_trait::async_trait;
use log::debug;
use std::time::{Duration, Instant};

use crate::error::{Error, ErrorKind, Result};
use crate::models::JobResponse;

/// Called with every polled status, including the terminal one.
pub type ProgressCallback<'a> = &'a (dyn Fn(&JobResponse) + Send + Sync);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn job_status(&self, request_id: &str) -> Result<JobResponse>;
}

/// Rejects empty or whitespace-only request ids before any network call.
pub fn validate_request_id(request_id: &str) -> Result<()> {
    if request_id.trim().is_empty() {
        return Err(Error::validation("request_id cannot be empty"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobPoller {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl JobPoller {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Polls until the job completes, fails or exceeds `timeout`.
    ///
    /// `complete` and `partial_success` return the final response;
    /// `failed`, `internal_error` and `not_found` return a job failure
    /// carrying the server's error message.
    #[tracing::instrument(skip(self, source, progress))]
    pub async fn wait<S: JobStatusSource + ?Sized>(
        &self,
        source: &S,
        request_id: &str,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<JobResponse> {
        validate_request_id(request_id)?;
        let start = Instant::now();

        loop {
            let status = source.job_status(request_id).await?;
            debug!(
                "Job {} is {} ({}%)",
                request_id,
                status.status,
                status.progress.unwrap_or_default()
            );

            if let Some(callback) = progress {
                callback(&status);
            }

            if status.status.is_success() {
                return Ok(status);
            }
            if status.status.is_failure() {
                return Err(job_failed(request_id, status));
            }

            tokio::time::sleep(self.poll_interval).await;

            if start.elapsed() >= self.timeout {
                return Err(Error::new(
                    ErrorKind::Timeout {
                        timeout_duration: Some(self.timeout.as_secs_f64()),
                    },
                    format!(
                        "Job {} exceeded maximum wait time of {} seconds",
                        request_id,
                        self.timeout.as_secs_f64()
                    ),
                ));
            }
        }
    }
}

fn job_failed(request_id: &str, status: JobResponse) -> Error {
    let message = status
        .error
        .clone()
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "Job failed".to_string());
    let data = serde_json::to_value(&status).ok();

    let mut error = Error::new(
        ErrorKind::JobFailed {
            job_id: Some(request_id.to_string()),
            failure_reason: status.error,
        },
        message,
    )
    .with_request_id(request_id);
    if let Some(data) = data {
        error = error.with_response_data(data);
    }
    error
}
