//! HTTP transport: request description, retry policy and response handling.

mod client;
mod request;
mod retry;

pub use client::{HttpClient, REQUEST_ID_HEADER, decode};
pub use request::{ApiRequest, Body, FilePart};
pub use retry::{BACKOFF_FACTOR, RETRY_STATUSES, backoff_delay, classify_error, is_retryable_status};
