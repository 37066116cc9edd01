//! HTTP client with connection-level retry and error-body capture.

use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use super::request::{ApiRequest, Body};
use super::retry::{backoff_delay, classify_error, is_retryable_status, is_retryable_transport};
use crate::config::Config;
use crate::error::{Error, FAILED_ID, Result};

/// Response header carrying the server-side request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn user_agent() -> String {
    format!("cerevox-rust/{}", env!("CEREVOX_VERSION"))
}

/// Shared transport used by every resource client.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(client: Client, max_retries: u32, timeout: Duration) -> Self {
        Self {
            client,
            max_retries,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::new(client, config.max_retries(), config.timeout()))
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Sends the request and returns the decoded JSON body.
    ///
    /// A 2xx response without a JSON body yields `{"status": "success"}`.
    /// Any other status is mapped to a typed [`Error`].
    #[tracing::instrument(skip(self, request))]
    pub async fn send(&self, request: &ApiRequest) -> Result<Value> {
        debug!("{} {}...", request.method, request.url);

        let authorization = match request.authorization.as_deref() {
            Some(value) => {
                let mut header = HeaderValue::from_str(value)?;
                header.set_sensitive(true);
                Some(header)
            }
            None => None,
        };

        let operation_name = format!("{} {}", request.method, request.url);
        let response = self
            .with_retry(&operation_name, || self.send_once(request, authorization.clone()))
            .await
            .map_err(|e| classify_error(&e, request.timeout.unwrap_or(self.timeout)))?;

        handle_response(response, request.admin_action.as_deref()).await
    }

    /// Issues a HEAD request, following redirects, and returns the response headers.
    #[tracing::instrument(skip(self))]
    pub async fn head(&self, url: &str, timeout: Duration) -> Result<HeaderMap> {
        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|e| classify_error(&e, timeout))?;
        Ok(response.headers().clone())
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        authorization: Option<HeaderValue>,
    ) -> std::result::Result<Response, reqwest::Error> {
        let mut builder = self.client.request(request.method.clone(), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(header) = authorization {
            builder = builder.header(AUTHORIZATION, header);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(parts) => {
                let form = parts.iter().fold(Form::new(), |form, part| {
                    form.part(
                        part.field.clone(),
                        Part::bytes(part.content.clone()).file_name(part.filename.clone()),
                    )
                });
                builder.multipart(form)
            }
        };

        builder.send().await
    }

    /// Retries transient failures (5xx listed in `RETRY_STATUSES`, connection errors)
    /// up to `max_retries` extra attempts with exponential backoff.
    async fn with_retry<F, Fut>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> std::result::Result<Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<Response, reqwest::Error>>,
    {
        let mut attempt = 0;

        loop {
            let result = operation().await;

            let reason = match &result {
                Ok(response) if is_retryable_status(response.status()) => {
                    Some(format!("HTTP {}", response.status().as_u16()))
                }
                Err(e) if is_retryable_transport(e) => Some(e.to_string()),
                _ => None,
            };

            match reason {
                Some(reason) if attempt < self.max_retries => {
                    let delay = backoff_delay(attempt);
                    attempt += 1;
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                        operation_name,
                        attempt,
                        self.max_retries + 1,
                        reason,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                _ => return result,
            }
        }
    }
}

async fn handle_response(response: Response, admin_action: Option<&str>) -> Result<Value> {
    let status = response.status();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let text = response.text().await.map_err(|e| {
        Error::other(format!("Failed to read response body: {}", e))
            .with_request_id(request_id.clone().unwrap_or_else(|| FAILED_ID.to_string()))
    })?;

    if status.is_success() {
        return Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({"status": "success"})));
    }

    let body = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| {
        json!({
            "error": format!("HTTP {}", status.as_u16()),
            "message": text,
        })
    });
    let request_id = Some(request_id.unwrap_or_else(|| FAILED_ID.to_string()));

    let error = match admin_action {
        Some(action) => {
            Error::from_admin_response(status.as_u16(), Some(&body), request_id, action)
        }
        None => Error::from_response(status.as_u16(), Some(&body), request_id),
    };
    debug!("Request failed: {}", error);
    Err(error)
}

/// Deserializes a JSON body into a typed model.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::other(format!("Failed to parse response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::FilePart;
    use mockito::Matcher;

    fn client(max_retries: u32) -> HttpClient {
        HttpClient::new(Client::new(), max_retries, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_send_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/accounts/my")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"account_id": "acc-1", "account_name": "Acme"}"#)
            .create_async()
            .await;

        let value = client(0)
            .send(&ApiRequest::get(format!("{}/accounts/my", url)))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["account_id"], "acc-1");
    }

    #[tokio::test]
    async fn test_send_non_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("DELETE", "/folders/f1")
            .with_status(204)
            .create_async()
            .await;

        let value = client(0)
            .send(&ApiRequest::delete(format!("{}/folders/f1", url)))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value, json!({"status": "success"}));
    }

    #[tokio::test]
    async fn test_send_error_maps_body_and_request_id() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/folders")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_header("x-request-id", "req-42")
            .with_body(r#"{"error": "folder_name is required"}"#)
            .create_async()
            .await;

        let err = client(0)
            .send(&ApiRequest::post(format!("{}/folders", url)))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err.kind(), ErrorKind::Validation { .. }));
        assert_eq!(err.request_id(), Some("req-42"));
        assert_eq!(
            err.to_string(),
            "[400] folder_name is required (Request ID: req-42)"
        );
    }

    #[tokio::test]
    async fn test_send_non_json_error_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/chats/c1")
            .with_status(404)
            .with_body("not here")
            .create_async()
            .await;

        let err = client(0)
            .send(&ApiRequest::get(format!("{}/chats/c1", url)))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.kind(), &ErrorKind::NotFound);
        assert_eq!(err.message(), "Resource not found: HTTP 404");
        assert_eq!(err.request_id(), Some(FAILED_ID));
        assert_eq!(err.response_data().unwrap()["message"], "not here");
    }

    #[test_log::test(tokio::test)]
    async fn test_send_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/users")
            .with_status(503)
            .with_body(r#"{"error": "unavailable"}"#)
            .expect(3)
            .create_async()
            .await;

        let err = client(2)
            .send(&ApiRequest::get(format!("{}/users", url)))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.kind(), &ErrorKind::Server);
        assert_eq!(err.status_code(), Some(503));
    }

    #[tokio::test]
    async fn test_send_does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/users/me")
            .with_status(401)
            .with_body(r#"{"error": "Invalid token"}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client(3)
            .send(&ApiRequest::get(format!("{}/users/me", url)))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.kind(), &ErrorKind::Auth);
        assert!(!err.retry_suggested());
    }

    #[tokio::test]
    async fn test_send_admin_forbidden() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/users")
            .with_status(403)
            .with_body(r#"{"error": "Forbidden"}"#)
            .create_async()
            .await;

        let err = client(0)
            .send(&ApiRequest::post(format!("{}/users", url)).admin("create users"))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.kind(), &ErrorKind::InsufficientPermissions);
    }

    #[tokio::test]
    async fn test_send_headers_query_and_json_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/v0/file-urls")
            .match_header("authorization", "Bearer abc")
            .match_header("accept", "application/json")
            .match_query(Matcher::UrlEncoded("trace".into(), "1".into()))
            .match_body(Matcher::PartialJson(json!({"mode": "default"})))
            .with_status(200)
            .with_body(r#"{"message": "ok", "request_id": "r1"}"#)
            .create_async()
            .await;

        let config = Config::new("key");
        let request = ApiRequest::post(format!("{}/v0/file-urls", url))
            .query("trace", 1)
            .authorization("Bearer abc")
            .json(&json!({"mode": "default", "product": "lexa"}))
            .unwrap();
        let value = HttpClient::from_config(&config)
            .unwrap()
            .send(&request)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(value["request_id"], "r1");
    }

    #[tokio::test]
    async fn test_send_multipart() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/v0/files")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data; boundary=.*".into()),
            )
            .match_body(Matcher::Regex(
                r#"name="files"; filename="report.pdf""#.into(),
            ))
            .with_status(200)
            .with_body(r#"{"message": "queued", "request_id": "r2"}"#)
            .create_async()
            .await;

        let request = ApiRequest::post(format!("{}/v0/files", url)).multipart(vec![FilePart::new(
            "files",
            "report.pdf",
            b"%PDF".to_vec(),
        )]);
        let value = client(0).send(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(value["request_id"], "r2");
    }

    #[test_log::test(tokio::test)]
    async fn test_send_connection_refused() {
        let err = client(0)
            .send(&ApiRequest::get("http://127.0.0.1:1/unreachable"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::Other);
        assert!(err.message().starts_with("Request failed:"));
        assert_eq!(err.request_id(), Some(FAILED_ID));
    }

    #[tokio::test]
    async fn test_head_returns_headers() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("HEAD", "/doc")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .create_async()
            .await;

        let headers = client(0)
            .head(&format!("{}/doc", url), Duration::from_secs(2))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(headers["content-type"], "application/pdf");
    }

    #[test]
    fn test_decode_error() {
        let result: Result<Vec<String>> = decode(json!({"not": "a list"}));
        let err = result.unwrap_err();
        assert!(err.message().starts_with("Failed to parse response"));
    }

    #[test]
    fn test_user_agent() {
        assert!(user_agent().starts_with("cerevox-rust/"));
    }
}
