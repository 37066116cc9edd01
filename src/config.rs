//! Client configuration: credentials, endpoints, timeouts and polling defaults.

use std::fmt;
use std::time::Duration;

use log::debug;

use crate::error::{Error, Result};
use crate::runtime::Runtime;

pub const DEFAULT_BASE_URL: &str = "https://dev.cerevox.ai/v1";
pub const DEFAULT_DATA_URL: &str = "https://data.cerevox.ai";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_POLL_TIME: Duration = Duration::from_secs(600);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Environment variable holding the default API key.
pub const API_KEY_ENV: &str = "CEREVOX_API_KEY";

#[derive(Clone)]
pub struct Config {
    api_key: String,
    email: Option<String>,
    base_url: String,
    data_url: String,
    auth_url: Option<String>,
    timeout: Duration,
    max_retries: u32,
    max_poll_time: Duration,
    poll_interval: Duration,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            email: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            auth_url: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            max_poll_time: DEFAULT_MAX_POLL_TIME,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Uses `api_key` when given, otherwise `CEREVOX_API_KEY`.
    pub fn from_runtime<R: Runtime + ?Sized>(runtime: &R, api_key: Option<String>) -> Result<Self> {
        let api_key = match api_key.filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => runtime.env_var(API_KEY_ENV).unwrap_or_default(),
        };
        if api_key.is_empty() {
            return Err(Error::config(format!(
                "API key is required. Provide it directly or set {} environment variable",
                API_KEY_ENV
            )));
        }
        debug!("Using API key {}", mask_secret(&api_key));
        Ok(Self::new(api_key))
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_data_url(mut self, url: impl Into<String>) -> Self {
        self.data_url = url.into();
        self
    }

    /// Overrides the host used for `/token/*` calls. Defaults to the base URL.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_poll_time(mut self, max_poll_time: Duration) -> Self {
        self.max_poll_time = max_poll_time;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Checks credentials and URLs, returning a copy with trailing slashes stripped.
    pub fn validated(&self) -> Result<Self> {
        if self.api_key.is_empty() {
            return Err(Error::config("api_key is required"));
        }
        if self.email.as_deref().is_some_and(str::is_empty) {
            return Err(Error::config("email must be a non-empty string"));
        }

        let mut config = self.clone();
        config.base_url = normalize_url("base_url", &self.base_url)?;
        config.data_url = normalize_url("data_url", &self.data_url)?;
        config.auth_url = match &self.auth_url {
            Some(url) => Some(normalize_url("auth_url", url)?),
            None => None,
        };
        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn auth_url(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(&self.base_url)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_poll_time(&self) -> Duration {
        self.max_poll_time
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &mask_secret(&self.api_key))
            .field("email", &self.email)
            .field("base_url", &self.base_url)
            .field("data_url", &self.data_url)
            .field("auth_url", &self.auth_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("max_poll_time", &self.max_poll_time)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

fn normalize_url(name: &str, url: &str) -> Result<String> {
    if url.is_empty() {
        return Err(Error::config(format!("{} must be a non-empty string", name)));
    }
    // Scheme check is case-sensitive
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::config(format!(
            "{} must start with http:// or https://",
            name
        )));
    }
    Ok(url.trim_end_matches('/').to_string())
}

/// Keeps the first and last four characters of long secrets.
pub(crate) fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn runtime_with_key(key: Option<&str>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        let key = key.map(|k| k.to_string());
        runtime
            .expect_env_var()
            .with(eq(API_KEY_ENV))
            .returning(move |_| key.clone().ok_or(std::env::VarError::NotPresent));
        runtime
    }

    #[test]
    fn test_defaults() {
        let config = Config::new("key");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.data_url(), DEFAULT_DATA_URL);
        assert_eq!(config.auth_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries(), 3);
        assert_eq!(config.max_poll_time(), Duration::from_secs(600));
    }

    #[test]
    fn test_from_runtime_prefers_explicit_key() {
        let mut runtime = MockRuntime::new();
        runtime.expect_env_var().never();

        let config = Config::from_runtime(&runtime, Some("explicit".into())).unwrap();
        assert_eq!(config.api_key(), "explicit");
    }

    #[test]
    fn test_from_runtime_reads_env() {
        let runtime = runtime_with_key(Some("from-env"));
        let config = Config::from_runtime(&runtime, None).unwrap();
        assert_eq!(config.api_key(), "from-env");
    }

    #[test]
    fn test_from_runtime_missing_key() {
        let runtime = runtime_with_key(None);
        let err = Config::from_runtime(&runtime, None).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Config);
        assert!(err.message().contains(API_KEY_ENV));
    }

    #[test]
    fn test_validated_strips_trailing_slashes() {
        let config = Config::new("key")
            .with_base_url("https://api.example.com/v1/")
            .with_data_url("http://localhost:8080//")
            .validated()
            .unwrap();
        assert_eq!(config.base_url(), "https://api.example.com/v1");
        assert_eq!(config.data_url(), "http://localhost:8080");
        assert_eq!(config.auth_url(), "https://api.example.com/v1");
    }

    #[test]
    fn test_validated_rejects_bad_urls() {
        let err = Config::new("key").with_base_url("").validated().unwrap_err();
        assert_eq!(err.message(), "base_url must be a non-empty string");

        let err = Config::new("key")
            .with_data_url("ftp://data.example.com")
            .validated()
            .unwrap_err();
        assert_eq!(err.message(), "data_url must start with http:// or https://");

        let err = Config::new("key")
            .with_auth_url("HTTPS://auth.example.com")
            .validated()
            .unwrap_err();
        assert_eq!(err.message(), "auth_url must start with http:// or https://");
    }

    #[test]
    fn test_validated_requires_api_key() {
        let err = Config::new("").validated().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Config);
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = Config::new("sk-live-1234567890abcdef");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-live-1234567890abcdef"));
        assert!(debug.contains("sk-l*********cdef"));
    }

    #[test]
    fn test_mask_short_secret() {
        assert_eq!(mask_secret("abc"), "***");
    }
}
