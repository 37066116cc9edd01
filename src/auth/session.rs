//! Authenticated session shared by all resource clients.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::{TokenCheck, TokenManager, TokenState};
use crate::config::Config;
use crate::error::{Error, FAILED_ID, Result};
use crate::http::{ApiRequest, HttpClient, decode};
use crate::models::{MessageResponse, TokenResponse};

/// Transport, credentials and token state for one API identity.
///
/// Resource clients hold an `Arc<Session>`; a single session can back an
/// [`Account`](crate::Account), a [`Hippo`](crate::Hippo) and a
/// [`Lexa`](crate::Lexa) at the same time.
pub struct Session {
    config: Config,
    http: HttpClient,
    tokens: TokenManager,
    refresh_lock: Mutex<()>,
}

impl Session {
    /// Validates the configuration and builds the transport. Does not log in.
    pub fn new(config: Config) -> Result<Self> {
        let config = config.validated()?;
        let http = HttpClient::from_config(&config)?;
        Ok(Self {
            config,
            http,
            tokens: TokenManager::new(),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Builds a session and logs in.
    pub async fn connect(config: Config) -> Result<Arc<Self>> {
        let session = Self::new(config)?;
        session.login().await?;
        Ok(Arc::new(session))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.snapshot().is_some()
    }

    pub fn base_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    pub fn data_url(&self, path: &str) -> String {
        format!("{}{}", self.config.data_url(), path)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}{}", self.config.auth_url(), path)
    }

    /// `Basic base64(email:api_key)` with an email, `Basic base64(api_key)` without.
    fn basic_authorization(&self) -> String {
        let credentials = match self.config.email() {
            Some(email) => format!("{}:{}", email, self.config.api_key()),
            None => self.config.api_key().to_string(),
        };
        format!("Basic {}", STANDARD.encode(credentials))
    }

    #[tracing::instrument(skip(self))]
    pub async fn login(&self) -> Result<TokenResponse> {
        debug!("Logging in to {}...", self.config.auth_url());

        let request = ApiRequest::post(self.auth_url("/token/login"))
            .authorization(self.basic_authorization());
        let token: TokenResponse = decode(self.http.send(&request).await?)?;

        self.tokens.store(&token);
        info!("Logged in, token valid for {}s", token.expires_in);
        Ok(token)
    }

    #[tracing::instrument(skip(self, refresh_token))]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        if self.config.api_key().is_empty() {
            return Err(
                Error::auth("API key is required for token refresh").with_request_id(FAILED_ID)
            );
        }

        debug!("Refreshing access token...");
        let request = ApiRequest::post(self.auth_url("/token/refresh"))
            .authorization(self.basic_authorization())
            .json(&json!({ "refresh_token": refresh_token }))?;
        let token: TokenResponse = decode(self.http.send(&request).await?)?;

        self.tokens.store(&token);
        Ok(token)
    }

    /// Revokes the current token and forgets it.
    #[tracing::instrument(skip(self))]
    pub async fn revoke_token(&self) -> Result<MessageResponse> {
        let response = self
            .request_as(ApiRequest::post(self.auth_url("/token/revoke")))
            .await?;
        self.tokens.clear();
        info!("Token revoked");
        Ok(response)
    }

    /// Returns a usable token, refreshing it once if it is about to expire.
    pub async fn ensure_valid_token(&self) -> Result<Arc<TokenState>> {
        if let TokenCheck::Valid(state) = self.tokens.check(Instant::now())? {
            return Ok(state);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while this one waited for the lock
        match self.tokens.check(Instant::now())? {
            TokenCheck::Valid(state) => Ok(state),
            TokenCheck::Refresh { refresh_token } => {
                self.refresh_token(&refresh_token).await?;
                self.tokens.snapshot().ok_or_else(|| {
                    Error::auth("No access token available").with_request_id(FAILED_ID)
                })
            }
        }
    }

    /// Sends a request with a valid bearer token.
    pub async fn request(&self, request: ApiRequest) -> Result<Value> {
        let token = self.ensure_valid_token().await?;
        self.http.send(&request.authorization(token.authorization())).await
    }

    pub async fn request_as<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        decode(self.request(request).await?)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
