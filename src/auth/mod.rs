//! Token lifecycle: immutable token snapshots and the authenticated session.
//!
//! A [`TokenState`] is never mutated. Login and refresh build a new one and
//! swap it into the [`TokenManager`]; requests clone the current `Arc` and
//! release the lock before any network I/O.

mod session;

use log::debug;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::config::mask_secret;
use crate::error::{Error, FAILED_ID, Result};
use crate::models::TokenResponse;

pub use session::Session;

/// Tokens are refreshed this long before they expire.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone, PartialEq)]
pub struct TokenState {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Instant,
}

impl TokenState {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: Instant,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at,
        }
    }

    pub fn from_response(token: &TokenResponse, now: Instant) -> Self {
        Self::new(
            token.access_token.clone(),
            token.refresh_token.clone().filter(|t| !t.is_empty()),
            now + Duration::from_secs(token.expires_in),
        )
    }

    /// True once `now` is within [`REFRESH_MARGIN`] of expiry.
    pub fn needs_refresh(&self, now: Instant) -> bool {
        match self.expires_at.checked_sub(REFRESH_MARGIN) {
            Some(refresh_at) => now >= refresh_at,
            None => true,
        }
    }

    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }
}

impl std::fmt::Debug for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &mask_secret(&self.access_token))
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Outcome of checking the stored token before a request.
#[derive(Debug, Clone)]
pub enum TokenCheck {
    Valid(Arc<TokenState>),
    Refresh { refresh_token: String },
}

/// Holds the current token snapshot.
#[derive(Debug, Default)]
pub struct TokenManager {
    state: RwLock<Option<Arc<TokenState>>>,
}

impl TokenManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current token with one built from a login/refresh response.
    pub fn store(&self, token: &TokenResponse) -> Arc<TokenState> {
        let state = TokenState::from_response(token, Instant::now());
        debug!(
            "Storing access token {} (expires in {}s)",
            mask_secret(&state.access_token),
            token.expires_in
        );
        self.replace(state)
    }

    pub fn replace(&self, state: TokenState) -> Arc<TokenState> {
        let state = Arc::new(state);
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(state.clone());
        state
    }

    pub fn clear(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn snapshot(&self) -> Option<Arc<TokenState>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `Bearer <token>` for the current token, if any.
    pub fn authorization_header(&self) -> Option<String> {
        self.snapshot().map(|state| state.authorization())
    }

    pub fn check(&self, now: Instant) -> Result<TokenCheck> {
        let state = self.snapshot().ok_or_else(|| {
            Error::auth("No access token available").with_request_id(FAILED_ID)
        })?;

        if !state.needs_refresh(now) {
            return Ok(TokenCheck::Valid(state));
        }

        match state.refresh_token() {
            Some(refresh_token) => Ok(TokenCheck::Refresh {
                refresh_token: refresh_token.to_string(),
            }),
            None => Err(Error::auth("No refresh token available").with_request_id(FAILED_ID)),
        }
    }
}
