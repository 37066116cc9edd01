//! Wire models for Cerevox API requests and responses.
//!
//! Response structs are lenient: optional fields default when absent and
//! unknown fields are ignored, so newer server versions keep decoding.

mod account;
mod hippo;
mod lexa;

use serde::{Deserialize, Serialize};

pub use account::*;
pub use hippo::*;
pub use lexa::*;

/// Body of `/token/login` and `/token/refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResponse {
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatedResponse {
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedResponse {
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub status: String,
}
