//! Account, plan, usage and user management.

use serde_json::Value;
use std::sync::Arc;

use crate::auth::Session;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, decode};
use crate::models::{
    AccountInfo, AccountPlan, CreatedResponse, DeletedResponse, MessageResponse, TokenResponse,
    UpdatedResponse, UsageMetrics, User, UserCreate, UserDelete, UserList, UserUpdate,
};

/// Client for `/accounts` and `/users`. Requires email credentials.
#[derive(Debug, Clone)]
pub struct Account {
    session: Arc<Session>,
}

impl Account {
    pub fn new(session: Arc<Session>) -> Result<Self> {
        if session.config().email().is_none() {
            return Err(Error::config(
                "Both email and api_key are required for authentication",
            ));
        }
        Ok(Self { session })
    }

    /// Builds a session from `config`, logs in and returns the client.
    pub async fn connect(config: Config) -> Result<Self> {
        if config.email().is_none() {
            return Err(Error::config(
                "Both email and api_key are required for authentication",
            ));
        }
        Self::new(Session::connect(config).await?)
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn login(&self) -> Result<TokenResponse> {
        self.session.login().await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.session.refresh_token(refresh_token).await
    }

    pub async fn revoke_token(&self) -> Result<MessageResponse> {
        self.session.revoke_token().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_account_info(&self) -> Result<AccountInfo> {
        self.get("/accounts/my").await
    }

    /// Plan of an account. Accepts both `{"plan": {...}}` and a bare plan object.
    #[tracing::instrument(skip(self))]
    pub async fn get_account_plan(&self, account_id: &str) -> Result<AccountPlan> {
        let mut body: Value = self
            .session
            .request(ApiRequest::get(
                self.session.base_url(&format!("/accounts/{}/plan", account_id)),
            ))
            .await?;

        if body.get("plan").is_some_and(Value::is_object) {
            decode(body["plan"].take())
        } else {
            decode(body)
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_account_usage(&self, account_id: &str) -> Result<UsageMetrics> {
        self.get(&format!("/accounts/{}/usage", account_id)).await
    }

    /// Admin only.
    #[tracing::instrument(skip(self))]
    pub async fn create_user(&self, email: &str, name: &str) -> Result<CreatedResponse> {
        let request = ApiRequest::post(self.session.base_url("/users"))
            .json(&UserCreate { email, name })?
            .admin("create users");
        self.session.request_as(request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_users(&self) -> Result<Vec<User>> {
        let users: UserList = self.get("/users").await?;
        Ok(users.into())
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user_me(&self) -> Result<User> {
        self.get("/users/me").await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_user_me(&self, name: &str) -> Result<UpdatedResponse> {
        let request =
            ApiRequest::put(self.session.base_url("/users/me")).json(&UserUpdate { name })?;
        self.session.request_as(request).await
    }

    /// Admin only.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        let request = ApiRequest::get(self.session.base_url(&format!("/users/{}", user_id)))
            .admin("get user by ID");
        self.session.request_as(request).await
    }

    /// Admin only.
    #[tracing::instrument(skip(self))]
    pub async fn update_user_by_id(&self, user_id: &str, name: &str) -> Result<UpdatedResponse> {
        let request = ApiRequest::put(self.session.base_url(&format!("/users/{}", user_id)))
            .json(&UserUpdate { name })?
            .admin("update user by ID");
        self.session.request_as(request).await
    }

    /// Admin only. `email` must match the user being deleted.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user_by_id(&self, user_id: &str, email: &str) -> Result<DeletedResponse> {
        let request = ApiRequest::delete(self.session.base_url(&format!("/users/{}", user_id)))
            .json(&UserDelete { email })?
            .admin("delete user by ID");
        self.session.request_as(request).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.session
            .request_as(ApiRequest::get(self.session.base_url(path)))
            .await
    }
}
