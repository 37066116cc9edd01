use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: String,
    pub account_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPlan {
    pub plan: String,
    #[serde(default)]
    pub base: Option<u64>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub messages: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageCounter {
    #[serde(default)]
    pub processed: u64,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageUsage {
    #[serde(default)]
    pub used: u64,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    #[serde(default)]
    pub files: UsageCounter,
    #[serde(default)]
    pub pages: UsageCounter,
    #[serde(default)]
    pub advanced_pages: UsageCounter,
    #[serde(default)]
    pub storage: StorageUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub isadmin: bool,
    #[serde(default)]
    pub isbanned: bool,
}

/// `GET /users` answers either a bare list or `{"users": [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserList {
    Bare(Vec<User>),
    Wrapped { users: Vec<User> },
}

impl From<UserList> for Vec<User> {
    fn from(list: UserList) -> Self {
        match list {
            UserList::Bare(users) | UserList::Wrapped { users } => users,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserCreate<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserUpdate<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UserDelete<'a> {
    pub email: &'a str,
}
