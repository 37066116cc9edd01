use anyhow::{Context, Result};
use serde::Serialize;

pub mod config;
mod account;
mod hippo;
mod job;
mod parse;

pub use account::{account_info, account_plan, account_usage, list_users};
pub use config::ClientOptions;
pub use hippo::{ask, list_folders};
pub use job::job_status;
pub use parse::{parse_files, parse_urls};

/// Pretty-prints a response as JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize response")?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ClientOptions;
    use crate::runtime::MockRuntime;
    use mockito::{Mock, Server};

    /// Runtime that must not be asked for the API key.
    pub fn runtime() -> MockRuntime {
        MockRuntime::new()
    }

    pub fn options(url: &str, with_email: bool) -> ClientOptions {
        ClientOptions {
            api_key: Some("cli-key".into()),
            email: with_email.then(|| "user@example.com".to_string()),
            base_url: Some(url.to_string()),
            data_url: Some(url.to_string()),
            timeout: Some(5),
        }
    }

    pub async fn login_mock(server: &mut Server) -> Mock {
        server
            .mock("POST", "/token/login")
            .with_status(200)
            .with_body(
                r#"{"access_token": "cli-token", "expires_in": 3600, "refresh_token": "cli-refresh"}"#,
            )
            .create_async()
            .await
    }
}
