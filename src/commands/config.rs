use anyhow::Result;
use log::debug;
use std::time::Duration;

use crate::config::Config;
use crate::runtime::Runtime;

/// Connection settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientOptions {
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub base_url: Option<String>,
    pub data_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,
}

impl ClientOptions {
    /// Resolves the options into a [`Config`], falling back to `CEREVOX_API_KEY`.
    pub fn to_config<R: Runtime>(&self, runtime: &R) -> Result<Config> {
        let mut config = Config::from_runtime(runtime, self.api_key.clone())?;

        if let Some(email) = &self.email {
            config = config.with_email(email);
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(url) = &self.data_url {
            config = config.with_data_url(url);
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        debug!("Client configuration: {:?}", config);
        Ok(config)
    }
}
