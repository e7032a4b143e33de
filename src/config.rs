use anyhow::Result;
use std::env;

use crate::errors::UploadError;
use crate::services::webdav::{RetryConfig, WebDAVConfig};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub server_type: String,
    pub connect_timeout_seconds: u64,
    pub read_timeout_seconds: u64,
    pub retry_max_attempts: u32,
    pub retry_initial_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Builds the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let retry_defaults = RetryConfig::default();

        Config {
            server_url: non_empty("NEXTCLOUD_URL"),
            username: non_empty("NEXTCLOUD_USER"),
            password: non_empty("NEXTCLOUD_PASSWORD"),
            server_type: non_empty("NEXTCLOUD_SERVER_TYPE")
                .map(|s| s.trim().to_lowercase())
                .unwrap_or_else(|| "nextcloud".to_string()),
            connect_timeout_seconds: lookup("WEBDAV_CONNECT_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            read_timeout_seconds: lookup("WEBDAV_READ_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            retry_max_attempts: lookup("WEBDAV_RETRY_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(retry_defaults.max_attempts),
            retry_initial_delay_ms: lookup("WEBDAV_RETRY_INITIAL_DELAY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(retry_defaults.initial_delay_ms),
            retry_max_delay_ms: lookup("WEBDAV_RETRY_MAX_DELAY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(retry_defaults.max_delay_ms),
        }
    }

    /// Server settings for the uploader. URL, user and password are required.
    pub fn webdav_config(&self) -> Result<WebDAVConfig, UploadError> {
        let required = |value: &Option<String>, name: &str| {
            value.clone().ok_or_else(|| UploadError::InvalidConfig {
                details: format!("{} is not set", name),
            })
        };

        let mut config = WebDAVConfig::new(
            required(&self.server_url, "NEXTCLOUD_URL")?,
            required(&self.username, "NEXTCLOUD_USER")?,
            required(&self.password, "NEXTCLOUD_PASSWORD")?,
        );
        config.server_type = Some(self.server_type.clone());
        config.connect_timeout_seconds = self.connect_timeout_seconds;
        config.read_timeout_seconds = self.read_timeout_seconds;

        config.validate()?;
        Ok(config)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry_max_attempts,
            initial_delay_ms: self.retry_initial_delay_ms,
            max_delay_ms: self.retry_max_delay_ms,
            ..RetryConfig::default()
        }
    }
}
