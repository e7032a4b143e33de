use std::time::Duration;

use crate::errors::UploadError;
use crate::models::Credentials;
use super::retry::TransportFailure;

/// WebDAV server configuration
#[derive(Debug, Clone)]
pub struct WebDAVConfig {
    pub server_url: String,
    pub credentials: Credentials,
    pub server_type: Option<String>, // "nextcloud", "owncloud", "generic"
    pub connect_timeout_seconds: u64,
    pub read_timeout_seconds: u64,
}

/// Retry configuration for WebDAV operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    /// Transport failures worth another attempt. HTTP status errors are
    /// never retried.
    pub retry_on: Vec<TransportFailure>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 10_000, // 10 seconds
            max_delay_ms: 600_000,    // 10 minutes
            backoff_multiplier: 2.0,
            retry_on: vec![TransportFailure::Connect, TransportFailure::ConnectionLost],
        }
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms.min(self.max_delay_ms))
    }

    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.backoff_multiplier) as u64;
        Duration::from_millis(next_ms.min(self.max_delay_ms))
    }

    /// Sleeps taken between consecutive attempts when every attempt fails
    pub fn delay_schedule(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial_delay();
        for _ in 1..self.max_attempts.max(1) {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }

    pub fn should_retry(&self, failure: Option<TransportFailure>) -> bool {
        failure.map_or(false, |failure| self.retry_on.contains(&failure))
    }
}

impl WebDAVConfig {
    /// Creates a new Nextcloud configuration with the default timeouts
    pub fn new(server_url: String, username: String, password: String) -> Self {
        Self {
            server_url,
            credentials: Credentials::new(username, password),
            server_type: Some("nextcloud".to_string()),
            connect_timeout_seconds: 1,
            read_timeout_seconds: 10,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), UploadError> {
        let invalid = |details: &str| UploadError::InvalidConfig {
            details: details.to_string(),
        };

        if self.server_url.is_empty() {
            return Err(invalid("Server URL cannot be empty"));
        }

        if self.credentials.username.is_empty() {
            return Err(invalid("Username cannot be empty"));
        }

        if self.credentials.password.is_empty() {
            return Err(invalid("Password cannot be empty"));
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(invalid("Server URL must start with http:// or https://"));
        }

        Ok(())
    }

    /// Returns the base URL for WebDAV operations
    pub fn webdav_url(&self) -> String {
        let mut url = self.server_url.trim_end_matches('/').to_string();

        match self.server_type.as_deref() {
            Some("nextcloud") => {
                if !url.contains("/remote.php/dav/files/") {
                    url.push_str(&format!(
                        "/remote.php/dav/files/{}",
                        urlencoding::encode(&self.credentials.username)
                    ));
                }
            }
            Some("owncloud") => {
                if !url.contains("/remote.php/webdav") {
                    url.push_str("/remote.php/webdav");
                }
            }
            _ => {
                // Generic WebDAV - use the URL as provided
            }
        }

        url
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_seconds)
    }
}
