use std::path::Path;

use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client, Method, Response};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::errors::UploadError;
use crate::models::RemotePath;
use super::config::{RetryConfig, WebDAVConfig};
use super::retry::retry_with_backoff;

/// Upper bound on how much of an error response body ends up in the error
const MAX_ERROR_BODY_CHARS: usize = 500;

pub struct WebDAVConnection {
    client: Client,
    config: WebDAVConfig,
    retry_config: RetryConfig,
    base_url: String,
    mkcol: Method,
}

impl WebDAVConnection {
    pub fn new(config: WebDAVConfig, retry_config: RetryConfig) -> Result<Self, UploadError> {
        // Validate configuration first
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .build()
            .map_err(|e| UploadError::InvalidConfig {
                details: format!("Failed to build HTTP client: {}", e),
            })?;

        let mkcol = Method::from_bytes(b"MKCOL").map_err(|e| UploadError::InvalidConfig {
            details: format!("Unsupported HTTP method MKCOL: {}", e),
        })?;

        let base_url = config.webdav_url();

        Ok(Self {
            client,
            config,
            retry_config,
            base_url,
            mkcol,
        })
    }

    pub fn config(&self) -> &WebDAVConfig {
        &self.config
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Gets the WebDAV URL for a specific path
    pub fn get_url_for_path(&self, path: &RemotePath) -> String {
        if path.is_root() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path.to_url_path())
        }
    }

    /// `MKCOL` a single collection. The parent must already exist.
    pub async fn create_directory(&self, path: &RemotePath) -> Result<(), UploadError> {
        let url = self.get_url_for_path(path);
        let operation = format!("MKCOL {}", path);
        let url = url.as_str();

        retry_with_backoff(&self.retry_config, &operation, || async move {
            let response = self
                .client
                .request(self.mkcol.clone(), url)
                .basic_auth(
                    &self.config.credentials.username,
                    Some(&self.config.credentials.password),
                )
                .send()
                .await
                .map_err(|e| UploadError::transport("MKCOL", url, e))?;

            check_status("MKCOL", url, response).await
        })
        .await
    }

    /// Streams `local_file` to `target` with a single `PUT`, overwriting any
    /// existing resource. Returns the number of bytes sent.
    pub async fn put_file(&self, local_file: &Path, target: &RemotePath) -> Result<u64, UploadError> {
        let url = self.get_url_for_path(target);
        let operation = format!("PUT {}", target);
        let url = url.as_str();

        retry_with_backoff(&self.retry_config, &operation, || async move {
            // Reopened per attempt: a failed attempt may have consumed the stream
            let file = tokio::fs::File::open(local_file)
                .await
                .map_err(|e| UploadError::io(local_file, e))?;
            let length = file
                .metadata()
                .await
                .map_err(|e| UploadError::io(local_file, e))?
                .len();

            debug!("PUT {} ({} bytes) -> {}", local_file.display(), length, url);

            let response = self
                .client
                .put(url)
                .basic_auth(
                    &self.config.credentials.username,
                    Some(&self.config.credentials.password),
                )
                .header(CONTENT_LENGTH, length)
                .body(Body::wrap_stream(ReaderStream::new(file)))
                .send()
                .await
                .map_err(|e| UploadError::transport("PUT", url, e))?;

            check_status("PUT", url, response).await?;
            Ok(length)
        })
        .await
    }
}

async fn check_status(method: &str, url: &str, response: Response) -> Result<(), UploadError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();

    Err(UploadError::Http {
        method: method.to_string(),
        url: url.to_string(),
        status,
        body,
    })
}
