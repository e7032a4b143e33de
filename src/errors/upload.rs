use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::services::webdav::retry::{RetryClassify, TransportFailure};

/// Errors raised while mirroring a local tree onto a WebDAV server
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Local path does not exist: {}", .path.display())]
    LocalRootNotFound { path: PathBuf },

    #[error("Local path is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk local directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{method} {url} failed ({failure}): {source}")]
    Transport {
        method: String,
        url: String,
        failure: TransportFailure,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}: {body}")]
    Http {
        method: String,
        url: String,
        status: StatusCode,
        body: String,
    },
}

impl UploadError {
    /// HTTP status of a definitive server response, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UploadError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// MKCOL answers 405 for an existing collection; 409 is the conflict
    /// class some servers use for the same situation.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self.status(),
            Some(status) if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::CONFLICT
        )
    }

    pub(crate) fn transport(method: &str, url: &str, source: reqwest::Error) -> Self {
        UploadError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            failure: TransportFailure::from_reqwest(&source),
            source,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UploadError::Io {
            path: path.into(),
            source,
        }
    }
}

impl RetryClassify for UploadError {
    fn transport_failure(&self) -> Option<TransportFailure> {
        match self {
            UploadError::Transport { failure, .. } => Some(*failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: StatusCode) -> UploadError {
        UploadError::Http {
            method: "MKCOL".to_string(),
            url: "https://cloud.example.com/remote.php/dav/files/alice/backup".to_string(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_already_exists_class() {
        assert!(http_error(StatusCode::METHOD_NOT_ALLOWED).is_already_exists());
        assert!(http_error(StatusCode::CONFLICT).is_already_exists());
        assert!(!http_error(StatusCode::FORBIDDEN).is_already_exists());
        assert!(!http_error(StatusCode::UNAUTHORIZED).is_already_exists());
        assert!(!UploadError::InvalidConfig { details: "x".into() }.is_already_exists());
    }

    #[test]
    fn test_http_errors_are_never_transport_failures() {
        assert_eq!(http_error(StatusCode::SERVICE_UNAVAILABLE).transport_failure(), None);
        let io = UploadError::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(io.transport_failure(), None);
    }
}
