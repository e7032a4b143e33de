// WebDAV upload modules organized by functionality

pub mod config;
pub mod connection;
pub mod retry;
pub mod uploader;

// Re-export main types for convenience
pub use config::{WebDAVConfig, RetryConfig};
pub use connection::WebDAVConnection;
pub use retry::{retry_with_backoff, RetryClassify, TransportFailure};
pub use uploader::WebDAVUploader;

// Test modules
#[cfg(test)]
mod retry_tests;
