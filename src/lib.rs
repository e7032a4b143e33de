pub mod config;
pub mod errors;
pub mod models;
pub mod services;

pub use config::Config;
pub use errors::UploadError;
