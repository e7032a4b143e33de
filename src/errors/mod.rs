pub mod upload;

pub use upload::UploadError;
