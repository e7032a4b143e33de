// Re-export all model types for ease of use

pub mod credentials;
pub mod remote_path;
pub mod sync;

// Re-export commonly used types
pub use credentials::*;
pub use remote_path::*;
pub use sync::*;
