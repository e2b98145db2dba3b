pub mod config;
pub mod error;
pub mod fsutil;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, CachePaths};
pub use error::NavigatorError;
pub type Result<T> = std::result::Result<T, NavigatorError>;
