//! Utility modules for error handling, configuration and file layout

pub mod config;
pub mod error;
pub mod file_manager;
pub mod platform;

// Re-export for convenience
pub use config::{AppSettings, TikTokSettings, YtDlpSettings};
pub use error::TikloaderError;
pub use file_manager::FileManager;
