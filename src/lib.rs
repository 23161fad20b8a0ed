//! Tikloader library

pub mod collector;
pub mod downloader;
pub mod extractor;
pub mod utils;

// Re-export main types for easier use
pub use collector::{BatchReport, ItemOutcome, ItemStatus, SkipReason, TikTokCollector};
pub use downloader::{MediaDownloader, YtDlpDownloader};
pub use extractor::{ScrapingClient, SessionAuth, TikTokWebClient, VideoMetadata};
pub use utils::{AppSettings, FileManager, TikloaderError};
