//! Error handling for Tikloader

use thiserror::Error;

/// Main error type for Tikloader
#[derive(Debug, Error)]
pub enum TikloaderError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Failed to initialize TikTok session: {0}")]
    Initialization(String),

    #[error("Could not extract video ID from URL: {0}")]
    ExtractionMiss(String),

    #[error("Failed to fetch video metadata: {0}")]
    Fetch(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TikloaderError>;
