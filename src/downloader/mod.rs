//! Media download backends

pub mod ytdlp;

pub use ytdlp::YtDlpDownloader;

use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Fetches the media behind a video URL into a local file
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Save the media at `url` to `output_path` and return the written path.
    ///
    /// Must not block the async executor.
    async fn download(&self, url: &str, output_path: &Path) -> Result<PathBuf>;
}
