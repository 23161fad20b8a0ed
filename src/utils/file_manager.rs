//! Local file layout for downloaded videos

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const VIDEO_EXTENSION: &str = "mp4";

/// Decides where each video lands on disk.
///
/// Layout:
/// ```text
/// <base_dir>/videos/<video_id>.mp4
/// <base_dir>/temp/
/// ```
#[derive(Debug, Clone)]
pub struct FileManager {
    base_dir: PathBuf,
}

impl FileManager {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.base_dir.join("videos")
    }

    /// Scratch space owned by the application
    pub fn temp_dir(&self) -> PathBuf {
        self.base_dir.join("temp")
    }

    /// Create the directory layout
    pub fn create_directory_structure(&self) -> Result<()> {
        for dir in [self.videos_dir(), self.temp_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Deterministic output path for a video ID
    pub fn get_download_path(&self, video_id: &str) -> PathBuf {
        let name = sanitize_filename(video_id);
        self.videos_dir().join(format!("{}.{}", name, VIDEO_EXTENSION))
    }

    /// Remove everything under the temp directory, keeping the directory itself
    pub fn cleanup_temp_files(&self) -> Result<()> {
        let temp_dir = self.temp_dir();
        if !temp_dir.exists() {
            return Ok(());
        }

        for entry in std::fs::read_dir(&temp_dir)? {
            let path = entry?.path();
            let removed = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            match removed {
                Ok(()) => debug!("Removed temp entry {:?}", path),
                Err(e) => warn!("Failed to remove temp entry {:?}: {}", path, e),
            }
        }
        Ok(())
    }
}

/// Sanitizes a filename by removing invalid characters and path traversal.
///
/// ```
/// use tikloader::utils::file_manager::sanitize_filename;
/// assert_eq!(sanitize_filename("../../etc/passwd"), "_etc_passwd");
/// assert_eq!(sanitize_filename("7234567890123456789"), "7234567890123456789");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

    let mut sanitized: String = name
        .replace("..", "")
        .chars()
        .map(|c| if invalid_chars.contains(&c) { '_' } else { c })
        .collect();

    sanitized = sanitized
        .trim()
        .trim_start_matches('.')
        .trim_end_matches('.')
        .trim_end()
        .to_string();

    while sanitized.contains("__") {
        sanitized = sanitized.replace("__", "_");
    }

    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }

    if sanitized.len() > 200 {
        let mut cut = 200;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
    }

    sanitized
}
