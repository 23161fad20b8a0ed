//! yt-dlp wrapper for media downloads
//!
//! Every download runs in its own temporary directory. The finished file is
//! copied to the requested output path and the temporary directory is removed
//! whether or not the download succeeded.

use crate::downloader::MediaDownloader;
use crate::utils::config::YtDlpSettings;
use crate::utils::error::{Result, TikloaderError};
use crate::utils::platform;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, error, info, warn};

const TEMP_FILE_NAME: &str = "video.mp4";

/// Downloader that shells out to yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    ytdlp_path: PathBuf,
    format: String,
    cookies_from_browser: Option<String>,
    temp_root: Option<PathBuf>,
}

impl YtDlpDownloader {
    /// Initialize downloader and verify yt-dlp availability
    pub fn new(settings: &YtDlpSettings) -> Result<Self> {
        let ytdlp_path = match &settings.path {
            Some(path) if platform::is_executable(path) => path.clone(),
            Some(path) => {
                error!("Configured yt-dlp is not an executable file: {:?}", path);
                return Err(TikloaderError::YtDlpNotFound);
            }
            None => platform::find_ytdlp().ok_or(TikloaderError::YtDlpNotFound)?,
        };

        info!("Found yt-dlp at: {}", ytdlp_path.display());
        Ok(Self::with_binary(ytdlp_path, settings))
    }

    /// Use `ytdlp_path` as-is, without checking it
    pub fn with_binary(ytdlp_path: impl Into<PathBuf>, settings: &YtDlpSettings) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            format: settings.format.clone(),
            cookies_from_browser: settings.cookies_from_browser.clone(),
            temp_root: None,
        }
    }

    /// Create per-download scratch directories under `root` instead of the system temp dir
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    fn build_command(&self, url: &str, temp_output: &Path) -> Command {
        let mut cmd = Command::new(&self.ytdlp_path);
        cmd.arg("-f")
            .arg(&self.format)
            .arg("-o")
            .arg(temp_output)
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("--no-playlist")
            .arg("--no-progress");

        if let Some(browser) = &self.cookies_from_browser {
            cmd.arg("--cookies-from-browser").arg(browser);
        }

        cmd.arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }

    /// Blocking download; call from a blocking-capable thread
    fn download_blocking(&self, url: &str, output_path: &Path) -> Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("tikloader-");
        // Dropping the guard removes the directory on every return path
        let temp_dir = match &self.temp_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        let temp_output = temp_dir.path().join(TEMP_FILE_NAME);

        debug!("Running yt-dlp for {} into {:?}", url, temp_output);
        let output = self.build_command(url, &temp_output).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TikloaderError::Download(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if !temp_output.is_file() {
            return Err(TikloaderError::Download(format!(
                "yt-dlp produced no output file for {}",
                url
            )));
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&temp_output, output_path)?;

        if let Err(e) = temp_dir.close() {
            warn!("Error removing temporary directory: {}", e);
        }

        Ok(output_path.to_path_buf())
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    async fn download(&self, url: &str, output_path: &Path) -> Result<PathBuf> {
        let downloader = self.clone();
        let url = url.to_string();
        let output_path = output_path.to_path_buf();

        tokio::task::spawn_blocking(move || downloader.download_blocking(&url, &output_path))
            .await
            .map_err(|e| TikloaderError::Download(format!("download worker failed: {}", e)))?
    }
}
