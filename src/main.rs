//! Tikloader - TikTok video collector
//!
//! Resolves TikTok URLs, fetches per-video metadata and downloads the media
//! with yt-dlp.

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tikloader::{AppSettings, TikTokCollector, TikloaderError, VideoMetadata};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "tikloader", version, about = "Download TikTok videos with metadata")]
#[command(group(ArgGroup::new("input").required(true).args(["urls", "url_list"])))]
struct Args {
    /// Path to a text file containing TikTok URLs, one per line
    #[arg(short = 'u', long)]
    urls: Option<PathBuf>,

    /// List of TikTok URLs
    #[arg(short = 'l', long, num_args = 1..)]
    url_list: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the download directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write metadata of downloaded videos to this JSON file
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(short = 'v', long, default_value = "info")]
    log_level: tracing::Level,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let mut settings = AppSettings::load(args.config.as_deref())?;
    if let Some(dir) = args.output_dir {
        settings.download_location = dir;
    }

    let urls = match &args.urls {
        Some(path) => read_urls_from_file(path).await?,
        None => args.url_list,
    };
    if urls.is_empty() {
        bail!("No TikTok URLs provided");
    }

    let mut collector = match TikTokCollector::from_settings(&settings) {
        Ok(collector) => collector,
        Err(TikloaderError::YtDlpNotFound) => {
            print_ytdlp_install_hint();
            bail!(TikloaderError::YtDlpNotFound);
        }
        Err(e) => return Err(e.into()),
    };
    collector.file_manager().create_directory_structure()?;
    info!(
        "Saving videos under {}",
        collector.file_manager().base_dir().display()
    );

    info!("Downloading {} TikTok videos...", urls.len());
    let report = collector.collect(&urls).await?;

    for (url, reason) in report.skipped() {
        warn!("Skipped {}: {:?}", url, reason);
    }

    if let Err(e) = collector.file_manager().cleanup_temp_files() {
        warn!("Failed to clean temporary files: {}", e);
    }

    let videos: Vec<VideoMetadata> = report.into_videos();
    if videos.is_empty() {
        error!("Failed to download any videos");
        return Ok(ExitCode::FAILURE);
    }

    if let Some(path) = &args.manifest {
        write_manifest(path, &videos).await?;
        info!("Wrote manifest for {} videos to {:?}", videos.len(), path);
    }

    info!("Successfully downloaded {} videos", videos.len());
    Ok(ExitCode::SUCCESS)
}

async fn read_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading URLs from {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    info!("Read {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

async fn write_manifest(path: &Path, videos: &[VideoMetadata]) -> Result<()> {
    let manifest = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "videos": videos,
    });
    let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Writing manifest {}", path.display()))
}

fn print_ytdlp_install_hint() {
    eprintln!("yt-dlp not found in common locations");
    eprintln!("Please install yt-dlp:");
    eprintln!("  pip install yt-dlp");
    eprintln!("  or: brew install yt-dlp");
    eprintln!("  or visit: https://github.com/yt-dlp/yt-dlp");
    eprintln!("You can also set [ytdlp] path in the config file");
}
