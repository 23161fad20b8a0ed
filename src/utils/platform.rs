//! Platform-specific directory lookups for Tikloader
//!
//! - Downloads: ~/Downloads/tikloader
//! - Config: platform config dir + `tikloader/config.toml`
//! - yt-dlp: bundled next to the executable, PATH, or common install paths

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Returns the default download directory
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| {
            warn!("Could not determine Downloads directory, using ./downloads");
            PathBuf::from("./downloads")
        })
        .join("tikloader")
}

/// Returns the configuration directory
/// - macOS: ~/Library/Application Support/tikloader
/// - Windows: %APPDATA%\tikloader
/// - Linux: ~/.config/tikloader
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tikloader")
}

/// Default config file location
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Find yt-dlp binary with priority:
/// 1. Next to the current executable
/// 2. System PATH
/// 3. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(adjacent) = find_adjacent_ytdlp() {
        debug!("Using bundled yt-dlp: {:?}", adjacent);
        return Some(adjacent);
    }

    if let Ok(path) = which::which("yt-dlp") {
        debug!("Using system yt-dlp: {:?}", path);
        return Some(path);
    }

    if let Some(common) = find_in_common_paths() {
        debug!("Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("yt-dlp not found anywhere!");
    None
}

fn find_adjacent_ytdlp() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;
    let binary_name = if cfg!(target_os = "windows") {
        "yt-dlp.exe"
    } else {
        "yt-dlp"
    };
    let adjacent = exe_dir.join(binary_name);
    is_executable(&adjacent).then_some(adjacent)
}

fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // macOS Homebrew (Intel)
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        "~/.local/bin/yt-dlp",
    ];

    common_paths.iter().find_map(|path_str| {
        let expanded = match path_str.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()?.join(rest),
            None => PathBuf::from(path_str),
        };
        is_executable(&expanded).then_some(expanded)
    })
}

/// Check if a file exists and is executable
pub fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        true
    }
}
