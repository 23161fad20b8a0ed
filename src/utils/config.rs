//! Application configuration

use crate::utils::platform;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MS_TOKEN_ENV: &str = "TIKTOK_MS_TOKEN";
pub const SESSION_ID_ENV: &str = "TIKTOK_SESSION_ID";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Where finished videos are placed
    pub download_location: PathBuf,

    /// TikTok session settings
    pub tiktok: TikTokSettings,

    /// yt-dlp invocation settings
    pub ytdlp: YtDlpSettings,
}

/// Authentication artifacts and HTTP settings for the scraping session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TikTokSettings {
    pub ms_token: Option<String>,
    pub session_id: Option<String>,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YtDlpSettings {
    /// Explicit binary path, otherwise looked up on the system
    pub path: Option<PathBuf>,

    /// Browser whose cookie store yt-dlp reads; `None` disables it
    pub cookies_from_browser: Option<String>,

    /// yt-dlp format selector
    pub format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            download_location: platform::default_download_dir(),
            tiktok: TikTokSettings::default(),
            ytdlp: YtDlpSettings::default(),
        }
    }
}

impl Default for YtDlpSettings {
    fn default() -> Self {
        Self {
            path: None,
            cookies_from_browser: Some("chrome".to_string()),
            format: "best".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from `path`, or from the default config file when none is given.
    ///
    /// An explicit path must exist; the default file is optional.
    /// Environment variables override the session tokens from the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = platform::config_file();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    debug!("No config file at {:?}, using defaults", default_path);
                    Self::default()
                }
            }
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Parsing config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(token) = non_blank(MS_TOKEN_ENV) {
            self.tiktok.ms_token = Some(token);
        }
        if let Some(session_id) = non_blank(SESSION_ID_ENV) {
            self.tiktok.session_id = Some(session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppSettings::default();
        assert!(config.tiktok.ms_token.is_none());
        assert_eq!(config.ytdlp.format, "best");
        assert_eq!(config.ytdlp.cookies_from_browser.as_deref(), Some("chrome"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppSettings::from_toml(
            r#"
            download_location = "/srv/clips"

            [tiktok]
            session_id = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.download_location, PathBuf::from("/srv/clips"));
        assert_eq!(config.tiktok.session_id.as_deref(), Some("abc"));
        assert!(config.tiktok.ms_token.is_none());
        assert_eq!(config.ytdlp.format, "best");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(AppSettings::from_toml("download_location = [").is_err());
    }

    #[test]
    fn test_env_overrides_skip_blank_values() {
        let mut config = AppSettings::default();
        config.tiktok.session_id = Some("from-file".to_string());

        let vars: HashMap<&str, &str> =
            HashMap::from([(MS_TOKEN_ENV, " token "), (SESSION_ID_ENV, "   ")]);
        config.apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.tiktok.ms_token.as_deref(), Some("token"));
        assert_eq!(config.tiktok.session_id.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppSettings::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
