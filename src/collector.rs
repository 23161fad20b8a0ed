//! Batch collector: URL list in, downloaded videos out
//!
//! For each batch the collector opens the scraping session, resolves URLs to
//! video IDs, fetches metadata and downloads each video in input order, then
//! closes the session on every exit path. One item failing never stops the
//! rest of the batch.

use crate::downloader::{MediaDownloader, YtDlpDownloader};
use crate::extractor::{
    extract_video_id, fetch_metadata, placeholder_video_url, ScrapingClient, SessionAuth,
    TikTokWebClient, VideoMetadata,
};
use crate::utils::config::AppSettings;
use crate::utils::error::{Result, TikloaderError};
use crate::utils::FileManager;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Why a URL produced no video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnrecognizedUrl,
    /// Same URL appeared earlier in the batch
    Duplicate,
    FetchFailed(String),
    DownloadFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    Downloaded(VideoMetadata),
    Skipped(SkipReason),
}

/// Result for one input URL
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    /// Input URL with surrounding whitespace removed
    pub url: String,
    pub video_id: Option<String>,
    pub status: ItemStatus,
}

/// Per-URL results of a batch, in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Successfully downloaded videos, in input order
    pub fn videos(&self) -> impl Iterator<Item = &VideoMetadata> {
        self.items.iter().filter_map(|item| match &item.status {
            ItemStatus::Downloaded(metadata) => Some(metadata),
            ItemStatus::Skipped(_) => None,
        })
    }

    pub fn into_videos(self) -> Vec<VideoMetadata> {
        self.items
            .into_iter()
            .filter_map(|item| match item.status {
                ItemStatus::Downloaded(metadata) => Some(metadata),
                ItemStatus::Skipped(_) => None,
            })
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.items.iter().filter_map(|item| match &item.status {
            ItemStatus::Skipped(reason) => Some((item.url.as_str(), reason)),
            ItemStatus::Downloaded(_) => None,
        })
    }

    pub fn downloaded_count(&self) -> usize {
        self.videos().count()
    }
}

/// Collects TikTok videos through a scraping session and a media downloader
pub struct TikTokCollector<C, D> {
    client: C,
    downloader: D,
    file_manager: FileManager,
    auth: SessionAuth,
}

impl TikTokCollector<TikTokWebClient, YtDlpDownloader> {
    /// Build the production collector: TikTok web client plus yt-dlp
    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        let client = TikTokWebClient::new(
            settings
                .tiktok
                .request_timeout_secs
                .map(Duration::from_secs),
        );
        let file_manager = FileManager::new(&settings.download_location);
        let downloader =
            YtDlpDownloader::new(&settings.ytdlp)?.with_temp_root(file_manager.temp_dir());
        let auth = SessionAuth {
            ms_token: settings.tiktok.ms_token.clone(),
            session_id: settings.tiktok.session_id.clone(),
        };

        Ok(Self::new(client, downloader, file_manager, auth))
    }
}

impl<C, D> TikTokCollector<C, D>
where
    C: ScrapingClient,
    D: MediaDownloader,
{
    pub fn new(client: C, downloader: D, file_manager: FileManager, auth: SessionAuth) -> Self {
        Self {
            client,
            downloader,
            file_manager,
            auth,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn file_manager(&self) -> &FileManager {
        &self.file_manager
    }

    /// Download every recognised URL and return the videos that made it to disk.
    ///
    /// Only a session that cannot be opened is an error; everything else
    /// shortens the returned list.
    pub async fn download_videos<S: AsRef<str>>(
        &mut self,
        urls: &[S],
    ) -> Result<Vec<VideoMetadata>> {
        Ok(self.collect(urls).await?.into_videos())
    }

    /// Like [`download_videos`](Self::download_videos) but reports every URL's outcome.
    pub async fn collect<S: AsRef<str>>(&mut self, urls: &[S]) -> Result<BatchReport> {
        self.acquire().await?;

        let urls: Vec<String> = urls
            .iter()
            .map(|url| url.as_ref().trim().to_string())
            .collect();
        let outcome = AssertUnwindSafe(self.process(&urls)).catch_unwind().await;

        self.cleanup().await;

        match outcome {
            Ok(report) => {
                info!(
                    "Successfully downloaded {} of {} videos",
                    report.downloaded_count(),
                    urls.len()
                );
                Ok(report)
            }
            Err(panic) => {
                let err = TikloaderError::Unexpected(panic_message(panic.as_ref()));
                error!("Error downloading videos: {}", err);
                Ok(BatchReport::default())
            }
        }
    }

    /// Close the scraping session if it is open
    pub async fn cleanup(&mut self) {
        if !self.client.is_open() {
            return;
        }
        match self.client.close().await {
            Ok(()) => debug!("TikTok session cleaned up"),
            Err(e) => error!("Error during TikTok session cleanup: {}", e),
        }
    }

    /// Download one video and record its local path.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn download_video(&self, metadata: &mut VideoMetadata) -> Option<PathBuf> {
        match self.try_download(metadata).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Failed to download video {}: {}", metadata.id, e);
                None
            }
        }
    }

    async fn acquire(&mut self) -> Result<()> {
        if self.client.is_open() {
            return Ok(());
        }

        info!("Initializing TikTok session");
        if let Err(e) = self.client.open(&self.auth).await {
            error!("Error initializing TikTok session: {}", e);
            self.cleanup().await;
            return Err(match e {
                TikloaderError::Initialization(_) => e,
                other => TikloaderError::Initialization(other.to_string()),
            });
        }
        Ok(())
    }

    async fn process(&self, urls: &[String]) -> BatchReport {
        let mut seen = HashSet::new();
        let resolved: Vec<(&String, Option<String>, bool)> = urls
            .iter()
            .map(|url| {
                let video_id = extract_video_id(url);
                if video_id.is_none() {
                    warn!("{}", TikloaderError::ExtractionMiss(url.clone()));
                }
                let first = seen.insert(url.as_str());
                (url, video_id, first)
            })
            .collect();

        let id_count = resolved
            .iter()
            .filter(|(_, id, first)| id.is_some() && *first)
            .count();
        if id_count == 0 {
            error!("No valid TikTok URLs provided");
        } else {
            info!("Extracted {} video IDs from {} URLs", id_count, urls.len());
        }

        let mut report = BatchReport::default();
        for (url, video_id, first) in resolved {
            let status = match &video_id {
                None => ItemStatus::Skipped(SkipReason::UnrecognizedUrl),
                Some(_) if !first => {
                    debug!("Skipping repeated URL: {}", url);
                    ItemStatus::Skipped(SkipReason::Duplicate)
                }
                Some(id) => self.process_item(url, id).await,
            };
            report.items.push(ItemOutcome {
                url: url.clone(),
                video_id,
                status,
            });
        }
        report
    }

    async fn process_item(&self, url: &str, video_id: &str) -> ItemStatus {
        let mut metadata = match fetch_metadata(&self.client, video_id, Some(url)).await {
            Ok(metadata) => metadata,
            Err(e) => {
                error!("Skipping {}: {}", url, e);
                return ItemStatus::Skipped(SkipReason::FetchFailed(e.to_string()));
            }
        };

        match self.try_download(&mut metadata).await {
            Ok(_) => ItemStatus::Downloaded(metadata),
            Err(e) => {
                error!("Failed to download video {}: {}", video_id, e);
                ItemStatus::Skipped(SkipReason::DownloadFailed(e.to_string()))
            }
        }
    }

    async fn try_download(&self, metadata: &mut VideoMetadata) -> Result<PathBuf> {
        info!("Downloading video {} by @{}", metadata.id, metadata.author);

        let output_path = self.file_manager.get_download_path(&metadata.id);
        let url = metadata
            .url
            .clone()
            .unwrap_or_else(|| placeholder_video_url(&metadata.id));

        let path = self.downloader.download(&url, &output_path).await?;
        if !path.is_file() {
            return Err(TikloaderError::Download(format!(
                "downloader reported success but {:?} is missing",
                path
            )));
        }

        info!("Video {} downloaded to {:?}", metadata.id, path);
        metadata.local_path = Some(path.clone());
        Ok(path)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic while processing batch".to_string()
    }
}
