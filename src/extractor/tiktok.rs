//! TikTok web client
//!
//! Reads the item record embedded in a video's web page. Two page layouts are
//! understood:
//! - `__UNIVERSAL_DATA_FOR_REHYDRATION__` (current)
//! - `SIGI_STATE` (legacy)

use crate::extractor::traits::{ScrapingClient, SessionAuth};
use crate::extractor::video_id::extract_video_id;
use crate::utils::error::{Result, TikloaderError};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE, REFERER, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

/// Desktop Chromium identity presented for every session
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const TIKTOK_REFERER: &str = "https://www.tiktok.com/";

static REHYDRATION_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]*id="__UNIVERSAL_DATA_FOR_REHYDRATION__"[^>]*>(.*?)</script>"#)
        .expect("rehydration pattern must compile")
});

static SIGI_STATE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]*id="SIGI_STATE"[^>]*>(.*?)</script>"#)
        .expect("SIGI_STATE pattern must compile")
});

// Also matches the author-less placeholder URL
static VIDEO_PATH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/video/(\d+)").expect("video path pattern must compile")
});

pub struct TikTokWebClient {
    client: Option<Client>,
    timeout: Option<Duration>,
}

impl Default for TikTokWebClient {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TikTokWebClient {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            client: None,
            timeout,
        }
    }

    fn default_headers(auth: &SessionAuth) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static(TIKTOK_REFERER));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        if let Some(cookie) = auth.cookie_header() {
            let value = HeaderValue::from_str(&cookie).map_err(|e| {
                TikloaderError::Initialization(format!("invalid session cookie: {}", e))
            })?;
            headers.insert(COOKIE, value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl ScrapingClient for TikTokWebClient {
    async fn open(&mut self, auth: &SessionAuth) -> Result<()> {
        if self.client.is_some() {
            return Ok(());
        }

        info!(
            "Opening TikTok session (ms_token: {}, session_id: {})",
            auth.ms_token.is_some(),
            auth.session_id.is_some()
        );

        let mut builder = Client::builder().default_headers(Self::default_headers(auth)?);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| TikloaderError::Initialization(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.client.take().is_some() {
            debug!("TikTok session closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.client.is_some()
    }

    async fn video_info(&self, url: &str) -> Result<Option<Value>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| TikloaderError::Fetch("TikTok session not open".to_string()))?;

        debug!("Requesting video page: {}", url);
        let html = client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_item(&html, requested_video_id(url).as_deref())
    }
}

fn requested_video_id(url: &str) -> Option<String> {
    extract_video_id(url).or_else(|| {
        VIDEO_PATH_ID
            .captures(url)
            .map(|captures| captures[1].to_string())
    })
}

/// Pull the video item record out of a TikTok video page.
///
/// `Ok(None)` means the page carried no item (removed, private, or a captcha page).
/// Legacy pages may list related videos next to the requested one, so their
/// record is picked by `video_id`; without a match only a lone entry is taken.
pub fn extract_item(html: &str, video_id: Option<&str>) -> Result<Option<Value>> {
    if let Some(captures) = REHYDRATION_SCRIPT.captures(html) {
        let data: Value = serde_json::from_str(&captures[1])?;
        let item = data
            .pointer("/__DEFAULT_SCOPE__/webapp.video-detail/itemInfo/itemStruct")
            .filter(|item| !item.is_null())
            .cloned();
        if item.is_some() {
            return Ok(item);
        }
    }

    if let Some(captures) = SIGI_STATE_SCRIPT.captures(html) {
        let data: Value = serde_json::from_str(&captures[1])?;
        let Some(items) = data.get("ItemModule").and_then(Value::as_object) else {
            return Ok(None);
        };
        let item = match video_id.and_then(|id| items.get(id)) {
            Some(item) => Some(item),
            None if items.len() == 1 => items.values().next(),
            None => None,
        };
        return Ok(item.cloned());
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_item_from_rehydration_script() {
        let html = r#"<html><head>
            <script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">
            {"__DEFAULT_SCOPE__":{"webapp.video-detail":{"itemInfo":{"itemStruct":
                {"id":"123","desc":"hello","author":{"uniqueId":"user"}}}}}}
            </script></head></html>"#;

        let item = extract_item(html, None).unwrap().unwrap();
        assert_eq!(item["id"], "123");
        assert_eq!(item["author"]["uniqueId"], "user");
    }

    #[test]
    fn test_extract_item_from_sigi_state() {
        let html = r#"<script id="SIGI_STATE" type="application/json">
            {"ItemModule":{"456":{"id":"456","desc":"legacy"}}}</script>"#;

        let item = extract_item(html, None).unwrap().unwrap();
        assert_eq!(item["desc"], "legacy");
    }

    #[test]
    fn test_extract_item_sigi_state_picks_requested_video() {
        let html = r#"<script id="SIGI_STATE" type="application/json">
            {"ItemModule":{"111":{"id":"111","desc":"related"},
                           "222":{"id":"222","desc":"requested"}}}</script>"#;

        let item = extract_item(html, Some("222")).unwrap().unwrap();
        assert_eq!(item["id"], "222");

        // Several candidates and none requested: no guessing
        assert!(extract_item(html, None).unwrap().is_none());
        assert!(extract_item(html, Some("333")).unwrap().is_none());
    }

    #[test]
    fn test_requested_video_id() {
        assert_eq!(
            requested_video_id("https://www.tiktok.com/@user/video/222").as_deref(),
            Some("222")
        );
        assert_eq!(
            requested_video_id("https://www.tiktok.com/video/222").as_deref(),
            Some("222")
        );
        assert_eq!(requested_video_id("https://example.com/"), None);
    }

    #[test]
    fn test_extract_item_missing_detail() {
        let html = r#"<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__">
            {"__DEFAULT_SCOPE__":{"webapp.video-detail":{"statusCode":10204}}}</script>"#;
        assert!(extract_item(html, None).unwrap().is_none());
        assert!(extract_item("<html>captcha</html>", None).unwrap().is_none());
    }

    #[test]
    fn test_extract_item_malformed_json() {
        let html = r#"<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__">{oops</script>"#;
        assert!(matches!(
            extract_item(html, None),
            Err(TikloaderError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let mut client = TikTokWebClient::new(Some(Duration::from_secs(5)));
        assert!(!client.is_open());
        assert!(client.video_info("https://www.tiktok.com/video/1").await.is_err());

        client.open(&SessionAuth::default()).await.unwrap();
        assert!(client.is_open());

        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(!client.is_open());
    }

    #[tokio::test]
    async fn test_open_rejects_unencodable_cookie() {
        let mut client = TikTokWebClient::default();
        let auth = SessionAuth {
            ms_token: None,
            session_id: Some("bad\nvalue".to_string()),
        };
        assert!(matches!(
            client.open(&auth).await,
            Err(TikloaderError::Initialization(_))
        ));
        assert!(!client.is_open());
    }
}
