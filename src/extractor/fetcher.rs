use crate::extractor::models::VideoMetadata;
use crate::extractor::traits::ScrapingClient;
use crate::extractor::video_id::placeholder_video_url;
use crate::utils::error::{Result, TikloaderError};
use serde_json::Value;
use tracing::{debug, error};

/// Fetch metadata for one video through an open scraping session.
///
/// Falls back to the placeholder URL when `original_url` is absent or blank.
/// Fails when the session is not open or the service returns an empty record.
pub async fn fetch_metadata<C>(
    client: &C,
    video_id: &str,
    original_url: Option<&str>,
) -> Result<VideoMetadata>
where
    C: ScrapingClient + ?Sized,
{
    if !client.is_open() {
        return Err(TikloaderError::Fetch("TikTok session not initialized".to_string()));
    }

    let url = original_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_video_url(video_id));

    debug!("Fetching metadata for {} via {}", video_id, url);

    let item = match client.video_info(&url).await {
        Ok(item) => item,
        Err(e) => {
            error!("Failed to get video info for {}: {}", video_id, e);
            return Err(e);
        }
    };

    match item {
        Some(item) if !is_empty_record(&item) => {
            Ok(VideoMetadata::from_item(video_id, Some(url), &item))
        }
        _ => Err(TikloaderError::Fetch(format!(
            "Failed to get video data for ID: {}",
            video_id
        ))),
    }
}

fn is_empty_record(item: &Value) -> bool {
    match item {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(values) => values.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::traits::SessionAuth;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubClient {
        open: bool,
        response: Option<Value>,
        fail: bool,
        requested: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn returning(response: Option<Value>) -> Self {
            Self {
                open: true,
                response,
                fail: false,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScrapingClient for StubClient {
        async fn open(&mut self, _auth: &SessionAuth) -> Result<()> {
            self.open = true;
            Ok(())
        }

        async fn close(&mut self) -> Result<()> {
            self.open = false;
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.open
        }

        async fn video_info(&self, url: &str) -> Result<Option<Value>> {
            self.requested.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(TikloaderError::Fetch("HTTP 403".to_string()));
            }
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_fetch_uses_original_url() {
        let client = StubClient::returning(Some(json!({ "desc": "hi" })));
        let url = "https://www.tiktok.com/@user/video/123";

        let meta = fetch_metadata(&client, "123", Some(url)).await.unwrap();

        assert_eq!(meta.id, "123");
        assert_eq!(meta.desc, "hi");
        assert_eq!(meta.url.as_deref(), Some(url));
        assert_eq!(client.requested.lock().unwrap().as_slice(), [url]);
    }

    #[tokio::test]
    async fn test_fetch_without_url_uses_placeholder() {
        let client = StubClient::returning(Some(json!({ "desc": "hi" })));

        let meta = fetch_metadata(&client, "123", None).await.unwrap();

        assert_eq!(meta.url.as_deref(), Some("https://www.tiktok.com/video/123"));
    }

    #[tokio::test]
    async fn test_fetch_empty_response_is_error() {
        for response in [None, Some(Value::Null), Some(json!({})), Some(json!(0))] {
            let client = StubClient::returning(response);
            let result = fetch_metadata(&client, "123", None).await;
            assert!(matches!(result, Err(TikloaderError::Fetch(_))));
        }
    }

    #[tokio::test]
    async fn test_fetch_requires_open_session() {
        let mut client = StubClient::returning(Some(json!({ "desc": "hi" })));
        client.open = false;

        let result = fetch_metadata(&client, "123", None).await;

        assert!(matches!(result, Err(TikloaderError::Fetch(_))));
        assert!(client.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_propagates_client_error() {
        let mut client = StubClient::returning(None);
        client.fail = true;

        let result = fetch_metadata(&client, "123", None).await;

        assert!(matches!(result, Err(TikloaderError::Fetch(msg)) if msg == "HTTP 403"));
    }
}
