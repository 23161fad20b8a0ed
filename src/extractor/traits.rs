use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Authentication artifacts for a scraping session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionAuth {
    /// `msToken` cookie value
    pub ms_token: Option<String>,
    /// `sessionid` cookie value of a logged-in account
    pub session_id: Option<String>,
}

impl SessionAuth {
    /// `Cookie` header value for the configured artifacts, if any
    pub fn cookie_header(&self) -> Option<String> {
        let pairs: Vec<String> = [("msToken", &self.ms_token), ("sessionid", &self.session_id)]
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{}={}", name, v))
            })
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

/// Session-based client that returns TikTok item records
///
/// The collector opens the session once per batch and always closes it
/// before returning.
#[async_trait]
pub trait ScrapingClient: Send + Sync {
    /// Start a session with the given authentication
    async fn open(&mut self, auth: &SessionAuth) -> Result<()>;

    /// Tear down the session. Closing a closed session is a no-op.
    async fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Item record for the video at `url`, or `None` when the service returned nothing
    async fn video_info(&self, url: &str) -> Result<Option<Value>>;
}
