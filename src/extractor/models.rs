//! Data structures for video metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Metadata for one TikTok video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub author: String,
    pub desc: String,
    /// Epoch seconds
    pub create_time: i64,
    pub duration: f64,
    pub height: u32,
    pub width: u32,
    pub cover: String,
    pub download_url: String,
    pub play_url: String,
    pub music_author: String,
    pub music_title: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub views: u64,
    /// Set only once the media file has been saved
    #[serde(default)]
    pub local_path: Option<PathBuf>,
    /// Source URL
    #[serde(default)]
    pub url: Option<String>,
}

impl VideoMetadata {
    /// Flatten a TikTok item record into metadata.
    ///
    /// Missing or mistyped keys become empty strings or zero.
    pub fn from_item(video_id: &str, url: Option<String>, item: &Value) -> Self {
        Self {
            id: video_id.to_string(),
            author: str_at(item, "/author/uniqueId"),
            desc: str_at(item, "/desc"),
            create_time: i64_at(item, "/createTime"),
            duration: f64_at(item, "/video/duration"),
            height: u32_at(item, "/video/height"),
            width: u32_at(item, "/video/width"),
            cover: str_at(item, "/video/cover"),
            download_url: str_at(item, "/video/downloadAddr"),
            play_url: str_at(item, "/video/playAddr"),
            music_author: str_at(item, "/music/authorName"),
            music_title: str_at(item, "/music/title"),
            likes: u64_at(item, "/stats/diggCount"),
            shares: u64_at(item, "/stats/shareCount"),
            comments: u64_at(item, "/stats/commentCount"),
            views: u64_at(item, "/stats/playCount"),
            local_path: None,
            url,
        }
    }

    /// Creation time as a timestamp, if `create_time` is set and in range
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if self.create_time <= 0 {
            return None;
        }
        DateTime::from_timestamp(self.create_time, 0)
    }

    pub fn is_downloaded(&self) -> bool {
        self.local_path.is_some()
    }
}

fn str_at(item: &Value, pointer: &str) -> String {
    item.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// TikTok sends some numbers as strings ("createTime": "1700000000").
fn number_at(item: &Value, pointer: &str) -> Option<f64> {
    match item.pointer(pointer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn f64_at(item: &Value, pointer: &str) -> f64 {
    number_at(item, pointer)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn i64_at(item: &Value, pointer: &str) -> i64 {
    match item.pointer(pointer) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or_else(|| f64_at(item, pointer) as i64),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| f64_at(item, pointer) as i64),
        _ => 0,
    }
}

fn u64_at(item: &Value, pointer: &str) -> u64 {
    match item.pointer(pointer) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_else(|| f64_at(item, pointer).max(0.0) as u64),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .unwrap_or_else(|_| f64_at(item, pointer).max(0.0) as u64),
        _ => 0,
    }
}

fn u32_at(item: &Value, pointer: &str) -> u32 {
    u32::try_from(u64_at(item, pointer)).unwrap_or(u32::MAX)
}
