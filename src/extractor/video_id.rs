//! Video ID extraction from TikTok URLs

use regex::Regex;
use std::sync::LazyLock;

/// Known TikTok URL shapes, in priority order.
///
/// The first pattern that matches wins, even if a later one would capture more.
static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // https://www.tiktok.com/@user/video/7234567890123456789
        r"https?://(?:www\.)?tiktok\.com/@[\w.-]+/video/(\d+)",
        // https://m.tiktok.com/v/7234567890123456789
        r"https?://(?:m\.)?tiktok\.com/v/(\d+)",
        // https://vm.tiktok.com/ZMabc123/
        r"https?://(?:vm|vt)\.tiktok\.com/(\w+)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("video ID pattern must compile"))
    .collect()
});

/// Extract the video ID embedded in a TikTok URL.
///
/// Returns `None` when the string matches none of the known URL shapes.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

/// Generic URL for a video when the real per-author URL is unknown.
///
/// Only meant to satisfy calls that need some URL for the ID.
pub fn placeholder_video_url(video_id: &str) -> String {
    format!("https://www.tiktok.com/video/{}", video_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_profile_video_url() {
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@user/video/123"),
            Some("123".to_string())
        );
        assert_eq!(
            extract_video_id("https://tiktok.com/@some.one-x/video/7234567890123456789?lang=en"),
            Some("7234567890123456789".to_string())
        );
    }

    #[test]
    fn test_mobile_short_url() {
        assert_eq!(
            extract_video_id("https://m.tiktok.com/v/6800111222333.html"),
            Some("6800111222333".to_string())
        );
    }

    #[test]
    fn test_shortened_redirect_url() {
        assert_eq!(
            extract_video_id("https://vm.tiktok.com/ZMabc123/"),
            Some("ZMabc123".to_string())
        );
        assert_eq!(
            extract_video_id("http://vt.tiktok.com/ZSxyz_9"),
            Some("ZSxyz_9".to_string())
        );
    }

    #[test]
    fn test_non_matching_strings() {
        assert_eq!(extract_video_id("not a url"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=abc"), None);
        assert_eq!(extract_video_id("https://www.tiktok.com/@user"), None);
        assert_eq!(extract_video_id("https://www.tiktok.com/@user/video/"), None);
    }

    #[test]
    fn test_first_pattern_wins() {
        // Both the profile and the short-link shape appear; the profile pattern is tried first.
        let url = "https://vm.tiktok.com/ZMshort https://www.tiktok.com/@user/video/42";
        assert_eq!(extract_video_id(url), Some("42".to_string()));
    }

    #[test]
    fn test_placeholder_url() {
        let url = placeholder_video_url("123");
        assert_eq!(url, "https://www.tiktok.com/video/123");
        // The placeholder is not a per-author URL
        assert_eq!(extract_video_id(&url), None);
    }

    proptest! {
        #[test]
        fn prop_profile_urls_yield_embedded_id(
            user in "[a-zA-Z0-9_.-]{1,24}",
            id in "[0-9]{1,19}",
        ) {
            let url = format!("https://www.tiktok.com/@{}/video/{}", user, id);
            prop_assert_eq!(extract_video_id(&url), Some(id));
        }

        #[test]
        fn prop_short_urls_yield_embedded_id(
            host in prop::sample::select(vec!["vm", "vt"]),
            code in "[a-zA-Z0-9_]{1,16}",
        ) {
            let url = format!("https://{}.tiktok.com/{}", host, code);
            prop_assert_eq!(extract_video_id(&url), Some(code));
        }

        #[test]
        fn prop_extraction_is_idempotent(input in ".*") {
            prop_assert_eq!(extract_video_id(&input), extract_video_id(&input));
        }

        #[test]
        fn prop_strings_without_tiktok_never_match(input in "[^k]*") {
            prop_assert_eq!(extract_video_id(&input), None);
        }
    }
}
