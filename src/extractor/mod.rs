pub mod fetcher;
pub mod models;
pub mod tiktok;
pub mod traits;
pub mod video_id;

pub use fetcher::fetch_metadata;
pub use models::VideoMetadata;
pub use tiktok::TikTokWebClient;
pub use traits::{ScrapingClient, SessionAuth};
pub use video_id::{extract_video_id, placeholder_video_url};
