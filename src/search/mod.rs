//! Query resolution: free-text query to a short, ordered list of videos.

mod youtube;

pub use youtube::YoutubeSearch;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Hard cap on the number of candidates a search returns.
pub const MAX_CANDIDATES: usize = 5;

/// A search result the user can pick from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCandidate {
    /// YouTube video ID.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Playable watch URL.
    pub url: String,
    /// Channel name (if available).
    pub channel: Option<String>,
    /// Duration in seconds (if known).
    pub duration_seconds: Option<u32>,
}

impl VideoCandidate {
    /// Build a candidate with the canonical watch URL for `id`.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: watch_url(&id),
            id,
            title: title.into(),
            channel: None,
            duration_seconds: None,
        }
    }
}

/// Canonical watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Trait for video search providers.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Search for videos. Returns at most `min(limit, MAX_CANDIDATES)` results
    /// in relevance order; no matches is an empty list, not an error.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>>;
}
