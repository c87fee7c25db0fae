//! YouTube search via yt-dlp.

use super::{watch_url, VideoCandidate, VideoSearch, MAX_CANDIDATES};
use crate::error::{Result, TubedeckError};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Searches YouTube through yt-dlp's `ytsearchN:` pseudo-URL.
pub struct YoutubeSearch {
    yt_dlp_path: String,
}

impl YoutubeSearch {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    /// Use a specific yt-dlp binary.
    pub fn with_binary(path: &str) -> Self {
        Self {
            yt_dlp_path: path.to_string(),
        }
    }
}

impl Default for YoutubeSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoSearch for YoutubeSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoCandidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(TubedeckError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let limit = limit.clamp(1, MAX_CANDIDATES);
        let search_url = format!("ytsearch{}:{}", limit, query);

        let output = tokio::process::Command::new(&self.yt_dlp_path)
            .args([
                "--dump-json",
                "--flat-playlist",
                "--no-download",
                "--no-warnings",
                &search_url,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TubedeckError::ToolNotFound("yt-dlp".to_string())
                } else {
                    TubedeckError::Search(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubedeckError::Search(format!(
                "yt-dlp search failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let candidates = parse_search_output(&stdout, limit);
        debug!("Search returned {} candidates", candidates.len());

        Ok(candidates)
    }
}

/// Parse yt-dlp `--dump-json --flat-playlist` output (one JSON object per line).
///
/// Lines that are not JSON or lack an id or title are skipped.
pub(crate) fn parse_search_output(stdout: &str, limit: usize) -> Vec<VideoCandidate> {
    let mut candidates = Vec::new();

    for line in stdout.lines() {
        if candidates.len() >= limit.min(MAX_CANDIDATES) {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let Ok(json) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };

        let Some(id) = json["id"].as_str().filter(|s| !s.is_empty()) else {
            continue;
        };

        let Some(title) = json["title"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            continue;
        };

        candidates.push(VideoCandidate {
            id: id.to_string(),
            title: title.to_string(),
            url: watch_url(id),
            channel: json["channel"]
                .as_str()
                .or_else(|| json["uploader"].as_str())
                .map(|s| s.to_string()),
            duration_seconds: json["duration"].as_f64().map(|d| d as u32),
        });
    }

    candidates
}
