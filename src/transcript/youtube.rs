//! YouTube caption retrieval via `yt-transcript-rs`.

use super::{Transcript, TranscriptError, TranscriptSegment, TranscriptSource};
use crate::error::{Result, TubedeckError};
use async_trait::async_trait;
use tracing::{debug, instrument};
use yt_transcript_rs::api::YouTubeTranscriptApi;

/// Fetches published or auto-generated captions from YouTube.
#[derive(Clone)]
pub struct YoutubeTranscriptSource {
    api: YouTubeTranscriptApi,
    preserve_formatting: bool,
}

impl YoutubeTranscriptSource {
    pub fn new() -> Result<Self> {
        let api = YouTubeTranscriptApi::new(None, None, None).map_err(|e| {
            TubedeckError::Config(format!("Failed to create transcript client: {}", e))
        })?;

        Ok(Self {
            api,
            preserve_formatting: false,
        })
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<Transcript, TranscriptError> {
        let languages: Vec<&str> = languages.iter().map(String::as_str).collect();

        let fetched = self
            .api
            .fetch_transcript(video_id, &languages, self.preserve_formatting)
            .await
            .map_err(|e| classify(&e.to_string()))?;

        debug!(
            "Got {} snippets in {} (generated: {})",
            fetched.snippets.len(),
            fetched.language_code,
            fetched.is_generated
        );

        Ok(Transcript {
            video_id: video_id.to_string(),
            language: fetched.language_code.clone(),
            segments: fetched
                .snippets
                .iter()
                .map(|s| TranscriptSegment {
                    text: s.text.trim().to_string(),
                    start_seconds: s.start,
                    duration_seconds: s.duration,
                })
                .collect(),
        })
    }
}

/// Sort a client error message into network trouble or a missing transcript.
fn classify(message: &str) -> TranscriptError {
    let lower = message.to_lowercase();
    let network = ["request failed", "connection", "timed out", "timeout", "dns", "network"]
        .iter()
        .any(|needle| lower.contains(needle));

    if network {
        TranscriptError::Network(message.to_string())
    } else {
        TranscriptError::Unavailable(message.to_string())
    }
}
