//! Transcript retrieval.
//!
//! Sources report *why* a transcript could not be fetched through
//! [`TranscriptError`]. The pipeline does not see that detail:
//! [`TranscriptFetcher::fetch_text`] logs it and collapses every failure into
//! "no transcript", which the caller turns into a single user-facing message.

mod format;
mod video_id;
mod youtube;

pub use format::{format_transcript, TranscriptFormat};
pub use video_id::{extract_video_id, is_valid_video_id};
pub use youtube::YoutubeTranscriptSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// One captioned span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

/// A fetched transcript, segments in caption order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    /// Language code reported by the source (e.g. "en").
    pub language: String,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Plain text: every segment's text, in order, joined by a single space.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whitespace-delimited word count of the plain text.
    pub fn word_count(&self) -> usize {
        self.segments
            .iter()
            .map(|s| s.text.split_whitespace().count())
            .sum()
    }
}

/// Why a transcript could not be retrieved.
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("not a recognizable video URL or ID: {0}")]
    InvalidVideoId(String),

    #[error("no transcript available: {0}")]
    Unavailable(String),

    #[error("transcript service unreachable: {0}")]
    Network(String),

    #[error("transcript has no text")]
    Empty,
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for `video_id` in the first available language from `languages`.
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<Transcript, TranscriptError>;
}

/// Resolves user input to a video and fetches its transcript, flattening failures.
#[derive(Clone)]
pub struct TranscriptFetcher {
    source: Arc<dyn TranscriptSource>,
    languages: Vec<String>,
}

impl TranscriptFetcher {
    pub fn new(source: Arc<dyn TranscriptSource>, languages: Vec<String>) -> Self {
        Self { source, languages }
    }

    /// Fetch with the detailed failure reason.
    pub async fn fetch(&self, input: &str) -> std::result::Result<Transcript, TranscriptError> {
        let video_id = extract_video_id(input)
            .ok_or_else(|| TranscriptError::InvalidVideoId(input.trim().to_string()))?;

        let transcript = self.source.fetch(&video_id, &self.languages).await?;

        if transcript.segments.iter().all(|s| s.text.trim().is_empty()) {
            return Err(TranscriptError::Empty);
        }

        Ok(transcript)
    }

    /// Fetch, or `None` if there is no usable transcript for any reason.
    ///
    /// Never returns an error; the cause is only logged.
    #[instrument(skip(self))]
    pub async fn fetch_text(&self, input: &str) -> Option<Transcript> {
        match self.fetch(input).await {
            Ok(transcript) => {
                info!(
                    "Fetched transcript for {} ({} segments, {} words)",
                    transcript.video_id,
                    transcript.segments.len(),
                    transcript.word_count()
                );
                Some(transcript)
            }
            Err(e) => {
                warn!("Transcript unavailable for '{}': {}", input, e);
                None
            }
        }
    }
}
