//! Google Translate speech endpoint, the service gTTS wraps.

use super::{require_text, split_for_speech, write_audio, AudioArtifact, Narrator};
use crate::error::{Result, TubedeckError};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// The endpoint refuses longer requests.
const MAX_PIECE_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

pub struct GoogleNarrator {
    http: reqwest::Client,
    endpoint: String,
    language: String,
}

impl GoogleNarrator {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TubedeckError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: TTS_URL.to_string(),
            language: "en".to_string(),
        })
    }

    fn query(&self, piece: &str, idx: usize, total: usize) -> Vec<(&'static str, String)> {
        vec![
            ("ie", "UTF-8".to_string()),
            ("q", piece.to_string()),
            ("tl", self.language.clone()),
            ("client", "tw-ob".to_string()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", piece.chars().count().to_string()),
        ]
    }

    async fn fetch_piece(&self, piece: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&self.query(piece, idx, total))
            .send()
            .await
            .map_err(|e| TubedeckError::Synthesis(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TubedeckError::Synthesis(format!(
                "speech endpoint returned {} for piece {}/{}",
                status,
                idx + 1,
                total
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TubedeckError::Synthesis(format!("Failed to read audio: {}", e)))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Narrator for GoogleNarrator {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn narrate(&self, text: &str, dest: &Path) -> Result<AudioArtifact> {
        require_text(text)?;

        let pieces = split_for_speech(text, MAX_PIECE_CHARS);
        debug!("Synthesizing {} pieces", pieces.len());

        // MP3 frames are self-delimiting, so the pieces play back-to-back when concatenated.
        let mut audio = Vec::new();
        for (idx, piece) in pieces.iter().enumerate() {
            audio.extend(self.fetch_piece(piece, idx, pieces.len()).await?);
        }

        write_audio(dest, &audio).await
    }
}
