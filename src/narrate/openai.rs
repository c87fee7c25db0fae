//! OpenAI speech synthesis.

use super::{require_text, split_for_speech, write_audio, AudioArtifact, Narrator};
use crate::error::{Result, TubedeckError};
use crate::openai::create_client;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument};

/// The speech endpoint accepts up to 4096 characters per request.
const MAX_PIECE_CHARS: usize = 4000;

pub struct OpenAINarrator {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAINarrator {
    pub fn new(model: &str, voice: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: parse_model(model)?,
            voice: parse_voice(voice)?,
        })
    }
}

fn parse_model(model: &str) -> Result<SpeechModel> {
    match model {
        "tts-1" => Ok(SpeechModel::Tts1),
        "tts-1-hd" => Ok(SpeechModel::Tts1Hd),
        other => Err(TubedeckError::Config(format!(
            "Unknown speech model: {}. Use tts-1 or tts-1-hd.",
            other
        ))),
    }
}

fn parse_voice(voice: &str) -> Result<Voice> {
    match voice.to_lowercase().as_str() {
        "alloy" => Ok(Voice::Alloy),
        "echo" => Ok(Voice::Echo),
        "fable" => Ok(Voice::Fable),
        "onyx" => Ok(Voice::Onyx),
        "nova" => Ok(Voice::Nova),
        "shimmer" => Ok(Voice::Shimmer),
        other => Err(TubedeckError::Config(format!("Unknown voice: {}", other))),
    }
}

#[async_trait]
impl Narrator for OpenAINarrator {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn narrate(&self, text: &str, dest: &Path) -> Result<AudioArtifact> {
        require_text(text)?;

        let mut audio = Vec::new();
        for piece in split_for_speech(text, MAX_PIECE_CHARS) {
            let request = CreateSpeechRequestArgs::default()
                .input(piece)
                .model(self.model.clone())
                .voice(self.voice.clone())
                .response_format(SpeechResponseFormat::Mp3)
                .build()
                .map_err(|e| TubedeckError::Synthesis(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .audio()
                .speech(request)
                .await
                .map_err(|e| TubedeckError::Synthesis(format!("Speech API error: {}", e)))?;

            debug!("Received {} bytes of audio", response.bytes.len());
            audio.extend_from_slice(&response.bytes);
        }

        write_audio(dest, &audio).await
    }
}
