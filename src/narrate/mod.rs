//! Text-to-speech narration of summaries.

mod google;
mod openai;

pub use google::GoogleNarrator;
pub use openai::OpenAINarrator;

use crate::config::{NarrationProvider, NarrationSettings};
use crate::error::{Result, TubedeckError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A synthesized speech file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Trait for speech synthesis services.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Speak `text` in English and write the audio to `dest`.
    async fn narrate(&self, text: &str, dest: &Path) -> Result<AudioArtifact>;
}

/// Build the configured narrator.
pub fn create_narrator(settings: &NarrationSettings) -> Result<Arc<dyn Narrator>> {
    if !settings.language.eq_ignore_ascii_case("en") {
        return Err(TubedeckError::Config(format!(
            "Unsupported narration language '{}', only 'en' is available",
            settings.language
        )));
    }

    Ok(match settings.provider {
        NarrationProvider::Google => Arc::new(GoogleNarrator::new()?),
        NarrationProvider::OpenAI => Arc::new(OpenAINarrator::new(
            &settings.openai_model,
            &settings.openai_voice,
        )?),
    })
}

/// Split text into pieces of at most `max_chars` characters on word boundaries.
///
/// A single word longer than `max_chars` is cut at character boundaries.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();

        if !current.is_empty() && current_len + 1 + word_len > max_chars {
            pieces.push(std::mem::take(&mut current));
        }

        if word_len > max_chars {
            let chars: Vec<char> = word.chars().collect();
            for part in chars.chunks(max_chars) {
                pieces.push(part.iter().collect());
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

/// Reject empty input before any request goes out.
pub(crate) fn require_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(TubedeckError::Synthesis("nothing to narrate".to_string()));
    }
    Ok(())
}

/// Write synthesized audio to `dest`, refusing to leave an empty file behind.
pub(crate) async fn write_audio(dest: &Path, audio: &[u8]) -> Result<AudioArtifact> {
    if audio.is_empty() {
        return Err(TubedeckError::Synthesis(
            "speech service returned no audio".to_string(),
        ));
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, audio).await?;

    let bytes = tokio::fs::metadata(dest).await?.len();
    if bytes == 0 {
        return Err(TubedeckError::Synthesis(format!(
            "audio file {} is empty",
            dest.display()
        )));
    }

    debug!("Wrote {} bytes of audio to {}", bytes, dest.display());

    Ok(AudioArtifact {
        path: dest.to_path_buf(),
        bytes,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Narrator that writes a fixed byte pattern without touching the network.
    pub(crate) struct SilentNarrator;

    #[async_trait]
    impl Narrator for SilentNarrator {
        fn name(&self) -> &str {
            "silent"
        }

        async fn narrate(&self, text: &str, dest: &Path) -> Result<AudioArtifact> {
            require_text(text)?;
            write_audio(dest, b"ID3\x03\x00fake-mp3-frames").await
        }
    }

    #[test]
    fn test_split_respects_limit_and_words() {
        let text = "graph theory studies pairwise relations between objects ".repeat(10);
        let pieces = split_for_speech(&text, 100);

        assert!(pieces.len() > 1);
        assert!(pieces.iter().all(|p| p.chars().count() <= 100));
        assert_eq!(pieces.join(" "), text.trim());
    }

    #[test]
    fn test_split_long_word() {
        let pieces = split_for_speech("a bbbbbbbbbb c", 4);
        assert_eq!(pieces, vec!["a", "bbbb", "bbbb", "bb", "c"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_for_speech("  \n ", 100).is_empty());
    }

    #[test]
    fn test_require_text() {
        assert!(matches!(require_text(" "), Err(TubedeckError::Synthesis(_))));
        assert!(require_text("hello").is_ok());
    }

    #[tokio::test]
    async fn test_write_audio() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nested").join("narration.mp3");

        let artifact = write_audio(&dest, b"abc").await.unwrap();
        assert_eq!(artifact.bytes, 3);
        assert!(dest.exists());

        let err = write_audio(&dir.path().join("empty.mp3"), b"").await.unwrap_err();
        assert!(matches!(err, TubedeckError::Synthesis(_)));
        assert!(!dir.path().join("empty.mp3").exists());
    }

    #[test]
    fn test_create_narrator_rejects_other_languages() {
        let settings = NarrationSettings {
            language: "fr".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_narrator(&settings),
            Err(TubedeckError::Config(_))
        ));
    }
}
