//! Configuration settings for tubedeck.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub transcript: TranscriptSettings,
    pub summarization: SummarizationSettings,
    pub narration: NarrationSettings,
    pub deck: DeckSettings,
    pub render: RenderSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Parent directory for per-run temporary directories.
    pub temp_dir: String,
    /// Where `run` delivers the finished artifacts.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/tubedeck".to_string(),
            output_dir: ".".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Video search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of candidates to show (capped at 5).
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { max_results: 5 }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Finished runs kept for download. The oldest is discarded past this.
    pub max_runs: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { max_runs: 16 }
    }
}

/// Transcript retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Caption languages to accept, in order of preference.
    pub languages: Vec<String>,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
        }
    }
}

/// Summarization provider type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// OpenAI chat completions (default).
    #[default]
    OpenAI,
    /// HuggingFace Inference API (BART-style summarization models).
    HuggingFace,
}

impl std::str::FromStr for SummarizationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(SummarizationProvider::OpenAI),
            "huggingface" | "hf" => Ok(SummarizationProvider::HuggingFace),
            _ => Err(format!("Unknown summarization provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SummarizationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummarizationProvider::OpenAI => write!(f, "openai"),
            SummarizationProvider::HuggingFace => write!(f, "huggingface"),
        }
    }
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    pub provider: SummarizationProvider,
    /// Chat model for the openai provider.
    pub model: String,
    /// Model id for the huggingface provider.
    pub hf_model: String,
    /// Lower bound on summary length, in words.
    pub min_words: usize,
    /// Upper bound on summary length, in words.
    pub max_words: usize,
    /// Inputs shorter than this are rejected.
    pub min_input_words: usize,
    /// Window size for chunking long transcripts. 0 picks the provider default.
    /// Must be at least twice `max_words` so each reduce round shrinks the text.
    pub max_input_words: usize,
    /// Maximum number of summarize-the-summaries rounds.
    pub max_reduce_rounds: usize,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            provider: SummarizationProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            hf_model: "facebook/bart-large-cnn".to_string(),
            min_words: 30,
            max_words: 150,
            min_input_words: 30,
            max_input_words: 0,
            max_reduce_rounds: 4,
        }
    }
}

/// Text-to-speech provider type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NarrationProvider {
    /// Google Translate TTS endpoint (default, no key needed).
    #[default]
    Google,
    /// OpenAI speech API.
    OpenAI,
}

impl std::str::FromStr for NarrationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "gtts" => Ok(NarrationProvider::Google),
            "openai" => Ok(NarrationProvider::OpenAI),
            _ => Err(format!("Unknown narration provider: {}", s)),
        }
    }
}

impl std::fmt::Display for NarrationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NarrationProvider::Google => write!(f, "google"),
            NarrationProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Narration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationSettings {
    pub provider: NarrationProvider,
    /// Speech language. Only "en" is supported.
    pub language: String,
    /// Speech model for the openai provider.
    pub openai_model: String,
    /// Voice for the openai provider.
    pub openai_voice: String,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            provider: NarrationProvider::Google,
            language: "en".to_string(),
            openai_model: "tts-1".to_string(),
            openai_voice: "alloy".to_string(),
        }
    }
}

/// Slide deck settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckSettings {
    /// Title placed on every slide.
    pub slide_title: String,
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            slide_title: "Generated Content".to_string(),
        }
    }
}

/// Slide video rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Disable to skip the video stage entirely.
    pub enabled: bool,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Slide duration when there is no narration to follow.
    pub seconds_per_slide: f64,
    /// Floor for narration-timed slides.
    pub min_slide_seconds: f64,
    /// Font for ffmpeg drawtext. Needed on ffmpeg builds without fontconfig.
    pub font_file: Option<String>,
    pub background: String,
    pub font_color: String,
    pub title_font_size: u32,
    pub body_font_size: u32,
    /// Body text wrap width in characters.
    pub wrap_width: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 1280,
            height: 720,
            fps: 25,
            seconds_per_slide: 5.0,
            min_slide_seconds: 2.0,
            font_file: None,
            background: "0x1e1e2e".to_string(),
            font_color: "white".to_string(),
            title_font_size: 56,
            body_font_size: 36,
            wrap_width: 48,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::TubedeckError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject combinations the pipeline cannot honor.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::TubedeckError;

        let s = &self.summarization;
        if s.min_words == 0 || s.min_words > s.max_words {
            return Err(TubedeckError::Config(format!(
                "summarization.min_words ({}) must be between 1 and max_words ({})",
                s.min_words, s.max_words
            )));
        }
        if s.max_input_words != 0 && s.max_input_words < 2 * s.max_words {
            return Err(TubedeckError::Config(format!(
                "summarization.max_input_words ({}) must be 0 or at least twice max_words ({})",
                s.max_input_words, s.max_words
            )));
        }
        if !self.narration.language.eq_ignore_ascii_case("en") {
            return Err(TubedeckError::Config(format!(
                "narration.language '{}' is not supported (only 'en')",
                self.narration.language
            )));
        }
        if self.render.width == 0 || self.render.height == 0 || self.render.fps == 0 {
            return Err(TubedeckError::Config(
                "render.width, render.height and render.fps must be positive".to_string(),
            ));
        }
        if self.server.max_runs == 0 {
            return Err(TubedeckError::Config(
                "server.max_runs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubedeck")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Effective number of search results (never more than 5).
    pub fn search_limit(&self) -> usize {
        self.search.max_results.clamp(1, crate::search::MAX_CANDIDATES)
    }
}
