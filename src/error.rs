//! Error types for tubedeck.

use thiserror::Error;

/// Library-level error type for tubedeck operations.
#[derive(Error, Debug)]
pub enum TubedeckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video search failed: {0}")]
    Search(String),

    /// No usable transcript. The underlying cause is intentionally not carried;
    /// see [`crate::transcript::TranscriptFetcher`].
    #[error("Unable to extract transcript. The video may not have subtitles or an error occurred.")]
    TranscriptAbsent,

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Slide deck generation failed: {0}")]
    Deck(String),

    #[error("Video rendering failed: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cancelled during {0}")]
    Cancelled(&'static str),
}

impl TubedeckError {
    /// Pipeline stage this error belongs to, for user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            TubedeckError::Search(_) => "search",
            TubedeckError::TranscriptAbsent => "transcript",
            TubedeckError::Summarization(_) => "summarize",
            TubedeckError::Synthesis(_) => "narrate",
            TubedeckError::Deck(_) => "deck",
            TubedeckError::Render(_) => "render",
            TubedeckError::Cancelled(stage) => stage,
            _ => "pipeline",
        }
    }
}

/// Result type alias for tubedeck operations.
pub type Result<T> = std::result::Result<T, TubedeckError>;
