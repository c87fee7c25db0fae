//! Configuration module for tubedeck.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummarizePrompts};
pub use settings::{
    DeckSettings, GeneralSettings, NarrationProvider, NarrationSettings, PromptSettings,
    RenderSettings, SearchSettings, ServerSettings, Settings, SummarizationProvider,
    SummarizationSettings, TranscriptSettings,
};
