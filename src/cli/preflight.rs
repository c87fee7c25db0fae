//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and credentials are available before
//! starting a run that would otherwise fail midway.

use crate::config::{NarrationProvider, Settings, SummarizationProvider};
use crate::error::{Result, TubedeckError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Search needs yt-dlp.
    Search,
    /// A full run needs the summarization and narration credentials, plus
    /// ffmpeg/ffprobe when rendering is enabled.
    Run,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Search => {
            check_tool("yt-dlp")?;
        }
        Operation::Run => {
            if settings.summarization.provider == SummarizationProvider::OpenAI
                || settings.narration.provider == NarrationProvider::OpenAI
            {
                check_env("OPENAI_API_KEY", "sk-...")?;
            }
            if settings.summarization.provider == SummarizationProvider::HuggingFace {
                check_env("HF_API_TOKEN", "hf_...")?;
            }
            if settings.render.enabled {
                check_tool("ffmpeg")?;
                check_tool("ffprobe")?;
            }
        }
    }
    Ok(())
}

/// Check that a credential is present in the environment.
fn check_env(name: &str, example: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(()),
        Ok(_) => Err(TubedeckError::Config(format!(
            "{} is empty. Set it with: export {}='{}'",
            name, name, example
        ))),
        Err(_) => Err(TubedeckError::Config(format!(
            "{} not set. Set it with: export {}='{}'",
            name, name, example
        ))),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TubedeckError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TubedeckError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TubedeckError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
