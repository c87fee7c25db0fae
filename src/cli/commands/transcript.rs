//! Transcript command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::TubedeckError;
use crate::transcript::{format_transcript, TranscriptFetcher, TranscriptFormat, YoutubeTranscriptSource};
use anyhow::Result;
use std::sync::Arc;

/// Print the transcript of a video in the requested format.
pub async fn run_transcript(video: &str, format: &str, settings: Settings) -> Result<()> {
    let format: TranscriptFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let fetcher = TranscriptFetcher::new(
        Arc::new(YoutubeTranscriptSource::new()?),
        settings.transcript.languages.clone(),
    );

    let spinner = Output::spinner("Extracting transcript...");
    let transcript = fetcher.fetch_text(video).await;
    spinner.finish_and_clear();

    match transcript {
        Some(transcript) => {
            print!("{}", format_transcript(&transcript, format));
            Ok(())
        }
        None => {
            let err = TubedeckError::TranscriptAbsent;
            Output::error(&err.to_string());
            Err(err.into())
        }
    }
}
