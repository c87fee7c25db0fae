//! CLI output formatting utilities.

use crate::pipeline::{RunEvent, RunObserver, Stage};
use crate::search::VideoCandidate;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one numbered search result.
    pub fn candidate(index: usize, candidate: &VideoCandidate) {
        let mut details = Vec::new();
        if let Some(channel) = &candidate.channel {
            details.push(channel.clone());
        }
        if let Some(seconds) = candidate.duration_seconds {
            details.push(format_duration(seconds as f64));
        }

        let suffix = if details.is_empty() {
            String::new()
        } else {
            format!(" {}", style(format!("({})", details.join(", "))).dim())
        };

        println!(
            "  {} {}{}",
            style(format!("{}.", index)).cyan().bold(),
            style(&candidate.title).bold(),
            suffix
        );
        println!("     {}", style(&candidate.url).dim());
    }

    /// Print a titled block of wrapped prose.
    pub fn text_block(title: &str, text: &str) {
        println!("\n{}", style(title).bold());
        for line in textwrap::wrap(text, 78) {
            println!("  {}", line);
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Spinner-per-stage progress display for a pipeline run.
pub struct RunProgress {
    spinner: Mutex<Option<ProgressBar>>,
    transcript_preview: usize,
}

impl RunProgress {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            transcript_preview: 600,
        }
    }

    fn start(&self, msg: &str) {
        if let Ok(mut current) = self.spinner.lock() {
            if let Some(pb) = current.take() {
                pb.finish_and_clear();
            }
            *current = Some(Output::spinner(msg));
        }
    }

    fn stop(&self) {
        if let Ok(mut current) = self.spinner.lock() {
            if let Some(pb) = current.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Default for RunProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RunProgress {
    fn drop(&mut self) {
        self.stop();
    }
}

impl RunObserver for RunProgress {
    fn on_event(&self, event: RunEvent<'_>) {
        match event {
            RunEvent::Started(stage) => self.start(stage_message(stage)),
            RunEvent::Skipped(stage) => {
                self.stop();
                Output::info(&format!("Skipped {} (disabled in config)", stage));
            }
            RunEvent::Transcript(transcript) => {
                self.stop();
                Output::success(&format!(
                    "Transcript extracted ({} words)",
                    transcript.word_count()
                ));
                Output::text_block(
                    "Transcript",
                    &content_preview(&transcript.text(), self.transcript_preview),
                );
            }
            RunEvent::Summary(summary) => {
                self.stop();
                Output::success(&format!("Summary generated ({} words)", summary.word_count()));
                Output::text_block("Summary", summary.as_str());
            }
            RunEvent::Narration(audio) => {
                self.stop();
                Output::success(&format!("Narration ready ({})", format_size(audio.bytes)));
            }
            RunEvent::Deck(deck) => {
                self.stop();
                Output::success(&format!("Slide deck created ({} slides)", deck.len()));
            }
            RunEvent::Video(video) => {
                self.stop();
                Output::success(&format!(
                    "Video rendered ({})",
                    format_duration(video.duration_seconds)
                ));
            }
        }
    }
}

fn stage_message(stage: Stage) -> &'static str {
    match stage {
        Stage::Search => "Searching YouTube...",
        Stage::Transcript => "Extracting transcript...",
        Stage::Summarize => "Summarizing the transcript...",
        Stage::Narrate => "Converting summary to audio...",
        Stage::Deck => "Creating slide deck...",
        Stage::Render => "Rendering slide video...",
    }
}

/// Format duration in seconds to a human-readable string.
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.round() as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format file size in human-readable format.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Truncate content with ellipsis, on a character boundary.
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        format!("{}...", content.chars().take(max_chars).collect::<String>())
    }
}
