//! CLI module for tubedeck.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{Output, RunProgress};

use clap::{Parser, Subcommand};

/// tubedeck - YouTube video to summary, narration and slides
///
/// Searches YouTube, pulls the chosen video's captions, summarizes them,
/// narrates the summary and turns it into a slide deck and slide video.
#[derive(Parser, Debug)]
#[command(name = "tubedeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search YouTube and list up to five matching videos
    Search {
        /// Free-text search query
        query: String,

        /// Maximum number of results (at most 5)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Interactive session: search, pick a video, and build the presentation
    Run {
        /// Search query (prompted for when omitted)
        query: Option<String>,

        /// Skip the search and use this video URL or ID
        #[arg(long)]
        video: Option<String>,

        /// Where to put narration.mp3, presentation.pptx and presentation.mp4
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Do not render presentation.mp4
        #[arg(long)]
        no_render: bool,
    },

    /// Print a video's transcript
    Transcript {
        /// YouTube URL or video ID
        video: String,

        /// Output format (text, json, srt, vtt)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Build a slide deck from a text file without any network access
    Deck {
        /// Text file to split into slides
        file: String,

        /// Output path
        #[arg(short, long, default_value = "presentation.pptx")]
        output: String,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "summarization.provider")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
