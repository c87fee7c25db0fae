//! Tubedeck - YouTube video to summary, narration and slides
//!
//! A CLI tool that turns a YouTube search into a short presentation.
//!
//! # Overview
//!
//! Tubedeck allows you to:
//! - Search YouTube and pick one of the top results
//! - Pull the video's captions as a transcript
//! - Summarize the transcript with a bounded length
//! - Narrate the summary as MP3 speech
//! - Turn the summary into a `.pptx` slide deck and a narrated slide video
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `search` - Free-text query to candidate videos (yt-dlp)
//! - `transcript` - Video id resolution and caption retrieval
//! - `summarize` - Bounded-length summarization (OpenAI or HuggingFace)
//! - `narrate` - Text-to-speech (Google Translate TTS or OpenAI)
//! - `deck` - Slide segmentation and `.pptx` packaging
//! - `render` - Slide video rendering with ffmpeg
//! - `pipeline` - Run sessions, cancellation and stage coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use tubedeck::config::Settings;
//! use tubedeck::pipeline::{CancelToken, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(&settings)?;
//!
//!     let outcome = pipeline
//!         .run("dQw4w9WgXcQ", &CancelToken::new(), &())
//!         .await?;
//!     println!("{}", outcome.summary.as_str());
//!     outcome.session.deliver(&settings.output_dir())?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod deck;
pub mod error;
pub mod narrate;
pub mod openai;
pub mod pipeline;
pub mod render;
pub mod search;
pub mod summarize;
pub mod transcript;

pub use error::{Result, TubedeckError};
