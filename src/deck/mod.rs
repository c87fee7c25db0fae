//! Slide deck construction from summary text.
//!
//! A [`Segmenter`] decides where one slide ends and the next begins. Every
//! slide carries the same title; the body is one segment of the summary.

mod pptx;

pub use pptx::write_pptx;

use crate::error::{Result, TubedeckError};
use crate::summarize::SummaryText;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

pub const DEFAULT_SLIDE_TITLE: &str = "Generated Content";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub body: String,
}

impl Slide {
    pub fn word_count(&self) -> usize {
        self.body.split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlideDeck {
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// Splits text into slide-sized segments.
pub trait Segmenter: Send + Sync {
    fn segments(&self, text: &str) -> Vec<String>;
}

/// Literal split on `". "`.
///
/// No abbreviation handling: "e.g. this" becomes two segments. The period
/// that separated two segments is consumed; a trailing period on the last
/// segment is kept. Segment text is kept as is, surrounding whitespace
/// included; segments that are only whitespace are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodSpaceSegmenter;

impl Segmenter for PeriodSpaceSegmenter {
    fn segments(&self, text: &str) -> Vec<String> {
        text.split(". ")
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Turns a summary into a [`SlideDeck`].
#[derive(Clone)]
pub struct DeckBuilder {
    segmenter: Arc<dyn Segmenter>,
    title: String,
}

impl Default for DeckBuilder {
    fn default() -> Self {
        Self::new(Arc::new(PeriodSpaceSegmenter))
    }
}

impl DeckBuilder {
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            segmenter,
            title: DEFAULT_SLIDE_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// One slide per segment of the summary.
    pub fn build(&self, summary: &SummaryText) -> Result<SlideDeck> {
        self.build_text(summary.as_str())
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub fn build_text(&self, text: &str) -> Result<SlideDeck> {
        let slides: Vec<Slide> = self
            .segmenter
            .segments(text)
            .into_iter()
            .map(|body| Slide {
                title: self.title.clone(),
                body,
            })
            .collect();

        if slides.is_empty() {
            return Err(TubedeckError::Deck(
                "text has no content to put on slides".to_string(),
            ));
        }

        debug!("Built deck with {} slides", slides.len());
        Ok(SlideDeck { slides })
    }
}
