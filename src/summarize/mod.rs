//! Abstractive summarization of transcripts.
//!
//! Models only ever see bounded windows of text. [`ChunkedSummarizer`]
//! splits long transcripts, summarizes each window, and summarizes the
//! joined partial summaries again until a single window remains.

mod huggingface;
mod openai;

pub use huggingface::HuggingFaceModel;
pub use openai::OpenAIModel;

use crate::config::{Prompts, SummarizationProvider, SummarizationSettings};
use crate::error::{Result, TubedeckError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Length bounds for a summary, in whitespace-delimited words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBounds {
    pub min_words: usize,
    pub max_words: usize,
}

impl Default for SummaryBounds {
    fn default() -> Self {
        Self {
            min_words: 30,
            max_words: 150,
        }
    }
}

/// A finished summary. Immutable once produced; downstream stages borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryText {
    text: String,
    bounds: SummaryBounds,
}

impl SummaryText {
    pub fn new(text: String, bounds: SummaryBounds) -> Self {
        Self { text, bounds }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn bounds(&self) -> SummaryBounds {
        self.bounds
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    /// Whether the word count landed inside the requested bounds.
    pub fn within_bounds(&self) -> bool {
        let n = self.word_count();
        n >= self.bounds.min_words && n <= self.bounds.max_words
    }
}

impl std::fmt::Display for SummaryText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Trait for summarization services.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text` within `bounds`.
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<SummaryText>;
}

/// A summarization backend that handles one bounded window of input.
#[async_trait]
pub trait SummaryModel: Send + Sync {
    /// Model name for logs.
    fn name(&self) -> &str;

    /// Largest input window, in words, the backend accepts.
    fn max_input_words(&self) -> usize;

    /// Summarize a single window.
    async fn summarize_window(&self, text: &str, bounds: SummaryBounds) -> Result<String>;
}

/// Map-reduce summarizer over a [`SummaryModel`].
pub struct ChunkedSummarizer {
    model: Arc<dyn SummaryModel>,
    min_input_words: usize,
    window_words: usize,
    max_reduce_rounds: usize,
}

impl ChunkedSummarizer {
    pub fn new(model: Arc<dyn SummaryModel>) -> Self {
        let window_words = model.max_input_words();
        Self {
            model,
            min_input_words: 30,
            window_words,
            max_reduce_rounds: 4,
        }
    }

    pub fn with_min_input_words(mut self, words: usize) -> Self {
        self.min_input_words = words;
        self
    }

    /// Override the window size. 0 keeps the model's default.
    pub fn with_window_words(mut self, words: usize) -> Self {
        if words > 0 {
            self.window_words = words;
        }
        self
    }

    pub fn with_max_reduce_rounds(mut self, rounds: usize) -> Self {
        self.max_reduce_rounds = rounds;
        self
    }
}

#[async_trait]
impl Summarizer for ChunkedSummarizer {
    #[instrument(skip(self, text), fields(model = self.model.name(), words = word_count(text)))]
    async fn summarize(&self, text: &str, bounds: SummaryBounds) -> Result<SummaryText> {
        let words = word_count(text);
        if words == 0 {
            return Err(TubedeckError::Summarization(
                "input text is empty".to_string(),
            ));
        }
        if words < self.min_input_words {
            return Err(TubedeckError::Summarization(format!(
                "input is too short to summarize ({} words, need at least {})",
                words, self.min_input_words
            )));
        }

        // Windows of at least twice the summary length keep every round shrinking.
        let window_words = self.window_words.max(2 * bounds.max_words);
        if window_words != self.window_words {
            warn!(
                "Window of {} words is too small for {}-word summaries, using {}",
                self.window_words, bounds.max_words, window_words
            );
        }

        let mut current = normalize_whitespace(text);
        let mut round = 0;

        let raw = loop {
            let windows = chunk_words(&current, window_words);
            if windows.len() <= 1 {
                break self.model.summarize_window(&current, bounds).await?;
            }

            if round >= self.max_reduce_rounds {
                return Err(TubedeckError::Summarization(format!(
                    "input still spans {} windows after {} reduce rounds",
                    windows.len(),
                    round
                )));
            }
            round += 1;
            info!("Summarizing {} windows (round {})", windows.len(), round);

            let mut partials = Vec::with_capacity(windows.len());
            for (idx, window) in windows.iter().enumerate() {
                debug!("Window {}/{} ({} words)", idx + 1, windows.len(), word_count(window));
                partials.push(self.model.summarize_window(window, bounds).await?);
            }
            current = normalize_whitespace(&partials.join(" "));
        };

        let summary = enforce_bounds(&raw, bounds);
        if summary.is_empty() {
            return Err(TubedeckError::Summarization(format!(
                "{} returned an empty summary",
                self.model.name()
            )));
        }

        let summary = SummaryText::new(summary, bounds);
        if summary.word_count() < bounds.min_words {
            warn!(
                "Summary has {} words, below the requested minimum of {}",
                summary.word_count(),
                bounds.min_words
            );
        }

        Ok(summary)
    }
}

/// Build the configured summarizer.
pub fn create_summarizer(
    settings: &SummarizationSettings,
    prompts: Prompts,
) -> Result<Arc<dyn Summarizer>> {
    let model: Arc<dyn SummaryModel> = match settings.provider {
        SummarizationProvider::OpenAI => Arc::new(OpenAIModel::new(&settings.model, prompts)?),
        SummarizationProvider::HuggingFace => Arc::new(HuggingFaceModel::from_env(&settings.hf_model)?),
    };

    Ok(Arc::new(
        ChunkedSummarizer::new(model)
            .with_min_input_words(settings.min_input_words)
            .with_window_words(settings.max_input_words)
            .with_max_reduce_rounds(settings.max_reduce_rounds),
    ))
}

/// Count whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Collapse all whitespace runs to single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text into windows of at most `max_words` words, sized evenly so the
/// last window is not a tiny remainder.
pub fn chunk_words(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let max_words = max_words.max(1);
    let count = words.len().div_ceil(max_words);
    let size = words.len().div_ceil(count);

    words.chunks(size).map(|chunk| chunk.join(" ")).collect()
}

/// Trim a model response to at most `bounds.max_words` words.
///
/// Prefers cutting at the last sentence end inside the limit, as long as
/// that keeps at least `bounds.min_words` words.
pub fn enforce_bounds(text: &str, bounds: SummaryBounds) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= bounds.max_words {
        return words.join(" ");
    }

    let kept = &words[..bounds.max_words];
    let sentence_end = kept
        .iter()
        .rposition(|w| w.ends_with(['.', '!', '?']));

    match sentence_end {
        Some(idx) if idx + 1 >= bounds.min_words => kept[..=idx].join(" "),
        _ => kept.join(" "),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Model that returns the first `max_words` words of its input and counts calls.
    pub(crate) struct TruncatingModel {
        pub window: usize,
        pub calls: AtomicUsize,
    }

    impl TruncatingModel {
        pub fn new(window: usize) -> Self {
            Self {
                window,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SummaryModel for TruncatingModel {
        fn name(&self) -> &str {
            "truncating"
        }

        fn max_input_words(&self) -> usize {
            self.window
        }

        async fn summarize_window(&self, text: &str, bounds: SummaryBounds) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text
                .split_whitespace()
                .take(bounds.max_words)
                .collect::<Vec<_>>()
                .join(" "))
        }
    }

    struct EmptyModel;

    #[async_trait]
    impl SummaryModel for EmptyModel {
        fn name(&self) -> &str {
            "empty"
        }

        fn max_input_words(&self) -> usize {
            1000
        }

        async fn summarize_window(&self, _text: &str, _bounds: SummaryBounds) -> Result<String> {
            Ok("   ".to_string())
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_chunk_words_even_split() {
        let chunks = chunk_words(&words(250), 100);
        assert_eq!(chunks.len(), 3);
        let sizes: Vec<usize> = chunks.iter().map(|c| word_count(c)).collect();
        assert!(sizes.iter().all(|&n| n <= 100));
        assert_eq!(sizes.iter().sum::<usize>(), 250);
        assert!(sizes.iter().min().unwrap() >= &80);
    }

    #[test]
    fn test_chunk_words_small_input() {
        assert_eq!(chunk_words("a b c", 100), vec!["a b c".to_string()]);
        assert!(chunk_words("   ", 100).is_empty());
    }

    #[test]
    fn test_enforce_bounds_passthrough_normalizes() {
        let bounds = SummaryBounds::default();
        assert_eq!(enforce_bounds("one  two\nthree.", bounds), "one two three.");
    }

    #[test]
    fn test_enforce_bounds_cuts_at_sentence() {
        let bounds = SummaryBounds { min_words: 3, max_words: 8 };
        let text = "Graphs have nodes. Edges connect nodes together. Trees are graphs too.";
        assert_eq!(enforce_bounds(text, bounds), "Graphs have nodes. Edges connect nodes together.");
    }

    #[test]
    fn test_enforce_bounds_hard_cut_when_sentence_too_short() {
        let bounds = SummaryBounds { min_words: 5, max_words: 6 };
        let text = "Short. then a long run of words without any stop";
        assert_eq!(enforce_bounds(text, bounds), "Short. then a long run of");
    }

    #[tokio::test]
    async fn test_summary_within_bounds() {
        let model = Arc::new(TruncatingModel::new(1000));
        let summarizer = ChunkedSummarizer::new(model.clone());
        let summary = summarizer
            .summarize(&words(400), SummaryBounds::default())
            .await
            .unwrap();

        assert!(summary.within_bounds());
        assert_eq!(summary.word_count(), 150);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_long_input_is_reduced() {
        let model = Arc::new(TruncatingModel::new(400));
        let summarizer = ChunkedSummarizer::new(model.clone());
        let summary = summarizer
            .summarize(&words(1000), SummaryBounds::default())
            .await
            .unwrap();

        // 1000 words: 3 windows -> 450 words: 2 windows -> 300 words: final call
        assert_eq!(summary.word_count(), 150);
        assert_eq!(model.calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_small_window_is_widened_to_fit_summary() {
        let model = Arc::new(TruncatingModel::new(1000));
        let summarizer = ChunkedSummarizer::new(model.clone()).with_window_words(100);
        let summary = summarizer
            .summarize(&words(500), SummaryBounds::default())
            .await
            .unwrap();

        // window widened to 300: 500 words -> 2 windows -> 300 words: final call
        assert_eq!(summary.word_count(), 150);
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_reduce_rounds_limit() {
        let model = Arc::new(TruncatingModel::new(200));
        let summarizer = ChunkedSummarizer::new(model).with_max_reduce_rounds(0);
        let err = summarizer
            .summarize(&words(1000), SummaryBounds::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TubedeckError::Summarization(_)));
    }

    #[tokio::test]
    async fn test_empty_and_short_input_fail() {
        let summarizer = ChunkedSummarizer::new(Arc::new(TruncatingModel::new(1000)));

        let err = summarizer.summarize("   ", SummaryBounds::default()).await.unwrap_err();
        assert!(matches!(err, TubedeckError::Summarization(_)));

        let err = summarizer.summarize(&words(10), SummaryBounds::default()).await.unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[tokio::test]
    async fn test_empty_model_output_fails() {
        let summarizer = ChunkedSummarizer::new(Arc::new(EmptyModel));
        let err = summarizer.summarize(&words(100), SummaryBounds::default()).await.unwrap_err();
        assert!(err.to_string().contains("empty summary"));
    }
}
