//! Slide deck to video rendering.

mod ffmpeg;

pub use ffmpeg::{probe_duration, FfmpegRenderer};

use crate::deck::SlideDeck;
use crate::error::Result;
use crate::narrate::AudioArtifact;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A rendered slide video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoArtifact {
    pub path: PathBuf,
    pub duration_seconds: f64,
}

/// Trait for slide video renderers.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `deck` to `dest`, timed to `narration` when given.
    async fn render(
        &self,
        deck: &SlideDeck,
        narration: Option<&AudioArtifact>,
        dest: &Path,
    ) -> Result<VideoArtifact>;
}

/// How long slides stay on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Used for every slide when there is no narration.
    pub seconds_per_slide: f64,
    /// Floor for narration-timed slides.
    pub min_slide_seconds: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            seconds_per_slide: 5.0,
            min_slide_seconds: 2.0,
        }
    }
}

/// Per-slide durations in seconds.
///
/// With a narration length, the time is shared in proportion to each slide's
/// word count and sums to `total_seconds`. Slides whose share falls under
/// `min_slide_seconds` are raised to it and the rest is shared among the
/// others. When the narration is too short for every slide to get the
/// minimum, it is split evenly instead.
pub fn plan_timeline(deck: &SlideDeck, total_seconds: Option<f64>, timing: Timing) -> Vec<f64> {
    let n = deck.len();
    if n == 0 {
        return Vec::new();
    }

    let total = match total_seconds {
        Some(t) if t > 0.0 => t,
        _ => return vec![timing.seconds_per_slide; n],
    };

    let min = timing.min_slide_seconds.max(0.0);
    if total < min * n as f64 {
        return vec![total / n as f64; n];
    }

    let weights: Vec<f64> = deck
        .slides
        .iter()
        .map(|s| s.word_count().max(1) as f64)
        .collect();
    let mut pinned = vec![false; n];

    loop {
        let pinned_count = pinned.iter().filter(|p| **p).count();
        let free_total = total - min * pinned_count as f64;
        let free_weight: f64 = weights
            .iter()
            .zip(&pinned)
            .filter(|(_, p)| !**p)
            .map(|(w, _)| w)
            .sum();

        if free_weight == 0.0 {
            return vec![min; n];
        }

        let mut changed = false;
        for i in 0..n {
            if !pinned[i] && free_total * weights[i] / free_weight < min {
                pinned[i] = true;
                changed = true;
            }
        }

        if !changed {
            return (0..n)
                .map(|i| {
                    if pinned[i] {
                        min
                    } else {
                        free_total * weights[i] / free_weight
                    }
                })
                .collect();
        }
    }
}
