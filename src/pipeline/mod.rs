//! The run pipeline: transcript, summary, narration, deck, video.
//!
//! Stages run strictly one after another. The first failure ends the run;
//! nothing is retried. A missing transcript stops the run before any
//! artifact is written.

mod cancel;
mod session;

pub use cancel::CancelToken;
pub use session::{RunSession, DECK_FILE, NARRATION_FILE, VIDEO_FILE};

use crate::config::{Prompts, Settings};
use crate::deck::{write_pptx, DeckBuilder, SlideDeck};
use crate::error::{Result, TubedeckError};
use crate::narrate::{create_narrator, AudioArtifact, Narrator};
use crate::render::{FfmpegRenderer, Renderer, VideoArtifact};
use crate::search::{VideoCandidate, VideoSearch, YoutubeSearch};
use crate::summarize::{create_summarizer, SummaryBounds, SummaryText, Summarizer};
use crate::transcript::{Transcript, TranscriptFetcher, TranscriptSource, YoutubeTranscriptSource};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Pipeline stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    Transcript,
    Summarize,
    Narrate,
    Deck,
    Render,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Search => "search",
            Stage::Transcript => "transcript",
            Stage::Summarize => "summarize",
            Stage::Narrate => "narrate",
            Stage::Deck => "deck",
            Stage::Render => "render",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Progress notifications emitted while a run advances.
#[derive(Debug)]
pub enum RunEvent<'a> {
    Started(Stage),
    Transcript(&'a Transcript),
    Summary(&'a SummaryText),
    Narration(&'a AudioArtifact),
    Deck(&'a SlideDeck),
    Video(&'a VideoArtifact),
    Skipped(Stage),
}

/// Receives [`RunEvent`]s. The unit type ignores them.
pub trait RunObserver: Send + Sync {
    fn on_event(&self, event: RunEvent<'_>);
}

impl RunObserver for () {
    fn on_event(&self, _event: RunEvent<'_>) {}
}

/// Everything a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub session: RunSession,
    pub transcript: Transcript,
    pub summary: SummaryText,
    pub deck: SlideDeck,
}

impl RunOutcome {
    pub fn narration(&self) -> Option<&AudioArtifact> {
        self.session.narration()
    }

    pub fn video(&self) -> Option<&VideoArtifact> {
        self.session.video()
    }
}

/// Pluggable external capabilities.
pub struct Components {
    pub search: Arc<dyn VideoSearch>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub summarizer: Arc<dyn Summarizer>,
    pub narrator: Arc<dyn Narrator>,
    /// `None` skips the video stage.
    pub renderer: Option<Arc<dyn Renderer>>,
}

pub struct Pipeline {
    search: Arc<dyn VideoSearch>,
    transcripts: TranscriptFetcher,
    summarizer: Arc<dyn Summarizer>,
    narrator: Arc<dyn Narrator>,
    renderer: Option<Arc<dyn Renderer>>,
    deck_builder: DeckBuilder,
    bounds: SummaryBounds,
    search_limit: usize,
    work_dir: PathBuf,
}

impl Pipeline {
    /// Build a pipeline with the services named in `settings`.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let renderer: Option<Arc<dyn Renderer>> = if settings.render.enabled {
            Some(Arc::new(FfmpegRenderer::new(settings.render.clone())))
        } else {
            info!("Video rendering disabled");
            None
        };

        let components = Components {
            search: Arc::new(YoutubeSearch::new()),
            transcripts: Arc::new(YoutubeTranscriptSource::new()?),
            summarizer: create_summarizer(&settings.summarization, prompts)?,
            narrator: create_narrator(&settings.narration)?,
            renderer,
        };

        Ok(Self::with_components(settings, components))
    }

    /// Build a pipeline around custom components.
    pub fn with_components(settings: &Settings, components: Components) -> Self {
        Self {
            search: components.search,
            transcripts: TranscriptFetcher::new(
                components.transcripts,
                settings.transcript.languages.clone(),
            ),
            summarizer: components.summarizer,
            narrator: components.narrator,
            renderer: components.renderer,
            deck_builder: DeckBuilder::default().with_title(settings.deck.slide_title.clone()),
            bounds: SummaryBounds {
                min_words: settings.summarization.min_words,
                max_words: settings.summarization.max_words,
            },
            search_limit: settings.search_limit(),
            work_dir: settings.temp_dir(),
        }
    }

    pub fn renders_video(&self) -> bool {
        self.renderer.is_some()
    }

    /// Find candidate videos for a free-text query.
    pub async fn search(&self, query: &str, cancel: &CancelToken) -> Result<Vec<VideoCandidate>> {
        stage(Stage::Search, cancel, self.search.search(query, self.search_limit)).await
    }

    /// Run every stage for one video URL or id.
    #[instrument(skip(self, cancel, observer))]
    pub async fn run(
        &self,
        video: &str,
        cancel: &CancelToken,
        observer: &dyn RunObserver,
    ) -> Result<RunOutcome> {
        observer.on_event(RunEvent::Started(Stage::Transcript));
        let transcript = stage(Stage::Transcript, cancel, async {
            self.transcripts
                .fetch_text(video)
                .await
                .ok_or(TubedeckError::TranscriptAbsent)
        })
        .await?;
        observer.on_event(RunEvent::Transcript(&transcript));

        observer.on_event(RunEvent::Started(Stage::Summarize));
        let text = transcript.text();
        let summary = stage(
            Stage::Summarize,
            cancel,
            self.summarizer.summarize(&text, self.bounds),
        )
        .await?;
        observer.on_event(RunEvent::Summary(&summary));

        let mut session = RunSession::new(&self.work_dir)?;
        info!("Run {} for {}", session.id(), transcript.video_id);

        observer.on_event(RunEvent::Started(Stage::Narrate));
        let audio_path = session.path(NARRATION_FILE);
        let audio = stage(
            Stage::Narrate,
            cancel,
            self.narrator.narrate(summary.as_str(), &audio_path),
        )
        .await?;
        observer.on_event(RunEvent::Narration(&audio));
        session.set_narration(audio.clone());

        observer.on_event(RunEvent::Started(Stage::Deck));
        let deck_path = session.path(DECK_FILE);
        let deck = stage(Stage::Deck, cancel, async {
            let deck = self.deck_builder.build(&summary)?;
            write_pptx(&deck, &deck_path)?;
            Ok::<_, TubedeckError>(deck)
        })
        .await?;
        observer.on_event(RunEvent::Deck(&deck));
        session.set_deck(deck_path);

        match &self.renderer {
            Some(renderer) => {
                observer.on_event(RunEvent::Started(Stage::Render));
                let video_path = session.path(VIDEO_FILE);
                let video = stage(
                    Stage::Render,
                    cancel,
                    renderer.render(&deck, Some(&audio), &video_path),
                )
                .await?;
                observer.on_event(RunEvent::Video(&video));
                session.set_video(video);
            }
            None => observer.on_event(RunEvent::Skipped(Stage::Render)),
        }

        Ok(RunOutcome {
            session,
            transcript,
            summary,
            deck,
        })
    }
}

/// Run one stage, abandoning it if `cancel` fires first.
async fn stage<T>(
    stage: Stage,
    cancel: &CancelToken,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Cancelled during {}", stage);
            Err(TubedeckError::Cancelled(stage.name()))
        }
        result = work => result,
    }
}
