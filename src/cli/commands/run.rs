//! Interactive run: search, pick a video, build the presentation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, RunProgress};
use crate::config::Settings;
use crate::error::TubedeckError;
use crate::pipeline::{CancelToken, Pipeline, RunOutcome};
use crate::search::VideoCandidate;
use crate::transcript::extract_video_id;
use console::style;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Routes Ctrl+C to whichever step is running.
///
/// One listener serves the whole session. A press while a step runs cancels
/// that step; a press at a prompt exits the process.
#[derive(Clone, Default)]
struct Interrupts {
    active: Arc<Mutex<Option<CancelToken>>>,
}

impl Interrupts {
    /// Start a step and return the token Ctrl+C will cancel.
    fn begin(&self) -> CancelToken {
        let token = CancelToken::new();
        *self.slot() = Some(token.clone());
        token
    }

    fn end(&self) {
        self.slot().take();
    }

    /// Cancel the running step. Returns false when nothing is running.
    fn interrupt(&self) -> bool {
        match self.slot().take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<CancelToken>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn listen(&self) -> JoinHandle<()> {
        let interrupts = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !interrupts.interrupt() {
                    println!();
                    std::process::exit(130);
                }
            }
        })
    }
}

/// What the user typed at the video prompt.
#[derive(Debug, PartialEq)]
enum Choice {
    Quit,
    Video(String),
    Search(String),
    Invalid(String),
}

fn parse_choice(input: &str, candidates: &[VideoCandidate]) -> Choice {
    let input = input.trim();

    if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
        return Choice::Quit;
    }

    if let Some(query) = input.strip_prefix("search ") {
        return Choice::Search(query.trim().to_string());
    }

    if let Ok(n) = input.parse::<usize>() {
        return match candidates.get(n.wrapping_sub(1)) {
            Some(candidate) => Choice::Video(candidate.url.clone()),
            None => Choice::Invalid(format!("Pick a number between 1 and {}", candidates.len())),
        };
    }

    if extract_video_id(input).is_some() {
        return Choice::Video(input.to_string());
    }

    Choice::Invalid(format!("Not a YouTube URL or video ID: {}", input))
}

/// Print `message` and read one trimmed line. `None` on end of input.
fn prompt(message: &str) -> io::Result<Option<String>> {
    print!("{} {} ", style("?").cyan(), message);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

/// Run the interactive session.
pub async fn run_session(
    query: Option<String>,
    video: Option<String>,
    output_dir: Option<String>,
    no_render: bool,
    mut settings: Settings,
) -> anyhow::Result<()> {
    if no_render {
        settings.render.enabled = false;
    }

    let checks = preflight::check(Operation::Run, &settings).and_then(|_| {
        if video.is_none() {
            preflight::check(Operation::Search, &settings)
        } else {
            Ok(())
        }
    });
    if let Err(e) = checks {
        Output::error(&format!("{}", e));
        Output::info("Run 'tubedeck doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(&settings)?;
    if !pipeline.renders_video() {
        Output::info("Video rendering is off; presentation.mp4 will not be produced.");
    }
    let out_dir = output_dir
        .map(|d| Settings::expand_path(&d))
        .unwrap_or_else(|| settings.output_dir());

    println!("\n{}", style("YouTube Summarizer with video").bold().cyan());
    println!(
        "{}\n",
        style("Type 'quit' to exit. Ctrl+C cancels a running step, or exits at a prompt.").dim()
    );

    let interrupts = Interrupts::default();
    let listener = interrupts.listen();
    let result = session_loop(&pipeline, &interrupts, &out_dir, query, video).await;
    listener.abort();
    result
}

async fn session_loop(
    pipeline: &Pipeline,
    interrupts: &Interrupts,
    out_dir: &Path,
    query: Option<String>,
    video: Option<String>,
) -> anyhow::Result<()> {
    let mut candidates: Vec<VideoCandidate> = Vec::new();
    let mut pending_video = video;
    let mut pending_query = query;

    loop {
        let target = match pending_video.take() {
            Some(v) => v,
            None => {
                if candidates.is_empty() || pending_query.is_some() {
                    let query = match pending_query.take() {
                        Some(q) => q,
                        None => match prompt("Enter your query for YouTube video search:")? {
                            Some(q) => q,
                            None => break,
                        },
                    };
                    if query.eq_ignore_ascii_case("quit") {
                        break;
                    }
                    if query.trim().is_empty() {
                        continue;
                    }

                    candidates = search(pipeline, &query, interrupts).await;
                    if candidates.is_empty() {
                        continue;
                    }
                }

                let input = match prompt(&format!(
                    "Paste the URL of the video you want to use (or 1-{}, 'search <query>', 'quit'):",
                    candidates.len()
                ))? {
                    Some(i) => i,
                    None => break,
                };

                match parse_choice(&input, &candidates) {
                    Choice::Quit => break,
                    Choice::Search(q) => {
                        pending_query = Some(q);
                        continue;
                    }
                    Choice::Invalid(reason) => {
                        Output::warning(&reason);
                        continue;
                    }
                    Choice::Video(v) => v,
                }
            }
        };

        match run_once(pipeline, &target, interrupts).await {
            Some(outcome) => {
                deliver(&outcome, out_dir)?;
                break;
            }
            None => {
                Output::info("Enter another video to try again, or 'quit'.");
                if candidates.is_empty() {
                    pending_video = match prompt("Video URL or ID:")? {
                        Some(v) if !v.eq_ignore_ascii_case("quit") => Some(v),
                        _ => break,
                    };
                }
            }
        }
    }

    Ok(())
}

async fn search(pipeline: &Pipeline, query: &str, interrupts: &Interrupts) -> Vec<VideoCandidate> {
    let spinner = Output::spinner("Fetching YouTube links...");
    let cancel = interrupts.begin();
    let result = pipeline.search(query, &cancel).await;
    interrupts.end();
    spinner.finish_and_clear();

    match result {
        Ok(found) if found.is_empty() => {
            Output::warning(&format!("No videos found for \"{}\".", query.trim()));
            found
        }
        Ok(found) => {
            println!();
            for (i, candidate) in found.iter().enumerate() {
                Output::candidate(i + 1, candidate);
            }
            println!();
            found
        }
        Err(TubedeckError::Cancelled(_)) => {
            Output::warning("Search cancelled.");
            Vec::new()
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Vec::new()
        }
    }
}

/// One pipeline run with Ctrl+C wired to cancellation. Failures are reported here.
async fn run_once(pipeline: &Pipeline, target: &str, interrupts: &Interrupts) -> Option<RunOutcome> {
    let cancel = interrupts.begin();
    let progress = RunProgress::new();
    let result = pipeline.run(target, &cancel, &progress).await;
    interrupts.end();
    drop(progress);

    match result {
        Ok(outcome) => Some(outcome),
        Err(TubedeckError::Cancelled(stage)) => {
            Output::warning(&format!("Cancelled during {}.", stage));
            None
        }
        Err(e @ TubedeckError::TranscriptAbsent) => {
            Output::error(&e.to_string());
            None
        }
        Err(e) => {
            Output::error(&format!("{} step failed: {}", e.stage(), e));
            None
        }
    }
}

fn deliver(outcome: &RunOutcome, out_dir: &Path) -> anyhow::Result<()> {
    let delivered: Vec<PathBuf> = outcome.session.deliver(out_dir)?;

    Output::header("Your files");
    for path in &delivered {
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Output::kv(&label, &path.display().to_string());
    }
    println!();
    Output::success("Done.");
    Ok(())
}
