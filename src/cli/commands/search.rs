//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::search::{VideoSearch, YoutubeSearch, MAX_CANDIDATES};
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, limit: Option<usize>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let limit = limit
        .unwrap_or_else(|| settings.search_limit())
        .clamp(1, MAX_CANDIDATES);

    let spinner = Output::spinner("Fetching YouTube links...");
    let results = YoutubeSearch::new().search(query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(candidates) if candidates.is_empty() => {
            Output::warning(&format!("No videos found for \"{}\".", query.trim()));
        }
        Ok(candidates) => {
            Output::success(&format!("Found {} videos", candidates.len()));
            println!();
            for (i, candidate) in candidates.iter().enumerate() {
                Output::candidate(i + 1, candidate);
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(anyhow::anyhow!("{}", e));
        }
    }

    Ok(())
}
