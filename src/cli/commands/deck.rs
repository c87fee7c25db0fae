//! Deck command: build a slide deck from a text file.

use crate::cli::Output;
use crate::config::Settings;
use crate::deck::{write_pptx, DeckBuilder};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Split a text file into slides and write the presentation.
pub fn run_deck(file: &str, output: &str, settings: &Settings) -> Result<()> {
    let input = Settings::expand_path(file);
    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let deck = DeckBuilder::default()
        .with_title(settings.deck.slide_title.clone())
        .build_text(&text)?;

    let output = PathBuf::from(output);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_pptx(&deck, &output)?;

    Output::success(&format!(
        "Wrote {} slides to {}",
        deck.len(),
        output.display()
    ));
    Ok(())
}
