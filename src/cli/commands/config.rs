//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<&PathBuf>) -> Result<()> {
    let config_path = config_path
        .cloned()
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let updated = set_value(&settings, key, value)?;
            updated.save_to(&config_path)?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::info(&format!("Saved to {}", config_path.display()));
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => match Settings::load_from(Some(&config_path)) {
                    Ok(_) => Output::success("Config saved."),
                    Err(e) => Output::warning(&format!("Config saved but does not load: {}", e)),
                },
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Return a copy of `settings` with the dotted `key` set to `value`.
///
/// `value` is read as a TOML literal (`false`, `120`, `2.5`), falling back
/// to a plain string. Unknown keys and values that fail validation are rejected.
fn set_value(settings: &Settings, key: &str, value: &str) -> Result<Settings> {
    let path: Vec<&str> = key.split('.').map(str::trim).collect();
    if path.len() < 2 || path.iter().any(|p| p.is_empty()) {
        bail!("Expected a key like 'section.name', got '{}'", key);
    }

    let mut root = to_table(settings)?;

    let (leaf, sections) = path
        .split_last()
        .ok_or_else(|| anyhow!("Empty config key"))?;

    let mut table = &mut root;
    for section in sections {
        table = match table.get_mut(*section) {
            Some(toml::Value::Table(inner)) => inner,
            _ => bail!("Unknown config section '{}' in '{}'", section, key),
        };
    }

    let parsed = match table.get(*leaf) {
        Some(toml::Value::String(_)) => toml::Value::String(value.to_string()),
        _ => parse_literal(value),
    };
    table.insert(leaf.to_string(), parsed);

    let updated: Settings = toml::Value::Table(root)
        .try_into()
        .map_err(|e| anyhow!("Invalid value for {}: {}", key, e))?;
    updated.validate()?;

    // serde ignores unknown fields, so check the key survived the round trip.
    let check = to_table(&updated)?;
    let mut node = check.get(path[0]);
    for part in &path[1..] {
        node = node.and_then(|v| v.get(*part));
    }
    if node.is_none() {
        bail!("Unknown config key '{}'", key);
    }

    Ok(updated)
}

fn to_table(settings: &Settings) -> Result<toml::Table> {
    match toml::Value::try_from(settings) {
        Ok(toml::Value::Table(table)) => Ok(table),
        Ok(_) => bail!("Config did not serialize to a table"),
        Err(e) => Err(anyhow!("Failed to serialize config: {}", e)),
    }
}

fn parse_literal(value: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("v = {}", value))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| toml::Value::String(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SummarizationProvider;

    #[test]
    fn test_set_bool_and_number() {
        let settings = Settings::default();
        let updated = set_value(&settings, "render.enabled", "false").unwrap();
        assert!(!updated.render.enabled);

        let updated = set_value(&updated, "summarization.max_words", "120").unwrap();
        assert_eq!(updated.summarization.max_words, 120);
        assert!(!updated.render.enabled);
    }

    #[test]
    fn test_set_enum_and_string() {
        let settings = Settings::default();
        let updated = set_value(&settings, "summarization.provider", "huggingface").unwrap();
        assert_eq!(updated.summarization.provider, SummarizationProvider::HuggingFace);

        let updated = set_value(&updated, "deck.slide_title", "42").unwrap();
        assert_eq!(updated.deck.slide_title, "42");
    }

    #[test]
    fn test_set_optional_field() {
        let updated = set_value(&Settings::default(), "render.font_file", "/fonts/a.ttf").unwrap();
        assert_eq!(updated.render.font_file.as_deref(), Some("/fonts/a.ttf"));
    }

    #[test]
    fn test_set_rejects_unknown_keys() {
        let settings = Settings::default();
        assert!(set_value(&settings, "render.nope", "1").is_err());
        assert!(set_value(&settings, "nope.value", "1").is_err());
        assert!(set_value(&settings, "render", "1").is_err());
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let settings = Settings::default();
        assert!(set_value(&settings, "render.fps", "fast").is_err());
        assert!(set_value(&settings, "summarization.min_words", "500").is_err());
        assert!(set_value(&settings, "narration.language", "de").is_err());
        assert!(set_value(&settings, "summarization.max_input_words", "100").is_err());
        assert!(set_value(&settings, "server.max_runs", "0").is_err());
    }

    #[test]
    fn test_set_input_window() {
        let updated =
            set_value(&Settings::default(), "summarization.max_input_words", "400").unwrap();
        assert_eq!(updated.summarization.max_input_words, 400);
    }
}
