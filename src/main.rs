//! Tubedeck CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubedeck::cli::{commands, Cli, Commands};
use tubedeck::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubedeck={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_deref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Search { query, limit } => {
            commands::run_search(query, *limit, settings).await?;
        }

        Commands::Run {
            query,
            video,
            output_dir,
            no_render,
        } => {
            commands::run_session(
                query.clone(),
                video.clone(),
                output_dir.clone(),
                *no_render,
                settings,
            )
            .await?;
        }

        Commands::Transcript { video, format } => {
            commands::run_transcript(video, format, settings).await?;
        }

        Commands::Deck { file, output } => {
            commands::run_deck(file, output, &settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, config_path.as_ref())?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path.as_ref())?;
        }
    }

    Ok(())
}
