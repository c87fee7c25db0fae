//! Doctor command - verify system requirements and configuration.

use crate::cli::output::format_size;
use crate::cli::Output;
use crate::config::{NarrationProvider, Settings, SummarizationProvider};
use console::style;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    /// Downgrade an error to a warning when the requirement is optional.
    fn required(self, required: bool) -> Self {
        if !required && self.status == CheckStatus::Error {
            Self {
                status: CheckStatus::Warning,
                ..self
            }
        } else {
            self
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    Output::header("Tubedeck Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let uses_openai = settings.summarization.provider == SummarizationProvider::OpenAI
        || settings.narration.provider == NarrationProvider::OpenAI;
    let uses_hf = settings.summarization.provider == SummarizationProvider::HuggingFace;

    let tools = vec![
        check_tool("yt-dlp", "--version", install_hint_ytdlp()),
        check_tool("ffmpeg", "-version", install_hint_ffmpeg()).required(settings.render.enabled),
        check_tool("ffprobe", "-version", install_hint_ffmpeg()).required(settings.render.enabled),
    ];
    print_section("External Tools", &tools);

    let credentials = vec![
        check_openai_api_key().required(uses_openai),
        check_hf_token().required(uses_hf),
    ];
    print_section("API Configuration", &credentials);

    let directories = check_directories(settings);
    print_section("Directories", &directories);

    let config = check_config(settings, config_path);
    print_section("Configuration", &config);

    let checks: Vec<&CheckResult> = tools
        .iter()
        .chain(&credentials)
        .chain(&directories)
        .chain(&config)
        .collect();
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using tubedeck.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! tubedeck is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_arg: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.chars().count() > 50 {
                format!("{}...", version.chars().take(50).collect::<String>())
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Show the first and last few characters of a secret.
fn mask_secret(secret: &str, head: usize) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= head + 4 {
        return "*".repeat(chars.len());
    }
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", start, end)
}

/// Check if OpenAI API key is configured.
fn check_openai_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => CheckResult::ok(
            "OPENAI_API_KEY",
            &format!("configured ({})", mask_secret(&key, 7)),
        ),
        Ok(key) if key.is_empty() => CheckResult::error(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::error(
            "OPENAI_API_KEY",
            "not set (needed for the openai providers)",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check if a HuggingFace token is configured.
fn check_hf_token() -> CheckResult {
    match std::env::var("HF_API_TOKEN") {
        Ok(token) if !token.is_empty() => CheckResult::ok(
            "HF_API_TOKEN",
            &format!("configured ({})", mask_secret(&token, 3)),
        ),
        _ => CheckResult::error(
            "HF_API_TOKEN",
            "not set (needed for summarization.provider = \"huggingface\")",
            "Set with: export HF_API_TOKEN='hf_...'",
        ),
    }
}

fn check_dir(name: &str, path: &Path) -> CheckResult {
    if path.is_dir() {
        CheckResult::ok(name, &format!("{}", path.display()))
    } else if path.exists() {
        CheckResult::error(
            name,
            &format!("{} is not a directory", path.display()),
            "Point the setting at a directory",
        )
    } else {
        CheckResult::warning(
            name,
            &format!("{} (will be created)", path.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check working and output directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = vec![
        check_dir("Temp directory", &settings.temp_dir()),
        check_dir("Output directory", &settings.output_dir()),
    ];

    if let Some(font) = &settings.render.font_file {
        let font = Settings::expand_path(font);
        results.push(match std::fs::metadata(&font) {
            Ok(meta) => CheckResult::ok(
                "Render font",
                &format!("{} ({})", font.display(), format_size(meta.len())),
            ),
            Err(_) => CheckResult::error(
                "Render font",
                &format!("{} not found", font.display()),
                "Fix render.font_file or remove it to use the ffmpeg default font",
            ),
        });
    }

    results
}

/// Check the config file and the loaded settings.
fn check_config(settings: &Settings, config_path: Option<&PathBuf>) -> Vec<CheckResult> {
    let path = config_path
        .cloned()
        .unwrap_or_else(Settings::default_config_path);

    let file = if path.exists() {
        CheckResult::ok("Config file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: tubedeck config edit",
        )
    };

    let values = match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Providers",
            &format!(
                "summarization: {}, narration: {}, video: {}",
                settings.summarization.provider,
                settings.narration.provider,
                if settings.render.enabled { "on" } else { "off" }
            ),
        ),
        Err(e) => CheckResult::error("Settings", &e.to_string(), "Fix with: tubedeck config edit"),
    };

    vec![file, values]
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
