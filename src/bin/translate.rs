//! CLI binary for notebook-translator.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `TranslationConfig` and prints results.

use anyhow::{bail, Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use notebook_translator::config::{DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_SUFFIX};
use notebook_translator::labels::supported_languages;
use notebook_translator::{
    output_path_for, translate_notebook, CellKind, CellReport, ModelSettings, ProgressCallback,
    TranslationConfig, TranslationProgressCallback,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live progress bar with one log line per processed cell.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Loading notebook…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl TranslationProgressCallback for CliProgressCallback {
    fn on_translation_start(&self, total_cells: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} cells  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_cells as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Translating");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_cells} cells…"))
        ));
    }

    fn on_cell_start(&self, index: usize, _total: usize, kind: &CellKind) {
        self.bar.set_message(format!("cell {} ({kind})", index + 1));
    }

    fn on_cell_complete(&self, index: usize, total: usize, report: &CellReport) {
        let mark = if report.outcome.has_failures() {
            yellow("⚠")
        } else {
            green("✓")
        };
        self.bar.println(format!(
            "  {} Cell {:>3}/{:<3}  {:<9} {}",
            mark,
            index + 1,
            total,
            report.kind,
            dim(&report.outcome.summary()),
        ));
        self.bar.inc(1);
    }

    fn on_translation_complete(&self, _total_cells: usize, _processed: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Translate to Chinese (default)
  translate notebook.ipynb

  # Translate to Spanish, overwrite without asking
  translate notebook.ipynb -t Spanish --yes

  # Check the model configuration
  translate --check-config

CONFIGURATION:
  Settings are read from translate.toml in the working directory (or the
  file given with --config) and overridden by environment variables, which
  may also come from a .env file:

  API_KEY          API key for the model endpoint
  MODEL_NAME       Model identifier, e.g. google/gemini-2.5-flash
  MODEL_BASE_URL   OpenAI-compatible base URL, e.g. https://openrouter.ai/api/v1

  translate.toml:
    api_key = "sk-..."
    model_name = "google/gemini-2.5-flash"
    base_url = "https://openrouter.ai/api/v1"

OUTPUT:
  notebook.ipynb is translated to notebook_translated.ipynb in the same
  directory. Markdown sections keep their original text followed by a
  translation; images get a description; code cells get comments.
"#;

/// Translate Jupyter notebooks with a language model.
#[derive(Parser, Debug)]
#[command(
    name = "translate",
    version,
    disable_version_flag = true,
    about = "Translate Jupyter notebooks with a language model",
    long_about = "Translate the markdown of a Jupyter notebook, describe its images and comment \
its code in a target language, using any OpenAI-compatible chat completions endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Notebook to translate (.ipynb).
    #[arg(required_unless_present = "check_config")]
    input: Option<PathBuf>,

    /// Target language name, passed to the model as written.
    #[arg(short = 't', long, default_value = "Chinese")]
    target_language: String,

    /// Validate the model configuration and exit.
    #[arg(short = 'c', long)]
    check_config: bool,

    /// Print version.
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,

    /// TOML file with api_key / model_name / base_url.
    #[arg(long, env = "TRANSLATE_CONFIG")]
    config: Option<PathBuf>,

    /// Overwrite an existing output file without asking.
    #[arg(short = 'y', long)]
    yes: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(long)]
    verbose: bool,

    /// Remote image fetch timeout in seconds.
    #[arg(long, default_value_t = 30)]
    fetch_timeout: u64,

    /// Per-call model timeout in seconds.
    #[arg(long, default_value_t = 120)]
    api_timeout: u64,

    /// Model temperature (0.0–2.0).
    #[arg(long, default_value_t = 0.3)]
    temperature: f32,
}

/// Parse arguments; help and version exit 0, every usage error exits 1.
fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => {
            let _ = e.print();
            std::process::exit(1);
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = parse_cli();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar carries the per-cell feedback; keep library logs quiet.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.check_config;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Configuration ────────────────────────────────────────────────────
    let settings = load_settings(cli.config.as_deref())?;
    let resolved = settings.validate().context("Configuration error")?;

    if cli.check_config {
        println!("{} Configuration is valid", green("✔"));
        println!("  Base URL: {}", resolved.base_url);
        println!("  Model:    {}", resolved.model_name);
        println!("  API Key:  {}", resolved.masked_api_key());
        return Ok(());
    }

    // ── Input ────────────────────────────────────────────────────────────
    let Some(input) = cli.input.as_deref() else {
        bail!("No input notebook given");
    };
    if !input.exists() {
        bail!("Input file not found: '{}'", input.display());
    }
    let is_notebook = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ipynb"));
    if !is_notebook {
        bail!("Input must be a .ipynb file: '{}'", input.display());
    }

    let output_path = output_path_for(input, DEFAULT_OUTPUT_SUFFIX);
    if output_path.exists() && !cli.yes && !confirm_overwrite(&output_path)? {
        bail!("Translation cancelled");
    }

    if !cli.quiet {
        let known = supported_languages()
            .iter()
            .any(|lang| lang.eq_ignore_ascii_case(cli.target_language.trim()));
        eprintln!(
            "{} {} → {}{}",
            cyan("◆"),
            bold(&input.display().to_string()),
            bold(&cli.target_language),
            if known {
                String::new()
            } else {
                dim("  (labels in English)")
            }
        );
        eprintln!("  {} {}", dim("Model:"), resolved.model_name);
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn TranslationProgressCallback>)
    } else {
        None
    };

    let mut builder = TranslationConfig::builder()
        .target_language(cli.target_language.clone())
        .settings(settings)
        .fetch_timeout_secs(cli.fetch_timeout)
        .api_timeout_secs(cli.api_timeout)
        .temperature(cli.temperature);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid options")?;

    let output = translate_notebook(input, &config)
        .await
        .context("Translation failed")?;

    if !cli.quiet {
        let stats = &output.stats;
        let with_fallbacks = output
            .reports
            .iter()
            .filter(|r| r.outcome.has_failures())
            .count();
        eprintln!(
            "{}  {} cells  {}ms  →  {}",
            if with_fallbacks == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            output.cells,
            stats.total_duration_ms,
            bold(&output.output_path.display().to_string()),
        );
        eprintln!(
            "   {} sections translated, {} images described, {} code cells commented",
            dim(&stats.sections_translated.to_string()),
            dim(&stats.images_described.to_string()),
            dim(&stats.code_cells_annotated.to_string()),
        );
        if with_fallbacks > 0 {
            eprintln!(
                "   {} cells kept some original content (run with --verbose for details)",
                yellow(&with_fallbacks.to_string())
            );
        }
    }

    Ok(())
}

/// Settings file (explicit, or `translate.toml` when present) overlaid with
/// the environment. A `.env` file, if found, is loaded into the environment
/// first without replacing variables already set.
fn load_settings(explicit: Option<&Path>) -> Result<ModelSettings> {
    let _ = dotenvy::dotenv();

    let from_file = match explicit {
        Some(path) => ModelSettings::from_toml_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                ModelSettings::from_toml_file(default)
                    .with_context(|| format!("Failed to load {DEFAULT_CONFIG_FILE}"))?
            } else {
                ModelSettings::default()
            }
        }
    };
    Ok(from_file.overlay(ModelSettings::from_env()))
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    eprint!(
        "Output file '{}' already exists. Overwrite? (y/N): ",
        path.display()
    );
    io::stderr().flush().ok();

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
