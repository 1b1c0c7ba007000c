//! CLI binary for stratos.
//!
//! A thin shim over the library crate: maps flags to `ServiceConfig`, then
//! either serves the HTTP API, runs one analysis, or renders a saved result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stratos::{
    analyze, serve, write_poster, AnalysisOutput, GuardPolicy, Ingestion, PosterStyle,
    ServiceConfig, StrategyRequest, StrategyResult, StratosError,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

// ── Status spinner ───────────────────────────────────────────────────────────

/// Terminal status for one analysis: loading, then success, error or
/// security-blocked.
struct StatusLine {
    bar: Option<ProgressBar>,
}

impl StatusLine {
    fn start(enabled: bool, message: &str) -> Self {
        if !enabled {
            return Self { bar: None };
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("PROCESSING");
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar: Some(bar) }
    }

    fn success(&self, message: &str) {
        self.finish(&green("✔ SUCCESS"), message);
    }

    fn failure(&self, err: &StratosError) {
        match err {
            StratosError::RestrictedUrl { .. } => {
                self.finish(&yellow("⛔ SECURITY"), err.public_message())
            }
            _ => self.finish(&red("✘ ERROR"), err.public_message()),
        }
    }

    fn finish(&self, prefix: &str, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
            eprintln!("{prefix}  {message}");
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP API on :3000
  stratos serve

  # Strategy for a page, poster into ./out
  stratos analyze --url https://example.com/launch --mode "Product Launch" --poster-dir out

  # Notes only, JSON on stdout
  stratos analyze --context "Acme raised a $5M seed round" --json

  # Re-render a saved result in the light style
  stratos render result.json --style light -o out

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY           Google Gemini API key (required for serve/analyze)
  STRATOS_API_BASE         Override the Gemini REST base URL
  STRATOS_MODEL_FAMILY     Model-name substring used during discovery (default: gemini)
  STRATOS_FETCH_TIMEOUT    Page fetch timeout in seconds (default: 8)
  STRATOS_PLATFORM_DOMAIN  Own deployment domain to refuse fetching (default: vercel.app)
  STRATOS_BIND             Listen address for `serve` (default: 0.0.0.0:3000)
"#;

/// Turn a web page or campaign notes into a brand strategy and poster.
#[derive(Parser, Debug)]
#[command(
    name = "stratos",
    version,
    about = "Turn a web page or campaign notes into a brand strategy and poster",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Gemini API key.
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini REST base URL.
    #[arg(long, global = true, env = "STRATOS_API_BASE")]
    api_base: Option<String>,

    /// Model-name substring required during discovery.
    #[arg(long, global = true, env = "STRATOS_MODEL_FAMILY", default_value = "gemini")]
    model_family: String,

    /// Page fetch timeout in seconds.
    #[arg(long, global = true, env = "STRATOS_FETCH_TIMEOUT", default_value_t = 8)]
    fetch_timeout: u64,

    /// Own deployment domain; it and its subdomains are never fetched.
    #[arg(long, global = true, env = "STRATOS_PLATFORM_DOMAIN")]
    platform_domain: Option<String>,

    /// Path to a text file with a custom prompt ({mode} and {source} placeholders).
    #[arg(long, global = true, env = "STRATOS_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "STRATOS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "STRATOS_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Listen address.
        #[arg(long, env = "STRATOS_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
    },
    /// Generate one strategy.
    Analyze {
        /// Source page URL.
        #[arg(long)]
        url: Option<String>,

        /// Campaign notes.
        #[arg(long)]
        context: Option<String>,

        /// Campaign objective (default: General Awareness).
        #[arg(long)]
        mode: Option<String>,

        /// Print the full AnalysisOutput as JSON.
        #[arg(long)]
        json: bool,

        /// Also render a poster into this directory.
        #[arg(long)]
        poster_dir: Option<PathBuf>,

        /// Poster style.
        #[arg(long, value_enum, default_value = "dark")]
        style: StyleArg,

        /// Disable the spinner.
        #[arg(long)]
        no_progress: bool,
    },
    /// Render a poster from a saved StrategyResult or AnalysisOutput JSON file.
    Render {
        /// JSON file.
        input: PathBuf,

        /// Poster style.
        #[arg(long, value_enum, default_value = "dark")]
        style: StyleArg,

        /// Output directory.
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum StyleArg {
    Dark,
    Light,
}

impl From<StyleArg> for PosterStyle {
    fn from(v: StyleArg) -> Self {
        match v {
            StyleArg::Dark => PosterStyle::Dark,
            StyleArg::Light => PosterStyle::Light,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters during `analyze`, so
    // library INFO logs are hidden there unless --verbose.
    let spinner_active = matches!(
        cli.command,
        Command::Analyze {
            json: false,
            no_progress: false,
            ..
        }
    ) && !cli.quiet;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || spinner_active {
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

    match &cli.command {
        Command::Serve { bind } => {
            let config = build_config(&cli).await?;
            serve(config, *bind).await.context("Server failed")?;
        }
        Command::Analyze {
            url,
            context,
            mode,
            json,
            poster_dir,
            style,
            ..
        } => {
            let config = build_config(&cli).await?;
            let request = StrategyRequest {
                url: url.clone(),
                context: context.clone(),
                mode: mode.clone(),
            };
            let status = StatusLine::start(spinner_active, "ANALYZING SOURCE…");
            let output = match analyze(&request, &config).await {
                Ok(output) => {
                    status.success("Strategy generated.");
                    output
                }
                Err(e) => {
                    status.failure(&e);
                    return Err(e).context("Analysis failed");
                }
            };

            if *json {
                let json =
                    serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
                println!("{json}");
            } else {
                print_strategy(&output);
            }

            if let Some(dir) = poster_dir {
                let path = write_poster(dir, &output.strategy, (*style).into())
                    .await
                    .context("Failed to write poster")?;
                if !cli.quiet {
                    eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
                }
            }
        }
        Command::Render {
            input,
            style,
            output_dir,
        } => {
            let strategy = load_strategy(input).await?;
            let path = write_poster(output_dir, &strategy, (*style).into())
                .await
                .context("Failed to write poster")?;
            if !cli.quiet {
                eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ServiceConfig`. Fails fast without an API key.
async fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut guard = GuardPolicy::default();
    if let Some(ref domain) = cli.platform_domain {
        guard = guard.with_platform_domain(domain);
    }

    let mut builder = ServiceConfig::builder()
        .api_key(cli.api_key.clone().unwrap_or_default())
        .model_family(&cli.model_family)
        .fetch_timeout_secs(cli.fetch_timeout)
        .guard(guard);

    if let Some(ref base) = cli.api_base {
        builder = builder.api_base(base);
    }
    if let Some(ref path) = cli.prompt_file {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template from {:?}", path))?;
        builder = builder.prompt_template(template);
    }

    builder.build().context("Invalid configuration")
}

/// Accept either a bare `StrategyResult` or a full `AnalysisOutput`.
async fn load_strategy(path: &Path) -> Result<StrategyResult> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    if let Ok(output) = serde_json::from_str::<AnalysisOutput>(&raw) {
        return Ok(output.strategy);
    }
    serde_json::from_str::<StrategyResult>(&raw)
        .with_context(|| format!("{:?} is not a strategy result", path))
}

fn print_strategy(output: &AnalysisOutput) {
    let s = &output.strategy;
    println!("{}", bold(&s.headline));
    println!();
    println!("{}", s.tweet_body);
    println!();
    println!("{}  {}", bold(&s.stats), dim(&s.stat_label.to_uppercase()));
    println!("{}", s.hashtags);
    println!("{}", dim(&format!("accent {} ({})", s.brand_color.accent_hex(), s.brand_color)));

    let source = match output.ingestion {
        Ingestion::Skipped => "notes only".to_string(),
        Ingestion::Extracted { chars } => format!("{chars} chars extracted"),
        Ingestion::Degraded { ref reason } => format!("page unavailable: {reason}"),
    };
    eprintln!(
        "{}",
        dim(&format!(
            "{}  ·  {}  ·  {}ms",
            output.model, source, output.duration_ms
        ))
    );
}
