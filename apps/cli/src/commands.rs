//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use ballot_core::{Extraction, ProgressReporter};
use ballot_fetch::{CachedSource, DiskCache, DocumentSource, FileSource, HttpSource};
use ballot_shared::{
    AppConfig, BallotError, ExtractConfig, config_dir, init_config, load_config,
    load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Ballot: candidate records from the election article.
#[derive(Parser)]
#[command(
    name = "ballot",
    version,
    about = "Extract presidential candidate records from the election article into JSON.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.ballot/ballot.toml.
    #[arg(long, env = "BALLOT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract candidate records and write them as JSON.
    Extract {
        /// Output file.
        #[arg(short, long, default_value = "candidates.json")]
        out: PathBuf,

        /// Read the election page from this file instead of fetching it.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Serve every document from this directory of cached pages; no network.
        #[arg(long, conflicts_with = "no_cache")]
        offline: Option<PathBuf>,

        /// Always fetch, bypassing the on-disk cache.
        #[arg(long)]
        no_cache: bool,

        /// Maximum concurrent biography fetches.
        #[arg(short, long)]
        concurrency: Option<u32>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "ballot=info",
        1 => "ballot=debug",
        _ => "ballot=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    let resolve_config = || -> Result<AppConfig> {
        Ok(match &config_path {
            Some(path) => load_config_from(path)?,
            None => load_config()?,
        })
    };

    match cli.command {
        Command::Extract {
            out,
            input,
            offline,
            no_cache,
            concurrency,
        } => {
            let options = ExtractOptions {
                out,
                input,
                offline,
                no_cache,
                concurrency,
            };
            cmd_extract(&resolve_config()?, options).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&resolve_config()?),
        },
    }
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

struct ExtractOptions {
    out: PathBuf,
    input: Option<PathBuf>,
    offline: Option<PathBuf>,
    no_cache: bool,
    concurrency: Option<u32>,
}

async fn cmd_extract(app: &AppConfig, options: ExtractOptions) -> Result<()> {
    let mut config = ExtractConfig::try_from(app)?;
    if let Some(concurrency) = options.concurrency {
        config.concurrency = concurrency.max(1);
    }

    info!(
        url = %config.election_url,
        concurrency = config.concurrency,
        "extracting candidates"
    );

    let input = options.input.as_deref();
    let extraction = if let Some(dir) = &options.offline {
        extract_with(&config, FileSource::new(dir), input).await?
    } else {
        let http = HttpSource::new(Duration::from_secs(app.fetch.timeout_secs))?;
        if options.no_cache || !app.fetch.cache {
            extract_with(&config, http, input).await?
        } else {
            let dir = match &app.fetch.cache_dir {
                Some(dir) => PathBuf::from(dir),
                None => config_dir()?.join("cache"),
            };
            let cache = DiskCache::open(&dir)?;
            info!(cache = %dir.display(), "using document cache");
            extract_with(&config, CachedSource::new(http, cache), input).await?
        }
    };

    let json = serde_json::to_string_pretty(&extraction.candidates)?;
    std::fs::write(&options.out, json)
        .wrap_err_with(|| format!("failed to write {}", options.out.display()))?;

    print_summary(&extraction, &options.out);
    Ok(())
}

/// Run the pipeline over `source`, starting from a local page when given.
async fn extract_with<S>(
    config: &ExtractConfig,
    source: S,
    input: Option<&Path>,
) -> Result<Extraction>
where
    S: DocumentSource + 'static,
{
    let reporter = CliProgress::new();
    let source = Arc::new(source);

    let extraction = match input {
        Some(path) => {
            let markup = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            ballot_core::extract_page(&markup, source, config, &reporter).await
        }
        None => ballot_core::run(config, source, &reporter).await,
    };

    // Structural failures leave the spinner running.
    reporter.spinner.finish_and_clear();
    extraction.map_err(explain_failure)
}

/// Attach a hint to run-level failures caused by the page layout.
fn explain_failure(err: BallotError) -> Report {
    if err.is_structural() {
        Report::new(err)
            .wrap_err("election page layout not recognized; check [[sections]] headings")
    } else {
        Report::new(err)
    }
}

fn print_summary(extraction: &Extraction, out: &Path) {
    println!();
    println!("  Candidates extracted!");
    for (label, records) in &extraction.candidates {
        println!("  {label:<12} {}", records.len());
    }
    println!("  Output:      {}", out.display());
    println!("  Time:        {:.1}s", extraction.elapsed.as_secs_f64());

    if !extraction.failures.is_empty() {
        println!();
        println!("  {} issue(s):", extraction.failures.len());
        for failure in &extraction.failures {
            let who = failure.id.as_deref().unwrap_or("(unnamed)");
            println!(
                "    {} row {} {who}: {}",
                failure.section, failure.row, failure.error
            );
        }
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn section_found(&self, label: &str, rows: usize) {
        self.spinner.set_message(format!("Found {rows} {label} row(s)"));
    }

    fn record_done(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Biographies [{current}/{total}] {name}"));
    }

    fn done(&self, _extraction: &Extraction) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    if config.sections.is_empty() {
        return Err(eyre!("no [[sections]] configured; extraction would fail"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_failures_get_a_hint() {
        let report = explain_failure(BallotError::SectionNotFound {
            heading: "Green Party".into(),
        });
        assert!(report.to_string().contains("layout not recognized"));
        assert!(format!("{report:?}").contains("Green Party"));
    }

    #[test]
    fn fetch_failures_are_reported_as_is() {
        let report = explain_failure(BallotError::fetch("https://example.org", "HTTP 503"));
        assert!(!report.to_string().contains("layout"));
        assert!(report.to_string().contains("HTTP 503"));
    }
}
