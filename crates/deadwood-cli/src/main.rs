//! Deadwood CLI - dead-file analyzer for JavaScript/TypeScript.

mod formatters;

use anyhow::{Context, Result};
use clap::Parser;
use deadwood_config::AnalyzerConfig;
use deadwood_engine::Analyzer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "deadwood")]
#[command(about = "Find dead files in JavaScript/TypeScript projects, with confidence scores", long_about = None)]
struct Cli {
    /// Project root to analyze
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Minimum confidence for reporting a dead file (0-100)
    ///
    /// Overrides `confidence_thresholds.minimum_threshold` from the
    /// configuration file.
    #[arg(short, long, value_name = "N")]
    threshold: Option<u8>,

    /// Additional entry points (can be specified multiple times)
    #[arg(long = "entry", value_name = "PATH")]
    entry_points: Vec<PathBuf>,

    /// Configuration file path (defaults to <PATH>/.deadwood.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long = "output", value_enum, default_value = "human")]
    format: OutputFormat,

    /// Exit non-zero when any file failed to parse
    #[arg(long)]
    fail_on_errors: bool,

    /// Exit non-zero when warnings were emitted
    #[arg(long)]
    fail_on_warnings: bool,

    /// Verbose output
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = AnalyzerConfig::load(&cli.path, cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(threshold) = cli.threshold {
        config.confidence_thresholds.minimum_threshold = threshold;
    }
    config.entry_points.extend(cli.entry_points.iter().cloned());

    let analyzer = Analyzer::new(config).context("failed to initialize analyzer")?;
    let result = analyzer
        .analyze(&cli.path)
        .with_context(|| format!("analysis of {} failed", cli.path.display()))?;

    match cli.format {
        OutputFormat::Human => formatters::human::print(&result),
        OutputFormat::Json => formatters::json::print(&result),
    }

    if cli.fail_on_errors && result.errors > 0 {
        std::process::exit(2);
    }
    if cli.fail_on_warnings && result.warnings > 0 {
        std::process::exit(2);
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
