//! MarketLens CLI: analyze symbols and report service metadata.
//!
//! Commands:
//! - `analyze`: run the inference pipeline for one or more symbols, one JSON report each
//! - `info`: print engine status and version as JSON
//!
//! Reports go to stdout; logs go to stderr.

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use marketlens_core::data::SyntheticProvider;
use marketlens_runner::{AppConfig, EngineInfo, Orchestrator};

#[derive(Parser)]
#[command(
    name = "marketlens",
    version,
    about = "MarketLens: equity market intelligence from price data and LLM reasoning"
)]
struct Cli {
    /// Path to a TOML config file. Environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze symbols and print one JSON report per symbol.
    Analyze {
        /// NSE symbols (e.g., RELIANCE TCS INFY).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Directory of {SYMBOL}.csv files, tried after the HTTP vendors.
        #[arg(long)]
        csv_dir: Option<PathBuf>,

        /// Fall back to deterministic synthetic data. Development only.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Number of synthetic bars to generate.
        #[arg(long, default_value_t = 500)]
        synthetic_bars: usize,

        /// Pretty-print JSON.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Print engine status, version and configured model.
    Info,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::setup_logger(cli.verbose);

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Analyze {
            symbols,
            csv_dir,
            synthetic,
            synthetic_bars,
            pretty,
        } => run_analyze(config, symbols, csv_dir, synthetic, synthetic_bars, pretty),
        Commands::Info => run_info(&config),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::default(),
    }
    .with_env();
    config.validate()?;
    Ok(config)
}

fn build_orchestrator(
    config: &AppConfig,
    synthetic: bool,
    synthetic_bars: usize,
) -> Result<Orchestrator> {
    let mut orchestrator = Orchestrator::from_config(config)?;
    if synthetic {
        tracing::warn!("synthetic data fallback enabled");
        let today = chrono::Local::now().date_naive();
        orchestrator =
            orchestrator.with_provider(Box::new(SyntheticProvider::new(today, synthetic_bars)));
    }

    tracing::info!(
        providers = ?orchestrator.collector().provider_names(),
        model = orchestrator.model(),
        "pipeline ready"
    );

    Ok(orchestrator)
}

fn run_analyze(
    mut config: AppConfig,
    symbols: Vec<String>,
    csv_dir: Option<PathBuf>,
    synthetic: bool,
    synthetic_bars: usize,
    pretty: bool,
) -> Result<()> {
    if csv_dir.is_some() {
        config.vendors.csv_dir = csv_dir;
    }
    let orchestrator = build_orchestrator(&config, synthetic, synthetic_bars)?;

    let symbols: Vec<String> = symbols
        .iter()
        .map(|s| s.trim().to_ascii_uppercase())
        .collect();
    let reports = orchestrator.analyze_many(&symbols);

    let mut failed = 0;
    for report in &reports {
        let line = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        println!("{line}");
        if !report.is_success() {
            failed += 1;
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} analyses failed", reports.len());
        std::process::exit(1);
    }

    Ok(())
}

fn run_info(config: &AppConfig) -> Result<()> {
    let info = EngineInfo::new(config.reasoning.model.clone());
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
