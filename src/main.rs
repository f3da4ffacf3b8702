//! Shelf-Scrape main entry point
//!
//! This is the command-line interface for the Shelf-Scrape catalog scraper.

use clap::{Parser, ValueEnum};
use shelf_scrape::config::{load_config_with_hash, validate, Config};
use shelf_scrape::crawler::scrape;
use shelf_scrape::output::{export_csv, print_summary};
use shelf_scrape::process::{select, SortDirection};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shelf-Scrape: a concurrent product catalog scraper
///
/// Discovers how many pages the catalog has, fetches them on a bounded
/// worker pool, keeps the items whose title contains the keyword, and
/// prints and exports the matches.
#[derive(Parser, Debug)]
#[command(name = "shelf-scrape")]
#[command(version)]
#[command(about = "A concurrent product catalog scraper", long_about = None)]
struct Cli {
    /// Keyword to search for in item titles (case-insensitive)
    #[arg(long)]
    keyword: String,

    /// Number of pages to scrape; skips page count discovery
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pages: Option<u32>,

    /// Sort matches by price
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// CSV output file [default: results.csv]
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of pages fetched at once
    #[arg(long)]
    concurrency: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortDirection {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortDirection::Ascending,
            SortArg::Desc => SortDirection::Descending,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_settings(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let collection = match scrape(&config, cli.pages).await {
        Ok(collection) => collection,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    if !collection.failures().is_empty() {
        let pages: Vec<String> = collection
            .failures()
            .iter()
            .map(|failure| failure.page.to_string())
            .collect();
        tracing::warn!("Pages without results: {}", pages.join(", "));
    }

    let matches = select(
        collection.records(),
        &cli.keyword,
        cli.sort.map(SortDirection::from),
    );

    print_summary(&matches, &config.output.currency_symbol);
    export_csv(&matches, Path::new(&config.output.path))?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_scrape=info,warn"),
            1 => EnvFilter::new("shelf_scrape=debug,info"),
            2 => EnvFilter::new("shelf_scrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the effective configuration: defaults, then file, then flags
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }
    if let Some(concurrency) = cli.concurrency {
        config.fetch.concurrency = concurrency;
    }

    validate(&config)?;
    Ok(config)
}
