//! Crawler module for catalog fetching and extraction
//!
//! This module contains the core scraping logic, including:
//! - HTTP transport and its retry-with-backoff decorator
//! - Page count discovery from the catalog root
//! - Item extraction from catalog pages
//! - The worker pool that fetches pages and merges their records

mod coordinator;
mod discovery;
mod fetcher;
mod parser;
mod record;
mod retry;


pub use coordinator::{AggregateCollection, Orchestrator, PageError, PageFailure, PageOutcome};
pub use discovery::{discover_page_count, page_count_from_html};
pub use fetcher::{build_http_client, FetchError, HttpTransport, Transport};
pub use parser::{parse_catalog_page, parse_price, CatalogSelectors, ItemError, ParsedPage};
pub use record::{ItemRecord, Rating};
pub use retry::{RetryPolicy, RetryingTransport};

use crate::config::Config;
use crate::ScrapeError;
use std::sync::Arc;

/// Builds the production transport: reqwest wrapped in the configured retry policy
pub fn build_transport(config: &Config) -> Result<Arc<dyn Transport>, ScrapeError> {
    let http = HttpTransport::from_config(&config.fetch, &config.user_agent)?;
    let policy = RetryPolicy::from_config(&config.fetch);
    Ok(Arc::new(RetryingTransport::new(http, policy)))
}

/// Runs a complete scrape over HTTP
///
/// This is the main entry point. It will:
/// 1. Build the HTTP transport
/// 2. Discover the page count (skipped when `pages` is given)
/// 3. Fetch and parse every page on the worker pool
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `pages` - Explicit page count; skips discovery
///
/// # Returns
///
/// * `Ok(AggregateCollection)` - Every record from the pages that could be fetched
/// * `Err(ScrapeError)` - Discovery failed, or the configuration is unusable
///
/// # Example
///
/// ```no_run
/// use shelf_scrape::config::Config;
/// use shelf_scrape::crawler::scrape;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let collection = scrape(&Config::default(), Some(2)).await?;
/// println!("{} items", collection.len());
/// # Ok(())
/// # }
/// ```
pub async fn scrape(config: &Config, pages: Option<u32>) -> Result<AggregateCollection, ScrapeError> {
    let transport = build_transport(config)?;
    scrape_with(transport, config, pages).await
}

/// Runs a complete scrape through the given transport
pub async fn scrape_with(
    transport: Arc<dyn Transport>,
    config: &Config,
    pages: Option<u32>,
) -> Result<AggregateCollection, ScrapeError> {
    let selectors = CatalogSelectors::compile(&config.selectors)?;

    let total_pages = match pages {
        Some(pages) => {
            tracing::info!("Using page count override, skipping discovery");
            pages
        }
        None => {
            discover_page_count(transport.as_ref(), &config.catalog.root_url, &selectors).await?
        }
    };
    tracing::info!("Total pages detected: {}", total_pages);

    let orchestrator = Orchestrator::new(transport, config.catalog.clone(), selectors);
    Ok(orchestrator
        .scrape_all(total_pages, config.fetch.concurrency)
        .await)
}
