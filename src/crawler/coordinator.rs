//! Fetch orchestrator - concurrent page scraping and aggregation
//!
//! A fixed pool of workers drains a shared queue of page numbers. Each worker
//! fetches and parses one page at a time and reports the outcome over a
//! channel; the orchestrator is the only reader of that channel and the only
//! owner of the aggregate, so merging needs no lock.
//!
//! A page that cannot be fetched contributes no records and never stops the
//! other pages. Every requested page ends up either parsed or listed as a
//! failure, including a page whose task panicked.

use crate::config::CatalogConfig;
use crate::crawler::fetcher::{FetchError, Transport};
use crate::crawler::parser::{parse_catalog_page, CatalogSelectors};
use crate::crawler::record::ItemRecord;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Why a page contributed no records
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The page task died before producing an outcome
    #[error("Page task aborted: {0}")]
    Aborted(String),
}

impl PageError {
    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            PageError::Fetch(error) => error.status(),
            PageError::Aborted(_) => None,
        }
    }
}

/// A page whose fetch failed for good
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page: u32,
    pub error: PageError,
}

/// Result of one page task, reported by value
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// Page fetched and parsed (possibly with zero records)
    Parsed { page: u32, records: Vec<ItemRecord> },

    /// Page could not be fetched, or its task died
    Failed(PageFailure),
}

/// Every record gathered in one run, in arrival order
///
/// Arrival order depends on task timing; treat the records as a multiset.
/// The collection is read-only once returned by the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct AggregateCollection {
    records: Vec<ItemRecord>,
    failures: Vec<PageFailure>,
    pages_requested: u32,
}

impl AggregateCollection {
    fn with_pages(pages_requested: u32) -> Self {
        Self {
            pages_requested,
            ..Self::default()
        }
    }

    /// Appends one page's outcome as a whole
    fn merge(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Parsed { records, .. } => self.records.extend(records),
            PageOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    pub fn records(&self) -> &[ItemRecord] {
        &self.records
    }

    /// Pages that contributed nothing because their fetch failed
    pub fn failures(&self) -> &[PageFailure] {
        &self.failures
    }

    pub fn pages_requested(&self) -> u32 {
        self.pages_requested
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Everything a page task needs, shared read-only by the workers
struct PageContext {
    transport: Arc<dyn Transport>,
    catalog: CatalogConfig,
    selectors: CatalogSelectors,
}

impl PageContext {
    async fn scrape_page(&self, page: u32) -> PageOutcome {
        let url = self.catalog.page_url(page);
        tracing::info!("Scraping page {}", page);

        match self.transport.get(&url).await {
            Ok(body) => {
                let parsed = parse_catalog_page(page, &body, &self.selectors);
                PageOutcome::Parsed {
                    page,
                    records: parsed.records,
                }
            }
            Err(error) => {
                tracing::error!("Failed to fetch page {}: {}", page, error);
                PageOutcome::Failed(PageFailure {
                    page,
                    error: error.into(),
                })
            }
        }
    }
}

/// Dispatches page tasks across a bounded worker pool
pub struct Orchestrator {
    context: Arc<PageContext>,
}

impl Orchestrator {
    /// Creates an orchestrator
    ///
    /// # Arguments
    ///
    /// * `transport` - Transport used for every page (normally a `RetryingTransport`)
    /// * `catalog` - Catalog settings; supplies the page URL template
    /// * `selectors` - Compiled selectors for the item markup
    pub fn new(
        transport: Arc<dyn Transport>,
        catalog: CatalogConfig,
        selectors: CatalogSelectors,
    ) -> Self {
        Self {
            context: Arc::new(PageContext {
                transport,
                catalog,
                selectors,
            }),
        }
    }

    /// Scrapes pages `1..=total_pages` with at most `concurrency` in flight
    ///
    /// Returns once every page has reported, successful or not.
    pub async fn scrape_all(&self, total_pages: u32, concurrency: u32) -> AggregateCollection {
        let mut collection = AggregateCollection::with_pages(total_pages);
        if total_pages == 0 {
            return collection;
        }

        let start_time = Instant::now();
        let workers = concurrency.clamp(1, total_pages);

        // Queue every page up front, then close it so idle workers exit
        let (page_tx, page_rx) = mpsc::channel(total_pages as usize);
        for page in 1..=total_pages {
            // Capacity equals the page count, so this never waits
            let _ = page_tx.try_send(page);
        }
        drop(page_tx);
        let queue = Arc::new(Mutex::new(page_rx));

        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            pool.spawn(run_worker(
                worker_id,
                Arc::clone(&queue),
                result_tx.clone(),
                Arc::clone(&self.context),
            ));
        }
        drop(result_tx);

        tracing::debug!("Dispatched {} pages across {} workers", total_pages, workers);

        while let Some(outcome) = result_rx.recv().await {
            collection.merge(outcome);
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Page worker stopped unexpectedly: {}", e);
            }
        }

        tracing::info!(
            "Total items scraped: {} from {} pages ({} failed) in {:?}",
            collection.len(),
            total_pages,
            collection.failures().len(),
            start_time.elapsed()
        );

        collection
    }
}

/// Pulls pages off the shared queue until it is empty
async fn run_worker(
    worker_id: u32,
    queue: Arc<Mutex<mpsc::Receiver<u32>>>,
    results: mpsc::UnboundedSender<PageOutcome>,
    context: Arc<PageContext>,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(page) = next else {
            break;
        };

        tracing::trace!("Worker {} took page {}", worker_id, page);

        // A panic inside the page task fails that page, not the worker
        let task_context = Arc::clone(&context);
        let task = tokio::spawn(async move { task_context.scrape_page(page).await });
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Page {} task stopped unexpectedly: {}", page, e);
                PageOutcome::Failed(PageFailure {
                    page,
                    error: PageError::Aborted(e.to_string()),
                })
            }
        };

        if results.send(outcome).is_err() {
            break;
        }
    }
}
