use serde::Deserialize;
use std::time::Duration;

/// Placeholder replaced by the page number in `page-url-template`
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Main configuration structure for Shelf-Scrape
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the defaults below, which target the public books catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Where the catalog lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog root, fetched once to discover the page count
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// URL of a single catalog page, with `{page}` standing for the 1-based index
    #[serde(rename = "page-url-template")]
    pub page_url_template: String,
}

impl CatalogConfig {
    /// Builds the URL of the given 1-based catalog page
    pub fn page_url(&self, page: u32) -> String {
        self.page_url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root_url: "http://books.toscrape.com/".to_string(),
            page_url_template: "http://books.toscrape.com/catalogue/page-{page}.html".to_string(),
        }
    }
}

/// Fetch behavior: pool size, timeouts and retry policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Number of page workers running at once
    pub concurrency: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Retries after the first attempt on a transient status
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// First backoff delay (milliseconds); doubles on each further retry
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Status codes considered transient
    #[serde(rename = "retry-statuses")]
    pub retry_statuses: Vec<u16>,
}

impl FetchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            request_timeout_secs: 10,
            max_retries: 3,
            backoff_base_ms: 1000,
            retry_statuses: vec![500, 502, 503, 504],
        }
    }
}

/// Identifying header sent with every request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
        }
    }
}

/// CSS selectors describing the catalog markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One element per catalog item
    pub item: String,

    /// Link carrying the full title in its `title` attribute (relative to item)
    pub title: String,

    /// Element holding the display price (relative to item)
    pub price: String,

    /// Element whose second class token is the rating label (relative to item)
    pub rating: String,

    /// Pager indicator on the root page, e.g. "Page 1 of 50"
    pub pager: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item: "article.product_pod".to_string(),
            title: "h3 a".to_string(),
            price: "p.price_color".to_string(),
            rating: "p.star-rating".to_string(),
            pager: "li.current".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV export
    pub path: String,

    /// Symbol printed in front of prices in the summary table
    #[serde(rename = "currency-symbol")]
    pub currency_symbol: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "results.csv".to_string(),
            currency_symbol: "£".to_string(),
        }
    }
}
