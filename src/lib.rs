//! Shelf-Scrape: a concurrent product catalog scraper
//!
//! This crate crawls a paginated catalog over HTTP, extracts item records
//! from each page, merges the per-page results gathered by a bounded worker
//! pool, and offers filtering, sorting, and export of the merged records.

pub mod config;
pub mod crawler;
pub mod output;
pub mod process;

use thiserror::Error;

/// Main error type for Shelf-Scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page count discovery failed for {url}: {source}")]
    Discovery {
        url: String,
        source: crawler::FetchError,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector for {name}: {selector}")]
    InvalidSelector { name: &'static str, selector: String },
}

/// Result type alias for Shelf-Scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{AggregateCollection, ItemRecord, Rating};
pub use process::{filter_by_keyword, sort_by_price, SortDirection};
