//! Configuration module for Shelf-Scrape
//!
//! Settings come from built-in defaults, optionally overlaid by a TOML file,
//! and finally by command-line overrides applied in the binary.
//!
//! # Example
//!
//! ```no_run
//! use shelf_scrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shelf.toml")).unwrap();
//! println!("Scraping with {} workers", config.fetch.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CatalogConfig, Config, FetchConfig, OutputConfig, SelectorConfig, UserAgentConfig,
    PAGE_PLACEHOLDER,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
