//! Output module for reporting and exporting scraped records
//!
//! This module handles:
//! - Price statistics over the selected records
//! - The fixed-width summary table printed after a run
//! - CSV export

mod csv_export;
mod summary;

pub use csv_export::{export_csv, write_csv};
pub use summary::{format_summary, print_summary, PriceStatistics, EMPTY_MESSAGE};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
