//! Fixed-width summary table and price statistics

use crate::crawler::ItemRecord;
use crate::process::price_order;
use std::fmt::Write;

/// Printed instead of the table when nothing matched
pub const EMPTY_MESSAGE: &str = "No matching items found.";

const RULE_WIDTH: usize = 90;
const TITLE_WIDTH: usize = 47;

/// Count and price spread of a set of records
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStatistics {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl PriceStatistics {
    /// Returns `None` for an empty slice
    pub fn from_records(records: &[ItemRecord]) -> Option<Self> {
        let min = records.iter().min_by(|a, b| price_order(a, b))?.price;
        let max = records.iter().max_by(|a, b| price_order(a, b))?.price;
        let total: f64 = records.iter().map(|r| r.price).sum();

        Some(Self {
            count: records.len(),
            average: total / records.len() as f64,
            min,
            max,
        })
    }
}

/// Formats the summary table followed by the price statistics
///
/// # Arguments
///
/// * `records` - The records to show, in display order
/// * `currency` - Symbol printed in front of every price
pub fn format_summary(records: &[ItemRecord], currency: &str) -> String {
    let Some(stats) = PriceStatistics::from_records(records) else {
        return format!("{}\n", EMPTY_MESSAGE);
    };

    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "{:<4} {:<50} {:<10} {:<10} {:<5}",
        "No", "Title", "Price", "Rating", "Page"
    );
    let _ = writeln!(out, "{}", rule);

    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<50} {}{:<10.2} {:<10} {:<5}",
            i + 1,
            truncate(&record.title, TITLE_WIDTH),
            currency,
            record.price,
            record.rating.as_str(),
            record.page
        );
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Matches: {}", stats.count);
    let _ = writeln!(out, "Average Price: {}{:.2}", currency, stats.average);
    let _ = writeln!(out, "Cheapest: {}{:.2}", currency, stats.min);
    let _ = writeln!(out, "Most Expensive: {}{:.2}", currency, stats.max);

    out
}

/// Prints the summary to stdout
pub fn print_summary(records: &[ItemRecord], currency: &str) {
    println!("{}", format_summary(records, currency));
}

/// Cuts `text` to at most `width` characters
fn truncate(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
