//! Post-scrape filtering and sorting
//!
//! Pure functions over the merged records; nothing here does I/O.

use crate::crawler::ItemRecord;
use std::cmp::Ordering;

/// Price sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Keeps the records whose title contains `keyword`, ignoring case
///
/// Input order is preserved. An empty keyword keeps everything.
///
/// # Example
///
/// ```
/// use shelf_scrape::{filter_by_keyword, ItemRecord, Rating};
///
/// let books = vec![ItemRecord {
///     title: "The Lightning Thief".to_string(),
///     price: 9.99,
///     rating: Rating::Four,
///     page: 1,
/// }];
/// assert_eq!(filter_by_keyword(&books, "light").len(), 1);
/// ```
pub fn filter_by_keyword(records: &[ItemRecord], keyword: &str) -> Vec<ItemRecord> {
    let needle = keyword.to_lowercase();
    records
        .iter()
        .filter(|record| record.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Sorts records by price in place
///
/// The sort is stable in both directions: records with equal prices keep
/// their relative order.
pub fn sort_by_price(records: &mut [ItemRecord], direction: SortDirection) {
    records.sort_by(|a, b| match direction {
        SortDirection::Ascending => a.price.total_cmp(&b.price),
        SortDirection::Descending => b.price.total_cmp(&a.price),
    });
}

/// Filters, then sorts if a direction is given; no direction keeps arrival order
pub fn select(
    records: &[ItemRecord],
    keyword: &str,
    direction: Option<SortDirection>,
) -> Vec<ItemRecord> {
    let mut matches = filter_by_keyword(records, keyword);
    if let Some(direction) = direction {
        sort_by_price(&mut matches, direction);
    }
    matches
}

/// Compares two records by price only
pub fn price_order(a: &ItemRecord, b: &ItemRecord) -> Ordering {
    a.price.total_cmp(&b.price)
}
