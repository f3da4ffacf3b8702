//! Catalog page parser
//!
//! This module turns the markup of one catalog page into item records.
//! Each item element is handled on its own: a malformed item is rejected and
//! logged, and the remaining items on the page are still extracted.

use crate::config::SelectorConfig;
use crate::crawler::record::{ItemRecord, Rating};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Why a single catalog item was dropped
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("missing title")]
    MissingTitle,

    #[error("missing price")]
    MissingPrice,

    #[error("invalid price format: {0:?}")]
    InvalidPrice(String),

    #[error("missing rating")]
    MissingRating,

    #[error("unknown rating label: {0:?}")]
    UnknownRating(String),
}

/// Compiled selectors for the catalog markup
#[derive(Debug, Clone)]
pub struct CatalogSelectors {
    item: Selector,
    title: Selector,
    price: Selector,
    rating: Selector,
    pager: Selector,
}

impl CatalogSelectors {
    /// Compiles the configured selectors
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        let parse = |name: &'static str, selector: &str| {
            Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
                name,
                selector: selector.to_string(),
            })
        };

        Ok(Self {
            item: parse("item", &config.item)?,
            title: parse("title", &config.title)?,
            price: parse("price", &config.price)?,
            rating: parse("rating", &config.rating)?,
            pager: parse("pager", &config.pager)?,
        })
    }

    pub fn pager(&self) -> &Selector {
        &self.pager
    }
}

impl Default for CatalogSelectors {
    fn default() -> Self {
        // The built-in selectors are valid CSS
        Self::compile(&SelectorConfig::default()).expect("default selectors compile")
    }
}

/// Records and rejections extracted from one page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    pub records: Vec<ItemRecord>,

    /// One entry per dropped item, in document order
    pub rejected: Vec<ItemError>,
}

/// Parses a catalog page into item records
///
/// Never fails as a whole; every rejected item is logged at warning level
/// and reported in `ParsedPage::rejected`.
///
/// # Arguments
///
/// * `page` - 1-based page number, stamped on every record
/// * `body` - Raw page bytes (decoded as UTF-8, lossily)
/// * `selectors` - Compiled catalog selectors
///
/// # Example
///
/// ```
/// use shelf_scrape::crawler::{parse_catalog_page, CatalogSelectors};
///
/// let html = r#"<article class="product_pod">
///     <p class="star-rating Four"></p>
///     <h3><a title="Sapiens">Sapiens</a></h3>
///     <p class="price_color">£54.23</p>
/// </article>"#;
/// let parsed = parse_catalog_page(2, html.as_bytes(), &CatalogSelectors::default());
/// assert_eq!(parsed.records.len(), 1);
/// assert_eq!(parsed.records[0].price, 54.23);
/// ```
pub fn parse_catalog_page(page: u32, body: &[u8], selectors: &CatalogSelectors) -> ParsedPage {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let mut parsed = ParsedPage::default();
    for item in document.select(&selectors.item) {
        match extract_item(item, page, selectors) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                tracing::warn!("Dropped item on page {}: {}", page, e);
                parsed.rejected.push(e);
            }
        }
    }

    tracing::debug!(
        "Page {}: {} records, {} rejected",
        page,
        parsed.records.len(),
        parsed.rejected.len()
    );

    parsed
}

fn extract_item(
    item: ElementRef<'_>,
    page: u32,
    selectors: &CatalogSelectors,
) -> Result<ItemRecord, ItemError> {
    let title = item
        .select(&selectors.title)
        .next()
        .and_then(|link| link.value().attr("title"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ItemError::MissingTitle)?
        .to_string();

    let price_text = item
        .select(&selectors.price)
        .next()
        .map(|element| element.text().collect::<String>())
        .ok_or(ItemError::MissingPrice)?;
    let price = parse_price(&price_text)?;

    let label = item
        .select(&selectors.rating)
        .next()
        .and_then(|element| element.value().attr("class"))
        .and_then(|class| class.split_whitespace().nth(1))
        .ok_or(ItemError::MissingRating)?;
    let rating = label.parse::<Rating>().map_err(ItemError::UnknownRating)?;

    Ok(ItemRecord {
        title,
        price,
        rating,
        page,
    })
}

/// Parses a display price by keeping only digits and decimal points
///
/// # Example
///
/// ```
/// use shelf_scrape::crawler::parse_price;
///
/// assert_eq!(parse_price("£51.77"), Ok(51.77));
/// assert!(parse_price("free").is_err());
/// ```
pub fn parse_price(text: &str) -> Result<f64, ItemError> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return Err(ItemError::InvalidPrice(text.trim().to_string()));
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| ItemError::InvalidPrice(text.trim().to_string()))
}
