//! Page count discovery
//!
//! One request to the catalog root; the pager indicator ("Page 1 of 50")
//! carries the total page count as its last token.

use crate::crawler::fetcher::Transport;
use crate::crawler::parser::CatalogSelectors;
use crate::ScrapeError;
use scraper::Html;

/// Fetches the catalog root and returns the total page count
///
/// A failed fetch is fatal: there is nothing to infer the page count from.
/// A root page without a pager is treated as a single-page catalog.
pub async fn discover_page_count(
    transport: &dyn Transport,
    root_url: &str,
    selectors: &CatalogSelectors,
) -> Result<u32, ScrapeError> {
    tracing::debug!("Discovering page count from {}", root_url);

    let body = transport
        .get(root_url)
        .await
        .map_err(|source| ScrapeError::Discovery {
            url: root_url.to_string(),
            source,
        })?;

    Ok(page_count_from_html(
        &String::from_utf8_lossy(&body),
        selectors,
    ))
}

/// Extracts the page count from the pager indicator, defaulting to 1
pub fn page_count_from_html(html: &str, selectors: &CatalogSelectors) -> u32 {
    let document = Html::parse_document(html);

    let Some(pager) = document.select(selectors.pager()).next() else {
        tracing::debug!("No pager found, assuming a single page");
        return 1;
    };

    let text = pager.text().collect::<String>();
    match text.split_whitespace().last().map(str::parse::<u32>) {
        Some(Ok(count)) if count > 0 => count,
        _ => {
            tracing::warn!(
                "Unreadable pager text {:?}, assuming a single page",
                text.trim()
            );
            1
        }
    }
}
