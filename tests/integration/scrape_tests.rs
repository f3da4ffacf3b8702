//! Integration tests for the scraper
//!
//! These tests use wiremock to serve a fake catalog and drive the full
//! pipeline (discovery, worker pool, parsing, processing, export) over real
//! HTTP.

use shelf_scrape::config::Config;
use shelf_scrape::crawler::scrape;
use shelf_scrape::output::export_csv;
use shelf_scrape::process::select;
use shelf_scrape::{ScrapeError, SortDirection};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.catalog.root_url = format!("{}/", base_url);
    config.catalog.page_url_template = format!("{}/catalogue/page-{{page}}.html", base_url);
    config.fetch.concurrency = 3;
    config.fetch.request_timeout_secs = 1;
    config.fetch.max_retries = 2;
    config.fetch.backoff_base_ms = 5; // Very short for testing
    config
}

/// Renders a catalog page; even items are titled "The ...", odd ones "A Novel ..."
fn catalog_page(page: u32, count: usize) -> String {
    let items: String = (0..count)
        .map(|i| {
            let title = if i % 2 == 0 {
                format!("The Book {}-{}", page, i)
            } else {
                format!("A Novel {}-{}", page, i)
            };
            let price = format!("£{}.{:02}", 10 + (i * 13 + page as usize) % 50, i);
            format!(
                r#"<li class="col-xs-6"><article class="product_pod">
                    <p class="star-rating Four"><i class="icon-star"></i></p>
                    <h3><a href="book_{page}_{i}/index.html" title="{title}">{title}</a></h3>
                    <div class="product_price"><p class="price_color">{price}</p></div>
                </article></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><head><title>Catalogue</title></head><body><ol class="row">{}</ol></body></html>"#,
        items
    )
}

fn root_page(total_pages: u32) -> String {
    format!(
        r#"<html><body><ul class="pager">
            <li class="current">Page 1 of {}</li>
            <li class="next"><a href="catalogue/page-2.html">next</a></li>
        </ul></body></html>"#,
        total_pages
    )
}

async fn mount_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/catalogue/page-{}.html", page)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_with_failed_page() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(root_page(5)))
        .expect(1)
        .mount(&mock_server)
        .await;

    for page in [1, 2, 4, 5] {
        mount_page(&mock_server, page, catalog_page(page, 20)).await;
    }

    // Page 3 is gone for good; 404 is not retried
    Mock::given(method("GET"))
        .and(path("/catalogue/page-3.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let collection = scrape(&config, None).await.expect("Scrape failed");

    assert_eq!(collection.pages_requested(), 5);
    assert_eq!(collection.len(), 80);
    assert_eq!(collection.failures().len(), 1);
    assert_eq!(collection.failures()[0].page, 3);

    let matches = select(
        collection.records(),
        "the",
        Some(SortDirection::Ascending),
    );

    assert!(!matches.is_empty());
    assert!(matches.len() <= 80);
    assert_eq!(matches.len(), 40);
    assert!(matches.iter().all(|r| [1, 2, 4, 5].contains(&r.page)));
    assert!(matches.windows(2).all(|w| w[0].price <= w[1].price));
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    // First two attempts hit the 503 mock, the third falls through to the page
    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, catalog_page(1, 6)).await;

    let collection = scrape(&config, Some(1)).await.expect("Scrape failed");

    assert_eq!(collection.len(), 6);
    assert!(collection.failures().is_empty());
}

#[tokio::test]
async fn test_exhausted_retries_isolate_the_page() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    // One attempt plus max_retries (2)
    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, catalog_page(1, 4)).await;
    mount_page(&mock_server, 3, catalog_page(3, 4)).await;

    let collection = scrape(&config, Some(3)).await.expect("Scrape failed");

    assert_eq!(collection.len(), 8);
    assert_eq!(collection.failures().len(), 1);
    assert_eq!(collection.failures()[0].error.status(), Some(502));
}

#[tokio::test]
async fn test_discovery_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    // No page may be requested once discovery has failed
    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(catalog_page(1, 1)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = scrape(&config, None).await;

    match result {
        Err(ScrapeError::Discovery { source, .. }) => assert_eq!(source.status(), Some(500)),
        other => panic!("expected discovery failure, got {:?}", other.map(|c| c.len())),
    }
}

#[tokio::test]
async fn test_missing_pager_means_single_page() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Welcome</body></html>"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, catalog_page(1, 3)).await;

    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(catalog_page(2, 3)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let collection = scrape(&config, None).await.expect("Scrape failed");

    assert_eq!(collection.pages_requested(), 1);
    assert_eq!(collection.len(), 3);
}

#[tokio::test]
async fn test_slow_page_times_out_without_blocking_others() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/catalogue/page-2.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(catalog_page(2, 5))
                .set_delay(Duration::from_secs(3)),
        )
        // Timeouts are retried: one attempt plus max_retries (2)
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, 1, catalog_page(1, 5)).await;
    mount_page(&mock_server, 3, catalog_page(3, 5)).await;

    let collection = scrape(&config, Some(3)).await.expect("Scrape failed");

    assert_eq!(collection.len(), 10);
    assert_eq!(collection.failures().len(), 1);
    assert_eq!(collection.failures()[0].page, 2);
    assert_eq!(collection.failures()[0].error.status(), None);
}

#[tokio::test]
async fn test_identifying_header_is_sent() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server.uri());
    config.user_agent.value = "ShelfTest/1.0".to_string();

    Mock::given(method("GET"))
        .and(path("/catalogue/page-1.html"))
        .and(header("user-agent", "ShelfTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(catalog_page(1, 2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let collection = scrape(&config, Some(1)).await.expect("Scrape failed");
    assert_eq!(collection.len(), 2);
}

#[tokio::test]
async fn test_pool_size_does_not_change_results() {
    let mock_server = MockServer::start().await;

    for page in 1..=6 {
        mount_page(&mock_server, page, catalog_page(page, 9)).await;
    }

    let mut sequential_config = create_test_config(&mock_server.uri());
    sequential_config.fetch.concurrency = 1;
    let mut concurrent_config = create_test_config(&mock_server.uri());
    concurrent_config.fetch.concurrency = 6;

    let sort_key = |records: &[shelf_scrape::ItemRecord]| {
        let mut titles: Vec<String> = records.iter().map(|r| r.title.clone()).collect();
        titles.sort();
        titles
    };

    let sequential = scrape(&sequential_config, Some(6)).await.expect("Scrape failed");
    let concurrent = scrape(&concurrent_config, Some(6)).await.expect("Scrape failed");

    assert_eq!(sequential.len(), 54);
    assert_eq!(
        sort_key(sequential.records()),
        sort_key(concurrent.records())
    );
}

#[tokio::test]
async fn test_export_after_scrape() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    mount_page(&mock_server, 1, catalog_page(1, 4)).await;

    let collection = scrape(&config, Some(1)).await.expect("Scrape failed");
    let matches = select(collection.records(), "novel", Some(SortDirection::Descending));

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("results.csv");
    export_csv(&matches, &output).expect("Export failed");

    let content = std::fs::read_to_string(&output).expect("Failed to read export");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "title,price,rating,page");
    assert_eq!(lines.len(), 3);
    assert!(lines[1..].iter().all(|line| line.starts_with("A Novel 1-")));
    assert!(lines[1..].iter().all(|line| line.ends_with(",Four,1")));
}
