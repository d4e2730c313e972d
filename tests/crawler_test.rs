//! Integration tests for CatalogCrawler pagination
//!
//! Validates termination on the next-page affordance, cross-page
//! deduplication, and partial results when a page fails mid-crawl.

use meguri::crawler::{CatalogCrawler, PageFetcher};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing(items: &[(&str, &str)], has_next: bool) -> String {
    let mut html = String::from("<ul>");
    for (id, brand) in items {
        html.push_str(&format!(
            r#"<li data-product-id="{id}" data-product-brand="{brand}">item</li>"#
        ));
    }
    html.push_str("</ul>");
    if has_next {
        html.push_str(r#"<a rel="next" href="?page=next">next</a>"#);
    }
    html
}

#[tokio::test]
async fn test_crawl_follows_pagination_until_no_next() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing(&[("111", "shopa"), ("222", "shopb")], true)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[("333", "shopc")], false)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let crawler = CatalogCrawler::new(&fetcher);
    let catalog = crawler.crawl("/search").await;

    assert_eq!(catalog.len(), 3);
    assert_eq!(
        catalog.get("111").unwrap().url,
        "https://shopa.booth.pm/items/111"
    );
    assert_eq!(
        catalog.get("333").unwrap().url,
        "https://shopc.booth.pm/items/333"
    );
}

/// The same item listed on two pages collapses to one catalog entry
#[tokio::test]
async fn test_crawl_deduplicates_across_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[("111", "shopa")], true)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[("111", "shopa")], false)))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let catalog = CatalogCrawler::new(&fetcher).crawl("/search").await;

    assert_eq!(catalog.len(), 1);
}

/// A failing page ends the crawl with the partial catalog, not an error
#[tokio::test]
async fn test_crawl_returns_partial_catalog_on_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing(&[("111", "shopa"), ("222", "shopb")], true)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let catalog = CatalogCrawler::new(&fetcher).crawl("/search").await;

    assert_eq!(catalog.len(), 2);
    assert!(catalog.contains("111"));
    assert!(catalog.contains("222"));
}

/// A 404 page is treated as "no further pages"
#[tokio::test]
async fn test_crawl_stops_on_404_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let catalog = CatalogCrawler::new(&fetcher).crawl("/search").await;

    assert!(catalog.is_empty());
}
