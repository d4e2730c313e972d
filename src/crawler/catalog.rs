//! Paginated catalog crawler for Booth search results
//!
//! Walks a search URL page by page, collecting every listed item into a
//! deduplicated [`Catalog`]. Listing pages mark items with
//! `data-product-id` (and usually `data-product-brand`) attributes; the
//! crawler rebuilds canonical item URLs from those rather than scraping
//! anchor hrefs, which vary between layouts.
//!
//! A fetch failure ends the crawl early and returns whatever was collected
//! so far — a partial catalog still produces a useful diff.

use lazy_static::lazy_static;
use scraper::{Html, Selector};

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::url::canonical_item_url;
use crate::models::Catalog;

lazy_static! {
    static ref PRODUCT_SELECTOR: Selector =
        Selector::parse("[data-product-id]").expect("Invalid CSS selector: [data-product-id]");
    static ref NEXT_PAGE_SELECTOR: Selector =
        Selector::parse("a[rel=next]").expect("Invalid CSS selector: a[rel=next]");
}

/// Entries scraped from a single listing page
#[derive(Debug)]
pub struct ListingPage {
    /// `(item_id, canonical_url)` pairs in document order
    pub entries: Vec<(String, String)>,
    /// Whether the page advertises a further page
    pub has_next: bool,
}

/// Parse one search-result page into catalog entries
///
/// Pure HTML work, exposed separately so it can be tested against fixture
/// strings without a server.
#[must_use]
pub fn parse_listing_page(html: &str) -> ListingPage {
    let document = Html::parse_document(html);

    let mut entries = Vec::new();
    for element in document.select(&PRODUCT_SELECTOR) {
        let Some(item_id) = element.value().attr("data-product-id") else {
            continue;
        };
        if item_id.is_empty() {
            continue;
        }
        let brand = element
            .value()
            .attr("data-product-brand")
            .filter(|b| !b.is_empty());
        entries.push((item_id.to_string(), canonical_item_url(brand, item_id)));
    }

    let has_next = document.select(&NEXT_PAGE_SELECTOR).next().is_some();

    ListingPage { entries, has_next }
}

/// Catalog crawler driving the fetcher across pagination
pub struct CatalogCrawler<'a> {
    fetcher: &'a PageFetcher,
}

impl<'a> CatalogCrawler<'a> {
    #[must_use]
    pub fn new(fetcher: &'a PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Crawl all pages of a search URL into a deduplicated catalog
    ///
    /// Terminates when a page carries no next-page affordance, answers 404,
    /// or fails to fetch. Failures are logged and yield the partial catalog;
    /// the crawl itself never errors. The fetcher's rate limiter provides
    /// the inter-page delay.
    pub async fn crawl(&self, search_url: &str) -> Catalog {
        let mut catalog = Catalog::new();
        let mut page = 1u32;

        loop {
            let page_url = Self::page_url(search_url, page);
            tracing::debug!(page = page, url = %page_url, "Fetching catalog page");

            let outcome = match self.fetcher.fetch(&page_url).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(
                        page = page,
                        error = %e,
                        "Catalog page fetch failed, returning partial catalog"
                    );
                    break;
                }
            };

            if outcome.is_not_found() {
                tracing::debug!(page = page, "Catalog page not found, stopping");
                break;
            }

            let listing = parse_listing_page(&outcome.body);
            let found = listing.entries.len();
            for (item_id, url) in listing.entries {
                catalog.insert(item_id, url);
            }

            tracing::info!(
                page = page,
                found = found,
                total = catalog.len(),
                "Catalog page processed"
            );

            if !listing.has_next {
                break;
            }
            page += 1;
        }

        catalog
    }

    /// Append the page number to a search URL, respecting an existing query
    fn page_url(search_url: &str, page: u32) -> String {
        if search_url.contains('?') {
            format!("{search_url}&page={page}")
        } else {
            format!("{search_url}?page={page}")
        }
    }
}
