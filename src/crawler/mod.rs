//! Web crawling functionality with rate limiting
//!
//! This module implements catalog retrieval from Booth search results:
//! a rate-limited page fetcher, URL/identifier extraction, and the
//! pagination loop that accumulates the per-run catalog.

pub mod catalog;
pub mod fetcher;
pub mod url;

pub use catalog::CatalogCrawler;
pub use fetcher::{FetchOutcome, PageFetcher};
