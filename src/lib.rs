//! meguri - Booth catalog reconciler
//!
//! Keeps a curated registry of marketplace listings in step with what the
//! marketplace actually shows: crawls search results into a per-run
//! catalog, diffs it against the registry and blocklists, and reports items
//! present on one side but not the other. A separate enrichment pass fills
//! registry metadata (shop names, price) by scraping item pages, with
//! run-scoped caching and 404 tracking.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Rate-limited fetching, URL extraction, pagination
//! - [`reconcile`] - Pure three-way set reconciliation
//! - [`enrich`] - Per-item metadata enrichment with run-scoped cache
//! - [`registry`] - profiles.json, blocklists, URL lists, report output
//! - [`notify`] - Webhook notification of reconciliation results
//! - [`models`] - Core data structures
//!
//! # Example
//!
//! ```no_run
//! use meguri::crawler::{CatalogCrawler, PageFetcher};
//! use meguri::reconcile::reconcile;
//! use std::collections::HashSet;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = PageFetcher::new(2)?;
//!     let crawler = CatalogCrawler::new(&fetcher);
//!     let catalog = crawler.crawl("https://booth.pm/ja/search/example").await;
//!     let diff = reconcile(&catalog, &HashSet::new(), &HashSet::new());
//!     println!("{} unregistered items", diff.forward.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod enrich;
pub mod error;
pub mod models;
pub mod notify;
pub mod reconcile;
pub mod registry;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{CatalogCrawler, FetchOutcome, PageFetcher};
    pub use crate::enrich::{EnrichmentContext, MetadataEnricher};
    pub use crate::error::{Error, FetchError, ParseError, Result};
    pub use crate::models::{Catalog, CatalogItem, DiffResult};
    pub use crate::reconcile::reconcile;
    pub use crate::registry::Registry;
}

// Direct re-exports for convenience
pub use models::{Catalog, CatalogItem, DiffResult};
