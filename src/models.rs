//! Core data structures for catalog reconciliation
//!
//! The catalog is rebuilt from scratch on every crawl and never persisted
//! directly; only its derived sets and the line-oriented URL report are.

use std::collections::HashMap;

use crate::crawler::url::extract_shop_name;

/// A single marketplace listing discovered during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    /// Numeric marketplace identifier extracted from the URL path
    pub item_id: String,
    /// Sub-domain shop label, or `"unknown"` for the non-shop-scoped form
    pub shop_name: String,
    /// Canonical item URL
    pub url: String,
}

/// Deduplicated mapping of item ID to canonical URL
///
/// Preserves discovery order so that reconciliation output is deterministic:
/// a duplicate item ID keeps its original position but takes the later-seen
/// URL (duplicates are assumed equivalent, last write wins).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<String, usize>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item URL under its ID, overwriting a duplicate in place
    pub fn insert(&mut self, item_id: impl Into<String>, url: impl Into<String>) {
        let item_id = item_id.into();
        let url = url.into();
        let shop_name = extract_shop_name(&url);

        if let Some(&pos) = self.index.get(&item_id) {
            self.items[pos].url = url;
            self.items[pos].shop_name = shop_name;
        } else {
            self.index.insert(item_id.clone(), self.items.len());
            self.items.push(CatalogItem {
                item_id,
                shop_name,
                url,
            });
        }
    }

    /// Items in discovery order
    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, item_id: &str) -> bool {
        self.index.contains_key(item_id)
    }

    #[must_use]
    pub fn get(&self, item_id: &str) -> Option<&CatalogItem> {
        self.index.get(item_id).map(|&pos| &self.items[pos])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge another catalog into this one, keeping last-write-wins semantics
    pub fn merge(&mut self, other: Catalog) {
        for item in other.items {
            self.insert(item.item_id, item.url);
        }
    }
}

/// Result of a three-way reconciliation run
///
/// Computed once per run and handed to the report writer / webhook; never
/// persisted and never fed back into the input sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Catalog items neither registered nor blocked, as `(shop_name, url)`
    /// pairs sorted by shop name (ties in discovery order)
    pub forward: Vec<(String, String)>,
    /// Registered item IDs no longer present in the catalog, sorted
    pub reverse: Vec<String>,
}

impl DiffResult {
    /// True when the crawl surfaced nothing new
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.forward.is_empty()
    }

    /// Forward-diff URLs in report order
    #[must_use]
    pub fn forward_urls(&self) -> Vec<&str> {
        self.forward.iter().map(|(_, url)| url.as_str()).collect()
    }
}
