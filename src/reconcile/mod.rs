//! Three-way set reconciliation between catalog, registry, and blocklists
//!
//! Pure set algebra over item IDs, no I/O and no mutation of the inputs:
//! the same three sets always produce the same [`DiffResult`], byte for
//! byte. The forward diff is the "new items to review" report; the reverse
//! diff flags registered items whose listing disappeared (delisted or
//! retagged) and is purely informational.

use std::collections::HashSet;

use crate::models::{Catalog, DiffResult};

/// Compute the forward and reverse diffs
///
/// - `forward`: catalog − registered − blocked, as `(shop_name, url)` pairs
///   sorted by shop name ascending (case-sensitive); ties keep the
///   catalog's discovery order, so output is fully deterministic.
/// - `reverse`: registered − catalog, sorted.
#[must_use]
pub fn reconcile(
    catalog: &Catalog,
    registered: &HashSet<String>,
    blocked: &HashSet<String>,
) -> DiffResult {
    let mut forward: Vec<(String, String)> = catalog
        .items()
        .iter()
        .filter(|item| !registered.contains(&item.item_id) && !blocked.contains(&item.item_id))
        .map(|item| (item.shop_name.clone(), item.url.clone()))
        .collect();

    // Stable sort: discovery order survives within equal shop names
    forward.sort_by(|a, b| a.0.cmp(&b.0));

    let mut reverse: Vec<String> = registered
        .iter()
        .filter(|id| !catalog.contains(id))
        .cloned()
        .collect();
    reverse.sort();

    DiffResult { forward, reverse }
}
