//! URL extraction and canonicalization for Booth item pages
//!
//! Booth exposes two URL forms for the same item:
//! - Shop-scoped: `https://{shop}.booth.pm/items/{id}`
//! - Non-shop-scoped: `https://booth.pm/ja/items/{id}`
//!
//! The numeric item ID uniquely identifies an item regardless of which form
//! a raw URL uses, so reconciliation keys on the ID alone. Everything in
//! this module is purely textual; there is no network dependency.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

/// Marketplace domain items must live on to be considered at all
pub const MARKETPLACE_DOMAIN: &str = "booth.pm";

/// Sentinel shop name for the non-shop-scoped URL form
pub const UNKNOWN_SHOP: &str = "unknown";

lazy_static! {
    /// Numeric segment after the fixed `/items/` path marker
    static ref ITEM_ID_PATTERN: Regex = Regex::new(r"/items/(\d+)").unwrap();

    /// Sub-domain label of the shop-scoped form; multi-label sub-domains
    /// are kept whole ("a.b" for a.b.booth.pm)
    static ref SHOP_NAME_PATTERN: Regex = Regex::new(r"https://([^/]+)\.booth\.pm/").unwrap();
}

/// Extract the numeric item ID from a Booth item URL
///
/// Returns `None` for malformed or unrelated URLs.
///
/// # Examples
///
/// ```
/// use meguri::crawler::url::extract_item_id;
///
/// assert_eq!(extract_item_id("https://shop.booth.pm/items/123456"), Some("123456".to_string()));
/// assert_eq!(extract_item_id("https://example.com/about"), None);
/// ```
#[must_use]
pub fn extract_item_id(url: &str) -> Option<String> {
    ITEM_ID_PATTERN
        .captures(url)
        .map(|cap| cap[1].to_string())
}

/// Extract the shop label from a shop-scoped Booth URL
///
/// Returns [`UNKNOWN_SHOP`] when the URL uses the non-shop-scoped
/// `booth.pm/ja/items/...` form or does not match at all.
#[must_use]
pub fn extract_shop_name(url: &str) -> String {
    SHOP_NAME_PATTERN
        .captures(url)
        .map_or_else(|| UNKNOWN_SHOP.to_string(), |cap| cap[1].to_string())
}

/// Build the canonical item URL from a shop label and item ID
///
/// Listing pages carry raw `data-product-id` / `data-product-brand`
/// attributes rather than ready-made links; this is the inverse of the
/// extraction above. Without a brand the non-shop-scoped form is used.
#[must_use]
pub fn canonical_item_url(shop_name: Option<&str>, item_id: &str) -> String {
    match shop_name {
        Some(shop) if !shop.is_empty() => {
            format!("https://{shop}.booth.pm/items/{item_id}")
        }
        _ => format!("https://booth.pm/ja/items/{item_id}"),
    }
}

/// True when the URL is hosted on the marketplace domain
///
/// Used by the enricher to skip registry entries pointing elsewhere
/// (external distribution sites are never fetched). The check is on the
/// parsed host, so `booth.pm` appearing in a path or query does not count.
#[must_use]
pub fn is_marketplace_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    parsed.host_str().is_some_and(|host| {
        host == MARKETPLACE_DOMAIN || host.ends_with(&format!(".{MARKETPLACE_DOMAIN}"))
    })
}
