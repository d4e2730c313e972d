//! Field extraction from Booth item pages
//!
//! Shop names live in `span.shop-name-label`, with the profile nickname
//! link as fallback. Prices are read from downloadable variations only
//! (`li.variation-item` containing `i.icon-download`); physical-goods
//! variations are ignored.
//!
//! Extraction outcomes are typed so callers can tell "the page has no such
//! value" apart from "the value could not be pinned down" — neither is an
//! error, but reports treat them differently.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

lazy_static! {
    static ref SHOP_LABEL: Selector =
        Selector::parse("span.shop-name-label").expect("Invalid CSS selector: span.shop-name-label");
    static ref NICKNAME_LINK: Selector =
        Selector::parse("div.home-link-container__nickname a.nav")
            .expect("Invalid CSS selector: nickname link");
    static ref VARIATION_ITEM: Selector =
        Selector::parse("li.variation-item").expect("Invalid CSS selector: li.variation-item");
    static ref DOWNLOAD_ICON: Selector =
        Selector::parse("i.icon-download").expect("Invalid CSS selector: i.icon-download");
    static ref VARIATION_PRICE: Selector =
        Selector::parse("div.variation-price").expect("Invalid CSS selector: div.variation-price");
    static ref PRICE_DIGITS: Regex = Regex::new(r"[\d,]+").unwrap();
}

/// Outcome of extracting one field from a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// Exactly one unambiguous value was found
    Value(String),
    /// The page carries no such value
    Absent,
    /// Several distinct candidates; the count is kept for reporting
    Ambiguous(usize),
}

impl Extracted {
    /// The extracted value, if there was exactly one
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// What to do when a page offers several price candidates
///
/// Leaving the field blank mirrors the rule the interactive editor applies
/// manually. The policy is documented behavior, not scraped ground truth,
/// so it stays a run-time choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguityPolicy {
    /// Never guess: zero or multiple candidates leave the field empty
    #[default]
    LeaveEmpty,
    /// Adopt the first candidate in document order
    AdoptFirst,
}

/// Extract the shop display name from an item page
///
/// Prefers the shop-name label; falls back to the profile nickname link.
#[must_use]
pub fn extract_shop_name(html: &str) -> Extracted {
    let document = Html::parse_document(html);

    for selector in [&*SHOP_LABEL, &*NICKNAME_LINK] {
        if let Some(element) = document.select(selector).next() {
            let text: String = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Extracted::Value(text);
            }
        }
    }

    Extracted::Absent
}

/// Extract the download-variation price from an item page
///
/// Scans every downloadable variation for a numeric price (commas
/// stripped, zero valid). With [`AmbiguityPolicy::LeaveEmpty`] the result
/// is a value only when exactly one candidate exists.
#[must_use]
pub fn extract_price(html: &str, policy: AmbiguityPolicy) -> Extracted {
    let document = Html::parse_document(html);

    let mut prices = Vec::new();
    for item in document.select(&VARIATION_ITEM) {
        if item.select(&DOWNLOAD_ICON).next().is_none() {
            continue;
        }
        let Some(price_div) = item.select(&VARIATION_PRICE).next() else {
            continue;
        };
        let text: String = price_div.text().collect();
        if let Some(digits) = PRICE_DIGITS.find(text.trim()) {
            prices.push(digits.as_str().replace(',', ""));
        }
    }

    match (prices.len(), policy) {
        (0, _) => Extracted::Absent,
        (1, _) => Extracted::Value(prices.remove(0)),
        (_, AmbiguityPolicy::AdoptFirst) => Extracted::Value(prices.remove(0)),
        (n, AmbiguityPolicy::LeaveEmpty) => Extracted::Ambiguous(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variation(price: &str, downloadable: bool) -> String {
        let icon = if downloadable {
            r#"<i class="icon-download"></i>"#
        } else {
            ""
        };
        format!(
            r#"<li class="variation-item">{icon}<div class="variation-price">{price}</div></li>"#
        )
    }

    #[test]
    fn test_shop_name_label_preferred() {
        let html = r#"
            <span class="shop-name-label">Mochi Shop</span>
            <div class="home-link-container__nickname"><a class="nav">fallback</a></div>
        "#;
        assert_eq!(
            extract_shop_name(html),
            Extracted::Value("Mochi Shop".to_string())
        );
    }

    #[test]
    fn test_shop_name_nickname_fallback() {
        let html = r#"<div class="home-link-container__nickname"><a class="nav">nick</a></div>"#;
        assert_eq!(extract_shop_name(html), Extracted::Value("nick".to_string()));
    }

    #[test]
    fn test_shop_name_absent() {
        assert_eq!(extract_shop_name("<html><body></body></html>"), Extracted::Absent);
    }

    #[test]
    fn test_single_price_adopted() {
        let html = format!("<ul>{}</ul>", variation("¥ 1,200", true));
        assert_eq!(
            extract_price(&html, AmbiguityPolicy::LeaveEmpty),
            Extracted::Value("1200".to_string())
        );
    }

    #[test]
    fn test_zero_price_is_valid() {
        let html = format!("<ul>{}</ul>", variation("¥ 0", true));
        assert_eq!(
            extract_price(&html, AmbiguityPolicy::LeaveEmpty),
            Extracted::Value("0".to_string())
        );
    }

    #[test]
    fn test_multiple_prices_ambiguous() {
        let html = format!(
            "<ul>{}{}</ul>",
            variation("¥ 500", true),
            variation("¥ 1,000", true)
        );
        assert_eq!(
            extract_price(&html, AmbiguityPolicy::LeaveEmpty),
            Extracted::Ambiguous(2)
        );
    }

    #[test]
    fn test_adopt_first_policy_overrides_ambiguity() {
        let html = format!(
            "<ul>{}{}</ul>",
            variation("¥ 500", true),
            variation("¥ 1,000", true)
        );
        assert_eq!(
            extract_price(&html, AmbiguityPolicy::AdoptFirst),
            Extracted::Value("500".to_string())
        );
    }

    #[test]
    fn test_physical_variations_ignored() {
        // Only the downloadable variation counts, so this stays unambiguous
        let html = format!(
            "<ul>{}{}</ul>",
            variation("¥ 3,000", false),
            variation("¥ 1,200", true)
        );
        assert_eq!(
            extract_price(&html, AmbiguityPolicy::LeaveEmpty),
            Extracted::Value("1200".to_string())
        );
    }

    #[test]
    fn test_no_download_variations_absent() {
        let html = format!("<ul>{}</ul>", variation("¥ 3,000", false));
        assert_eq!(
            extract_price(&html, AmbiguityPolicy::LeaveEmpty),
            Extracted::Absent
        );
    }
}
