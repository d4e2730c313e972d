//! Per-item metadata enrichment with run-scoped caching
//!
//! Fills empty registry fields (shop names, price) by fetching each
//! profile's source item page. All state lives in an explicit
//! [`EnrichmentContext`] constructed per run: the URL cache guarantees each
//! distinct URL is fetched at most once however many profiles share it, and
//! the not-found set feeds the end-of-run report. Nothing is retried;
//! every per-item failure leaves that field empty and moves on.

pub mod parse;

use std::collections::{BTreeSet, HashMap};

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::url::is_marketplace_url;
use crate::error::ParseError;
use crate::registry::Registry;

pub use parse::{AmbiguityPolicy, Extracted};

/// Cached outcome of resolving one URL
///
/// Keeps "legitimately empty" apart from "could not fetch" so the final
/// report can say which is which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one value was extracted
    Value(String),
    /// Page fetched fine but carries no such value
    Absent,
    /// Page fetched fine but offered several candidates
    Ambiguous(usize),
    /// Server answered 404; never retried within the run
    NotFound,
    /// Fetch failed; status code present when the server answered
    Failed(Option<u16>),
}

impl Resolution {
    /// The resolved value, when there is one
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The extraction failure behind this resolution, when it is one
    #[must_use]
    pub fn parse_error(&self) -> Option<ParseError> {
        match self {
            Self::Absent => Some(ParseError::ElementNotFound),
            Self::Ambiguous(n) => Some(ParseError::Ambiguous(*n)),
            _ => None,
        }
    }
}

/// Run-scoped enrichment state
///
/// A fresh context per run keeps the cache honest (no ambient module state)
/// and makes the enricher trivially testable.
#[derive(Debug, Default)]
pub struct EnrichmentContext {
    /// (URL, field kind) → resolution for everything touched this run.
    /// Keyed per field kind so one context can serve a shop-name pass and
    /// a price pass without handing one pass the other's values.
    cache: HashMap<(String, FieldKind), Resolution>,
    /// URLs that answered 404, sorted for the report
    not_found: BTreeSet<String>,
}

impl EnrichmentContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs that answered 404 this run, in sorted order
    #[must_use]
    pub fn not_found(&self) -> impl Iterator<Item = &str> {
        self.not_found.iter().map(String::as_str)
    }

    #[must_use]
    pub fn cached(&self, url: &str, kind: FieldKind) -> Option<&Resolution> {
        self.cache.get(&(url.to_string(), kind))
    }
}

/// Counters for one enrichment pass
#[derive(Debug, Default, Clone, Copy)]
pub struct EnrichStats {
    /// Fields written back onto profiles
    pub updated: usize,
    /// Fields examined (empty at the start of the run)
    pub examined: usize,
}

/// Which page element an enrichment pass extracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    ShopName,
    Price,
}

/// Metadata enricher over registry profiles
pub struct MetadataEnricher<'a> {
    fetcher: &'a PageFetcher,
    policy: AmbiguityPolicy,
}

impl<'a> MetadataEnricher<'a> {
    #[must_use]
    pub fn new(fetcher: &'a PageFetcher) -> Self {
        Self {
            fetcher,
            policy: AmbiguityPolicy::default(),
        }
    }

    /// Override the multiple-price-candidates policy
    #[must_use]
    pub fn with_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fill empty shop-name fields across the registry
    ///
    /// The avatar shop name comes from the primary listing URL, the profile
    /// shop name from the distribution location; both share the context
    /// cache, so two profiles (or two fields) pointing at one URL cost one
    /// fetch.
    pub async fn fill_shop_names(
        &self,
        registry: &mut Registry,
        ctx: &mut EnrichmentContext,
    ) -> EnrichStats {
        let mut stats = EnrichStats::default();

        for profile in &mut registry.profiles {
            if profile.avatar_shop_name.is_empty() {
                stats.examined += 1;
                let url = profile.avatar_name_url.clone();
                let resolution = self.resolve(ctx, &url, FieldKind::ShopName).await;
                if let Some(value) = resolution.value() {
                    tracing::info!(
                        id = %profile.id,
                        avatar = %profile.avatar_name,
                        shop = %value,
                        "Avatar shop name resolved"
                    );
                    profile.avatar_shop_name = value.to_string();
                    stats.updated += 1;
                }
            }

            if profile.profile_shop_name.is_empty() {
                stats.examined += 1;
                let url = profile.download_location.clone();
                let resolution = self.resolve(ctx, &url, FieldKind::ShopName).await;
                if let Some(value) = resolution.value() {
                    tracing::info!(
                        id = %profile.id,
                        avatar = %profile.avatar_name,
                        shop = %value,
                        "Profile shop name resolved"
                    );
                    profile.profile_shop_name = value.to_string();
                    stats.updated += 1;
                }
            }
        }

        stats
    }

    /// Fill empty price fields across the registry
    ///
    /// Prices come from the primary listing URL only. Ambiguous pages leave
    /// the field empty under the default policy; zero is a valid price.
    pub async fn fill_prices(
        &self,
        registry: &mut Registry,
        ctx: &mut EnrichmentContext,
    ) -> EnrichStats {
        let mut stats = EnrichStats::default();

        for profile in &mut registry.profiles {
            if !profile.avatar_price.is_empty() {
                continue;
            }
            stats.examined += 1;

            let url = profile.avatar_name_url.clone();
            let resolution = self.resolve(ctx, &url, FieldKind::Price).await;
            match &resolution {
                Resolution::Value(value) => {
                    tracing::info!(
                        id = %profile.id,
                        avatar = %profile.avatar_name,
                        price = %value,
                        "Price resolved"
                    );
                    profile.avatar_price = value.clone();
                    stats.updated += 1;
                }
                Resolution::Ambiguous(n) => {
                    tracing::debug!(
                        id = %profile.id,
                        candidates = n,
                        "Price ambiguous, leaving empty"
                    );
                }
                _ => {}
            }
        }

        stats
    }

    /// Resolve one URL through the run cache
    ///
    /// Off-marketplace and empty URLs are skipped without a fetch and
    /// without touching the cache. Everything actually fetched is cached
    /// under (URL, field kind), so within one run each distinct URL costs
    /// at most one request per kind of value asked of it.
    async fn resolve(
        &self,
        ctx: &mut EnrichmentContext,
        url: &str,
        kind: FieldKind,
    ) -> Resolution {
        if url.is_empty() || !is_marketplace_url(url) {
            return Resolution::Absent;
        }

        if let Some(cached) = ctx.cache.get(&(url.to_string(), kind)) {
            return cached.clone();
        }

        let resolution = match self.fetcher.fetch(url).await {
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Enrichment fetch failed");
                Resolution::Failed(e.status())
            }
            Ok(outcome) if outcome.is_not_found() => {
                ctx.not_found.insert(url.to_string());
                Resolution::NotFound
            }
            Ok(outcome) => {
                let extracted = match kind {
                    FieldKind::ShopName => parse::extract_shop_name(&outcome.body),
                    FieldKind::Price => parse::extract_price(&outcome.body, self.policy),
                };
                match extracted {
                    Extracted::Value(value) => Resolution::Value(value),
                    Extracted::Absent => Resolution::Absent,
                    Extracted::Ambiguous(n) => Resolution::Ambiguous(n),
                }
            }
        };

        if let Some(err) = resolution.parse_error() {
            tracing::debug!(url = %url, kind = ?kind, error = %err, "Nothing extracted");
        }
        ctx.cache.insert((url.to_string(), kind), resolution.clone());
        resolution
    }
}
