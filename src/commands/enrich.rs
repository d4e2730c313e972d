use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::Path;

use meguri::config::Config;
use meguri::crawler::PageFetcher;
use meguri::enrich::{AmbiguityPolicy, EnrichmentContext, MetadataEnricher};
use meguri::registry::Registry;

/// Which registry field an enrichment pass fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Field {
    /// Avatar and profile shop names, from their respective item pages
    Shop,
    /// Download-variation price, from the primary listing page
    Price,
}

/// Fill empty registry fields by scraping item pages
///
/// Idempotent per run: already-filled fields are skipped, each distinct URL
/// is fetched at most once, and 404s are listed at the end instead of
/// failing anything.
pub async fn enrich(
    config: &Config,
    registry_path: &Path,
    field: Field,
    adopt_first: bool,
) -> Result<()> {
    let mut registry = Registry::load(registry_path)
        .with_context(|| format!("Failed to load registry {}", registry_path.display()))?;
    println!("Profiles: {}", registry.profiles.len());

    let fetcher = PageFetcher::with_config(
        config.fetch.rate_limit,
        config.request_timeout(),
        config.user_agent(),
    )
    .context("Failed to create fetcher")?;

    let policy = if adopt_first {
        AmbiguityPolicy::AdoptFirst
    } else {
        AmbiguityPolicy::LeaveEmpty
    };
    let enricher = MetadataEnricher::new(&fetcher).with_policy(policy);
    let mut ctx = EnrichmentContext::new();

    let stats = match field {
        Field::Shop => enricher.fill_shop_names(&mut registry, &mut ctx).await,
        Field::Price => enricher.fill_prices(&mut registry, &mut ctx).await,
    };

    if stats.updated > 0 {
        registry
            .save(registry_path)
            .with_context(|| format!("Failed to save registry {}", registry_path.display()))?;
    }

    println!("\nFields examined: {}", stats.examined);
    println!("Fields updated: {}", stats.updated);

    let not_found: Vec<&str> = ctx.not_found().collect();
    if not_found.is_empty() {
        println!("\nNo 404 responses.");
    } else {
        println!("\nURLs that answered 404:");
        for url in not_found {
            println!("{url}");
        }
    }

    Ok(())
}
