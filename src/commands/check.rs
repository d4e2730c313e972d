use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;

use meguri::config::Config;
use meguri::crawler::{CatalogCrawler, PageFetcher};
use meguri::models::Catalog;
use meguri::notify::WebhookNotifier;
use meguri::reconcile::reconcile;
use meguri::registry::{load_blocklist, load_registered_ids, load_url_list, write_report};

/// Parameters for the check command
pub struct CheckParams {
    /// Live search URLs to crawl (ignored when `input` is given)
    pub search_urls: Vec<String>,
    /// Pre-materialized URL-list file instead of a live crawl
    pub input: Option<PathBuf>,
    /// Registry file (profiles.json)
    pub registry: PathBuf,
    /// Blocklist files; all are optional
    pub blocklists: Vec<PathBuf>,
    /// Report output path
    pub output: PathBuf,
    /// Webhook URL override (falls back to configuration)
    pub webhook_url: Option<String>,
}

/// Reconcile the catalog against the registry and blocklists
///
/// Returns `true` when unregistered items were found, so `main` can map it
/// onto the non-zero exit code schedulers branch on.
pub async fn check(config: &Config, params: CheckParams) -> Result<bool> {
    println!("Catalog reconciliation");
    println!("======================");

    let catalog = build_catalog(config, &params).await?;
    println!("Catalog items discovered: {}", catalog.len());

    let registered = load_registered_ids(&params.registry);
    println!("Registered items: {}", registered.len());

    let mut blocked = HashSet::new();
    for path in &params.blocklists {
        let ids = load_blocklist(path);
        println!("Blocked items from {}: {}", path.display(), ids.len());
        blocked.extend(ids);
    }

    let diff = reconcile(&catalog, &registered, &blocked);

    if !diff.reverse.is_empty() {
        tracing::info!(
            count = diff.reverse.len(),
            ids = ?diff.reverse,
            "Registered items no longer present in the catalog (delisted or retagged?)"
        );
    }

    if diff.is_clean() {
        println!("\nAll catalog items are registered.");
        return Ok(false);
    }

    println!("\nUnregistered items: {}", diff.forward.len());
    println!("----------------------");
    for (_, url) in &diff.forward {
        println!("{url}");
    }

    write_report(&params.output, &diff)
        .with_context(|| format!("Failed to write report to {}", params.output.display()))?;
    println!("----------------------");
    println!("Report written to {}", params.output.display());

    let webhook_url = params
        .webhook_url
        .clone()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| config.notify.webhook_url.clone());
    if webhook_url.is_empty() {
        tracing::debug!("No webhook URL configured, skipping notification");
    } else {
        notify(&webhook_url, &diff).await;
    }

    Ok(true)
}

/// Build the catalog from the configured source
///
/// A missing catalog source is the one fatal configuration error in the
/// pipeline; everything downstream degrades gracefully.
async fn build_catalog(config: &Config, params: &CheckParams) -> Result<Catalog> {
    if let Some(input) = &params.input {
        return Ok(load_url_list(input)?);
    }

    if params.search_urls.is_empty() {
        anyhow::bail!("no catalog source: give search URLs or --input <file>");
    }

    let fetcher = PageFetcher::with_config(
        config.fetch.rate_limit,
        config.request_timeout(),
        config.user_agent(),
    )
    .context("Failed to create fetcher")?;
    let crawler = CatalogCrawler::new(&fetcher);

    let mut catalog = Catalog::new();
    for search_url in &params.search_urls {
        println!("Crawling search: {search_url}");
        catalog.merge(crawler.crawl(search_url).await);
    }
    Ok(catalog)
}

/// Best-effort webhook delivery; failure is logged, never fatal
async fn notify(webhook_url: &str, diff: &meguri::models::DiffResult) {
    let notifier = match WebhookNotifier::from_url(webhook_url) {
        Ok(notifier) => notifier,
        Err(e) => {
            tracing::error!(error = %e, "Invalid webhook configuration, skipping notification");
            return;
        }
    };

    if let Err(e) = notifier.send(diff).await {
        tracing::error!(error = %e, "Webhook notification failed");
    }
}
