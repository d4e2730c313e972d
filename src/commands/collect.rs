use anyhow::{Context, Result};
use std::path::Path;

use meguri::config::Config;
use meguri::crawler::{CatalogCrawler, PageFetcher};
use meguri::registry::write_url_list;

/// Crawl a search URL and materialize the catalog as a sorted URL list
///
/// The resulting file is accepted back by `check --input`, so a catalog
/// collected once can be reconciled repeatedly without re-crawling.
pub async fn collect(config: &Config, search_url: &str, output: &Path) -> Result<()> {
    println!("Collecting catalog");
    println!("==================");
    println!("Search URL: {search_url}");

    let fetcher = PageFetcher::with_config(
        config.fetch.rate_limit,
        config.request_timeout(),
        config.user_agent(),
    )
    .context("Failed to create fetcher")?;
    let crawler = CatalogCrawler::new(&fetcher);

    let catalog = crawler.crawl(search_url).await;

    if catalog.is_empty() {
        println!("\nNo items found.");
        return Ok(());
    }

    println!("\nItems found: {}", catalog.len());
    let mut urls: Vec<&str> = catalog.items().iter().map(|i| i.url.as_str()).collect();
    urls.sort_unstable();
    for url in &urls {
        println!("{url}");
    }

    write_url_list(output, &catalog)
        .with_context(|| format!("Failed to write URL list to {}", output.display()))?;
    println!("\nURL list written to {}", output.display());

    Ok(())
}
