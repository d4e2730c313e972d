use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meguri::config::Config;

mod commands;

use commands::{CheckParams, Field};

#[derive(Parser)]
#[command(
    name = "meguri",
    version,
    about = "Booth marketplace catalog reconciler with per-item metadata enrichment",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Configuration file (TOML); environment variables otherwise
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the catalog and report unregistered items
    ///
    /// Exits with code 1 when unregistered items were found, so schedulers
    /// can branch on new discoveries.
    Check {
        /// Search URLs to crawl
        search_urls: Vec<String>,

        /// Reconcile a pre-collected URL-list file instead of crawling
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Registry file
        #[arg(short, long, default_value = "data/profiles.json")]
        registry: PathBuf,

        /// Blocklist file (repeatable)
        #[arg(short, long = "block")]
        blocklists: Vec<PathBuf>,

        /// Report output path
        #[arg(short, long, default_value = "unregistered_items.txt")]
        output: PathBuf,

        /// Webhook URL (overrides MEGURI_WEBHOOK_URL)
        #[arg(long)]
        webhook_url: Option<String>,
    },

    /// Crawl a search URL and write the catalog as a URL list
    Collect {
        /// Search URL to crawl
        search_url: String,

        /// Output file path
        #[arg(short, long, default_value = "catalog_urls.txt")]
        output: PathBuf,
    },

    /// Fill empty registry fields by scraping item pages
    Enrich {
        /// Which field to fill
        #[arg(short, long, value_enum)]
        field: Field,

        /// Registry file
        #[arg(short, long, default_value = "data/profiles.json")]
        registry: PathBuf,

        /// On multiple price candidates, adopt the first instead of
        /// leaving the field empty
        #[arg(long)]
        adopt_first: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    match cli.command {
        Commands::Check {
            search_urls,
            input,
            registry,
            blocklists,
            output,
            webhook_url,
        } => {
            tracing::info!(
                search_urls = ?search_urls,
                input = ?input,
                registry = %registry.display(),
                "Starting check command"
            );
            let params = CheckParams {
                search_urls,
                input,
                registry,
                blocklists,
                output,
                webhook_url,
            };
            let found_unregistered = commands::check(&config, params).await?;
            if found_unregistered {
                std::process::exit(1);
            }
        }

        Commands::Collect { search_url, output } => {
            tracing::info!(
                search_url = %search_url,
                output = %output.display(),
                "Starting collect command"
            );
            commands::collect(&config, &search_url, &output).await?;
        }

        Commands::Enrich {
            field,
            registry,
            adopt_first,
        } => {
            tracing::info!(
                field = ?field,
                registry = %registry.display(),
                "Starting enrich command"
            );
            commands::enrich(&config, &registry, field, adopt_first).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("meguri=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("meguri=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}
