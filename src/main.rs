//! Catalog-Walker main entry point
//!
//! This is the command-line interface for the Catalog-Walker store catalog mapper.

use anyhow::Context;
use catalog_walker::config::{load_config_with_hash, Config};
use catalog_walker::crawler::{crawl, store_base_url};
use catalog_walker::RunMode;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Catalog-Walker: a retailer catalog mapper
///
/// Catalog-Walker walks each configured store's department tree down to a
/// bounded depth, collects the products listed under final departments,
/// and stores categories and products in SQLite.
#[derive(Parser, Debug)]
#[command(name = "catalog-walker")]
#[command(version)]
#[command(about = "A retailer catalog mapper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Keep existing data: the first store runs incrementally too
    #[arg(long)]
    incremental: bool,

    /// Crawl only the store with this slug
    #[arg(long, value_name = "SLUG")]
    store: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let mode = if cli.incremental {
        RunMode::Incremental
    } else {
        RunMode::Full
    };

    if cli.dry_run {
        handle_dry_run(&config, mode, cli.store.as_deref())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, &config_hash, mode, cli.store.as_deref()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_walker=info,warn"),
            1 => EnvFilter::new("catalog_walker=debug,info"),
            2 => EnvFilter::new("catalog_walker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, mode: RunMode, only_store: Option<&str>) -> anyhow::Result<()> {
    println!("=== Catalog-Walker Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Per page: {}", config.crawler.per_page);
    println!("  Offers limit: {}", config.crawler.offers_limit);
    println!("  Debug mode: {}", config.crawler.debug_mode);

    println!("\nBrowser:");
    println!("  User agent: {}", config.browser.user_agent);
    println!("  Settle delay: {}ms", config.browser.settle_delay_ms);
    match config.browser.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: none"),
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let selected: Vec<_> = match only_store {
        Some(slug) => vec![config
            .find_store(slug)
            .with_context(|| format!("Store '{}' is not configured", slug))?],
        None => config.stores.iter().collect(),
    };

    println!("\nStores ({}):", selected.len());
    for (index, store) in selected.iter().enumerate() {
        let store_mode = if index == 0 { mode } else { RunMode::Incremental };
        println!("  - {} (id {}, {} run)", store.slug, store.id, store_mode);
        println!("    {}", store_base_url(&config.api.base_url, store.id));
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use catalog_walker::output::{load_statistics, print_statistics};
    use catalog_walker::storage::open_storage;

    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: &str,
    mode: RunMode,
    only_store: Option<&str>,
) -> anyhow::Result<()> {
    match only_store {
        Some(slug) => tracing::info!("Crawling store {} ({} run)", slug, mode),
        None => tracing::info!(
            "Crawling {} stores, first as a {} run",
            config.stores.len(),
            mode
        ),
    }

    let started = Instant::now();
    let reports = crawl(config, config_hash, mode, only_store).await;
    let elapsed = started.elapsed().as_secs_f64();

    match reports {
        Ok(reports) => {
            let items: usize = reports.iter().map(|r| r.item_count()).sum();
            tracing::info!(
                "Crawl completed: {} stores, {} items in {:.1}s",
                reports.len(),
                items,
                elapsed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed after {:.1}s: {}", elapsed, e);
            Err(e.into())
        }
    }
}
