//! Brickscout main entry point
//!
//! This is the command-line interface for the Brickscout deal aggregator.

use brickscout::config::{load_config_with_hash, Config};
use brickscout::sites::AdapterRegistry;
use brickscout::storage::{open_store, DealQuery, SortKey};
use brickscout::Coordinator;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Brickscout: a LEGO deal aggregator
///
/// Brickscout scrapes deal listings and deal pages from Dealabs, Vinted and
/// Avenue de la Brique, and merges the extracted deals into a local catalog.
#[derive(Parser, Debug)]
#[command(name = "brickscout")]
#[command(version = "1.0.0")]
#[command(about = "A LEGO deal aggregator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Listing or deal pages to scrape
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which adapter handles each URL without scraping
    #[arg(long, conflicts_with = "list")]
    dry_run: bool,

    /// Print stored deals and exit
    #[arg(long, conflicts_with = "dry_run")]
    list: bool,

    /// Sort key for --list: price, temperature, comments or date
    #[arg(long, requires = "list")]
    sort: Option<String>,

    /// Maximum number of deals printed by --list
    #[arg(long, requires = "list")]
    limit: Option<usize>,

    /// Only list deals for this LEGO set number
    #[arg(long = "set", requires = "list")]
    set_number: Option<String>,

    /// Only list deals priced at or below this amount
    #[arg(long, requires = "list")]
    max_price: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli.urls);
    } else if cli.list {
        handle_list(&config, &cli)?;
    } else {
        handle_scrape(config, &cli.urls).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("brickscout=info,warn"),
            1 => EnvFilter::new("brickscout=debug,info"),
            2 => EnvFilter::new("brickscout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows settings and adapter resolution
fn handle_dry_run(config: &Config, urls: &[String]) {
    println!("=== Brickscout Dry Run ===\n");

    println!("Browser:");
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Viewport: {}x{}",
        config.browser.viewport_width, config.browser.viewport_height
    );
    println!(
        "  Navigation timeout: {}ms",
        config.browser.navigation_timeout_ms
    );

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!(
        "  Backoff: {}ms ({:?})",
        config.retry.backoff_ms, config.retry.strategy
    );

    println!("\nOutput:");
    println!(
        "  Store: {} ({:?})",
        config.output.store_path,
        config.output.resolved_backend()
    );

    println!("\nSite aliases ({}):", config.site_alias.len());
    for alias in &config.site_alias {
        println!("  - {} -> {}", alias.domain, alias.site);
    }

    let registry = AdapterRegistry::new(&config.site_alias);
    println!("\nTargets ({}):", urls.len());
    for raw in urls {
        match registry.resolve_target(raw) {
            Ok((url, site)) => {
                let kind = site.adapter().page_kind(&url);
                println!("  - {} -> {} ({} page)", url, site, kind);
            }
            Err(e) => println!("  - {} -> rejected: {}", raw, e),
        }
    }

    println!("\n=== Configuration Valid ===");
}

/// Handles the --list mode: prints stored deals as JSON
fn handle_list(config: &Config, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut query = DealQuery::new();

    if let Some(name) = &cli.sort {
        let key = SortKey::from_name(name).ok_or_else(|| format!("unknown sort key: {}", name))?;
        query = query.sort_by(key);
    }
    if let Some(limit) = cli.limit {
        query = query.limit(limit);
    }
    if let Some(set_number) = &cli.set_number {
        query = query.set_number(set_number.clone());
    }
    if let Some(max_price) = cli.max_price {
        query = query.max_price(max_price);
    }

    let store = open_store(&config.output)?;
    let deals = store.find(&query)?;
    println!("{}", serde_json::to_string_pretty(&deals)?);
    Ok(())
}

/// Handles the default mode: scrapes every URL and prints the merged deals
async fn handle_scrape(config: Config, urls: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    if urls.is_empty() {
        return Err("no URL given; pass at least one listing or deal page".into());
    }

    let coordinator = Coordinator::new(config)?;
    let results = coordinator.scrape_all(urls).await;

    let mut deals = Vec::new();
    let mut failures = 0;
    for (url, result) in results {
        match result {
            Ok(batch) => deals.extend(batch),
            Err(e) => {
                tracing::error!("{}: {}", url, e);
                failures += 1;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&deals)?);

    if failures == urls.len() {
        return Err(format!("all {} scrapes failed", failures).into());
    }
    Ok(())
}
