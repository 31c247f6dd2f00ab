//! Listing Harvester main entry point
//!
//! Command-line interface for the proxied listings crawler.

use clap::Parser;
use listing_harvester::config::load_config_with_hash;
use listing_harvester::crawler::Coordinator;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing Harvester: a proxied listings crawler
///
/// Crawls a listings website through a rotating-proxy gateway, writing
/// one batch file of search results per term and one review file per
/// discovered listing.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A proxied listings crawler", long_about = None)]
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

    /// Validate config and show what would be crawled without fetching
    #[arg(long)]
    dry_run: bool,

    /// Run only the search stage, skipping per-listing review crawls
    #[arg(long, conflicts_with = "dry_run")]
    search_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    // Crawl failures are logged per term/listing; the process itself
    // completes with a single success exit path.
    let coordinator = Coordinator::new(config)?;
    coordinator.run(cli.search_only).await;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the plan
fn handle_dry_run(config: &listing_harvester::config::Config) {
    println!("=== Listing Harvester Dry Run ===\n");

    println!("Gateway:");
    println!("  Endpoint: {}", config.gateway.endpoint);
    println!("  Country code: {}", config.gateway.country_code);
    println!("  Render wait: {}ms", config.gateway.render_wait_ms);

    println!("\nSite:");
    println!("  Search URL: {}", config.site.search_url);

    println!("\nCrawler:");
    println!("  Page cap: {}", config.crawler.page_cap);
    println!("  Search concurrency: {}", config.crawler.search_concurrency);
    println!("  Search retries: {}", config.crawler.search_retries);
    println!("  Detail concurrency: {}", config.crawler.detail_concurrency);
    println!("  Detail retries: {}", config.crawler.detail_retries);
    println!("  Batch threshold: {}", config.crawler.batch_threshold);

    println!("\nOutput directory: {}", config.output.directory);

    println!("\nSearch terms ({}):", config.search.terms.len());
    for term in &config.search.terms {
        println!("  - {}", term);
    }

    println!("\n✓ Configuration is valid");
}
