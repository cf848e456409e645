//! Shelf-Scraper main entry point
//!
//! This is the command-line interface for the Shelf-Scraper book catalog
//! scraper.

use anyhow::Context;
use clap::Parser;
use shelf_scraper::config::{load_config_with_hash, Config};
use shelf_scraper::crawler::{scrape_to_catalog, scrape_to_csv, ScrapeReport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Scraper: a book catalog scraper
///
/// Shelf-Scraper walks every category of a book shop site, page by page,
/// and reconciles the books it finds into a SQLite catalog in a single
/// transaction. It can also write the scraped batch to a CSV file instead.
#[derive(Parser, Debug)]
#[command(name = "shelf-scraper")]
#[command(version = "1.0.0")]
#[command(about = "A book catalog scraper", long_about = None)]
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

    /// Write the scraped books to the CSV file instead of the catalog
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    csv: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with_all = ["stats", "csv"])]
    dry_run: bool,

    /// Show statistics from the catalog database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "csv"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.csv {
        let report = scrape_to_csv(&config)
            .await
            .context("CSV export failed")?;
        print_report(&report);
        println!("✓ Books written to: {}", config.output.csv_path);
    } else {
        let report = scrape_to_catalog(&config)
            .await
            .context("Catalog scrape failed")?;
        print_report(&report);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_scraper=info,warn"),
            1 => EnvFilter::new("shelf_scraper=debug,info"),
            2 => EnvFilter::new("shelf_scraper=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Shelf-Scraper Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nFetcher:");
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);

    println!("\nCrawler:");
    println!(
        "  Max concurrent categories: {}",
        config.crawler.max_concurrent_categories
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");
    println!("✓ Would build the category index from {}", config.site.base_url);
}

/// Handles the --stats mode: shows statistics from the catalog
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use shelf_scraper::output::{load_statistics, print_statistics};
    use shelf_scraper::storage::open_catalog;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let catalog = open_catalog(Path::new(&config.output.database_path))
        .context("Failed to open catalog database")?;
    let stats = load_statistics(&catalog).context("Failed to query catalog statistics")?;

    print_statistics(&stats);

    Ok(())
}

fn print_report(report: &ScrapeReport) {
    println!("=== Scrape Complete ===\n");
    println!("  Categories scraped: {}", report.categories);
    println!("  Books scraped: {}", report.records);

    if let Some(outcome) = &report.outcome {
        println!("  Categories created: {}", outcome.categories_created);
        println!("  Books created: {}", outcome.books_created);
    }

    println!(
        "  Duration: {:.1}s",
        report.elapsed().num_milliseconds() as f64 / 1000.0
    );
}
