//! Crawler module for fetching and extracting book listings
//!
//! This module contains the scraping side of the pipeline, including:
//! - HTTP fetching behind the [`PageFetcher`] trait
//! - Listing page parsing into [`BookRecord`]s
//! - Category index extraction from the site root
//! - Per-category pagination and overall scrape coordination

mod category;
mod coordinator;
mod fetcher;
mod index;
mod parser;

#[cfg(test)]
pub(crate) mod testing;

pub use category::crawl_category;
pub use coordinator::Scraper;
pub use fetcher::{
    build_http_client, fetch_page, FetchFailure, FetchResponse, HttpFetcher, PageFetcher,
};
pub use index::{build_index, parse_category_index, CategoryIndex};
pub use parser::{parse_listing, parse_rating, BookRecord, ListingPage, ParseAnomaly};

use crate::config::Config;
use crate::output::write_csv;
use crate::reconcile::{reconcile, ReconcileOutcome};
use crate::storage::open_catalog;
use crate::ScrapeError;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::Path;

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Distinct categories present in the scraped batch
    pub categories: usize,
    /// Book records scraped
    pub records: usize,
    /// Set when the batch was reconciled into the catalog
    pub outcome: Option<ReconcileOutcome>,
}

impl ScrapeReport {
    fn new(started_at: DateTime<Utc>, records: &[BookRecord]) -> Self {
        let categories: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();

        Self {
            started_at,
            finished_at: Utc::now(),
            categories: categories.len(),
            records: records.len(),
            outcome: None,
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Scrapes the configured site and reconciles the batch into the catalog
///
/// The catalog is opened before any network traffic so a bad database path
/// fails fast. Reconciliation runs once, after every category is crawled.
///
/// # Example
///
/// ```no_run
/// use shelf_scraper::config::load_config;
/// use shelf_scraper::crawler::scrape_to_catalog;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = scrape_to_catalog(&config).await?;
/// println!("{} records", report.records);
/// # Ok(())
/// # }
/// ```
pub async fn scrape_to_catalog(config: &Config) -> Result<ScrapeReport, ScrapeError> {
    let started_at = Utc::now();
    let mut catalog = open_catalog(Path::new(&config.output.database_path))?;

    let records = Scraper::from_config(config)?.run().await?;
    let outcome = reconcile(&mut catalog, &records)?;

    tracing::info!(
        "Reconciled {} records: {} new categories, {} new books",
        records.len(),
        outcome.categories_created,
        outcome.books_created
    );

    let mut report = ScrapeReport::new(started_at, &records);
    report.outcome = Some(outcome);
    Ok(report)
}

/// Scrapes the configured site and writes the batch to the CSV path
pub async fn scrape_to_csv(config: &Config) -> Result<ScrapeReport, ScrapeError> {
    let started_at = Utc::now();

    let records = Scraper::from_config(config)?.run().await?;
    write_csv(&records, Path::new(&config.output.csv_path))?;

    tracing::info!("Wrote {} records to {}", records.len(), config.output.csv_path);

    Ok(ScrapeReport::new(started_at, &records))
}
