//! Shelf-Scraper: a book-catalog scraper
//!
//! This crate walks the paginated category listings of a book shop site,
//! extracts typed book records, and either reconciles them into a SQLite
//! catalog inside a single transaction or exports them as a CSV table.

pub mod config;
pub mod crawler;
pub mod output;
pub mod reconcile;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Shelf-Scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Category index unavailable: {0}")]
    IndexUnavailable(#[from] crawler::FetchFailure),

    #[error("Reconciliation failed: {0}")]
    Reconcile(#[from] reconcile::ReconcileFailure),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Category crawl task failed: {0}")]
    CrawlTask(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Shelf-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BookRecord, Scraper};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use storage::{CatalogStore, SqliteCatalog};
