//! Storage module for the book catalog
//!
//! This module handles all database operations for the catalog, including:
//! - SQLite database initialization and schema bootstrap
//! - Transactional category and book creation used by reconciliation
//! - Read queries for listing, searching and counting catalog rows

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteCatalog;
pub use traits::{CatalogStore, CatalogTransaction, StorageError, StorageResult};

use crate::ScrapeError;

use std::path::Path;

/// Opens (or creates) the catalog database at `path`
///
/// Missing parent directories are created.
pub fn open_catalog(path: &Path) -> Result<SqliteCatalog, ScrapeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    SqliteCatalog::new(path)
}

/// A persisted category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A persisted book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub rating: Option<u8>,
    pub availability: String,
    pub image_src: String,
    pub category_id: i64,
}

/// A book about to be inserted; the store assigns its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub price: String,
    pub rating: Option<u8>,
    pub availability: String,
    pub image_src: String,
    pub category_id: i64,
}

/// Filter for [`CatalogStore::search_books`]
///
/// Both fields are case-insensitive substring matches; `None` matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    pub title: Option<String>,
    pub category: Option<String>,
}

impl BookQuery {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
