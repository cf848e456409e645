//! Storage traits and error types
//!
//! This module defines the trait interface for catalog backends and
//! associated error types.

use crate::storage::{Book, BookQuery, Category, NewBook};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog storage backends
///
/// Writes only happen through a [`CatalogTransaction`]; the read queries
/// operate on committed data.
pub trait CatalogStore {
    // ===== Transactions =====

    /// Opens a transaction spanning category and book creation
    ///
    /// Dropping the returned transaction without calling
    /// [`CatalogTransaction::commit`] rolls it back.
    fn begin_transaction(&mut self) -> StorageResult<Box<dyn CatalogTransaction + '_>>;

    // ===== Categories =====

    /// Lists all categories ordered by name
    fn list_categories(&self) -> StorageResult<Vec<Category>>;

    /// Gets a category by id
    fn get_category(&self, id: i64) -> StorageResult<Option<Category>>;

    /// Counts categories
    fn count_categories(&self) -> StorageResult<u64>;

    // ===== Books =====

    /// Lists all books ordered by id
    fn list_books(&self) -> StorageResult<Vec<Book>>;

    /// Gets a book by id
    fn get_book(&self, id: i64) -> StorageResult<Option<Book>>;

    /// Searches books by title and/or category name
    fn search_books(&self, query: &BookQuery) -> StorageResult<Vec<Book>>;

    /// Counts books
    fn count_books(&self) -> StorageResult<u64>;

    // ===== Statistics =====

    /// Returns (category name, book count) for every category, including
    /// empty ones, ordered by name
    fn books_per_category(&self) -> StorageResult<Vec<(String, u64)>>;
}

/// An open catalog transaction
///
/// Everything written through one transaction becomes visible atomically on
/// [`commit`](Self::commit), or not at all.
pub trait CatalogTransaction {
    /// Returns the existing categories among `names`
    fn find_categories_by_name(&self, names: &BTreeSet<String>) -> StorageResult<Vec<Category>>;

    /// Creates a category and returns its assigned id
    ///
    /// The id is usable by later calls in the same transaction.
    fn create_category(&mut self, name: &str) -> StorageResult<i64>;

    /// Inserts a batch of books
    fn create_books(&mut self, books: &[NewBook]) -> StorageResult<()>;

    /// Commits every write made through this transaction
    fn commit(self: Box<Self>) -> StorageResult<()>;

    /// Discards every write made through this transaction
    fn rollback(self: Box<Self>) -> StorageResult<()>;
}
