//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the catalog traits.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CatalogStore, CatalogTransaction, StorageError, StorageResult};
use crate::storage::{Book, BookQuery, Category, NewBook};
use crate::ScrapeError;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;

/// Upper bound on bound parameters per `IN (...)` lookup
const LOOKUP_CHUNK_SIZE: usize = 500;

const BOOK_COLUMNS: &str =
    "b.id, b.title, b.price, b.rating, b.availability, b.image_src, b.category_id";

/// SQLite catalog backend
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens or creates the catalog database at `path`
    pub fn new(path: &Path) -> Result<Self, ScrapeError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, ScrapeError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Raw connection access for tests that need to tamper with the schema
    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Maps a row selected with [`BOOK_COLUMNS`]
fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        rating: row.get(3)?,
        availability: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        image_src: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        category_id: row.get(6)?,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Turns SQLite constraint failures into [`StorageError::ConstraintViolation`]
fn classify_write_error(err: rusqlite::Error, context: String) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(format!(
                "{}: {}",
                context,
                message.as_deref().unwrap_or("constraint failed")
            ))
        }
        _ => StorageError::Sqlite(err),
    }
}

impl CatalogStore for SqliteCatalog {
    // ===== Transactions =====

    fn begin_transaction(&mut self) -> StorageResult<Box<dyn CatalogTransaction + '_>> {
        let tx = self.conn.transaction()?;
        Ok(Box::new(SqliteTransaction { tx }))
    }

    // ===== Categories =====

    fn list_categories(&self) -> StorageResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY name")?;

        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    fn get_category(&self, id: i64) -> StorageResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name FROM categories WHERE id = ?1",
                params![id],
                category_from_row,
            )
            .optional()?;

        Ok(category)
    }

    fn count_categories(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Books =====

    fn list_books(&self) -> StorageResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM books b ORDER BY b.id",
            BOOK_COLUMNS
        ))?;

        let books = stmt
            .query_map([], book_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(books)
    }

    fn get_book(&self, id: i64) -> StorageResult<Option<Book>> {
        let book = self
            .conn
            .query_row(
                &format!("SELECT {} FROM books b WHERE b.id = ?1", BOOK_COLUMNS),
                params![id],
                book_from_row,
            )
            .optional()?;

        Ok(book)
    }

    fn search_books(&self, query: &BookQuery) -> StorageResult<Vec<Book>> {
        // LIKE is case-insensitive for ASCII in SQLite
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM books b
             JOIN categories c ON c.id = b.category_id
             WHERE (?1 IS NULL OR b.title LIKE '%' || ?1 || '%')
               AND (?2 IS NULL OR c.name LIKE '%' || ?2 || '%')
             ORDER BY b.id",
            BOOK_COLUMNS
        ))?;

        let books = stmt
            .query_map(
                params![query.title.as_deref(), query.category.as_deref()],
                book_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(books)
    }

    fn count_books(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Statistics =====

    fn books_per_category(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.name, COUNT(b.id)
             FROM categories c
             LEFT JOIN books b ON b.category_id = c.id
             GROUP BY c.id
             ORDER BY c.name",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}

/// A catalog transaction backed by a `rusqlite::Transaction`
///
/// rusqlite rolls the transaction back when it is dropped uncommitted.
struct SqliteTransaction<'conn> {
    tx: rusqlite::Transaction<'conn>,
}

impl CatalogTransaction for SqliteTransaction<'_> {
    fn find_categories_by_name(&self, names: &BTreeSet<String>) -> StorageResult<Vec<Category>> {
        let names: Vec<&String> = names.iter().collect();
        let mut categories = Vec::with_capacity(names.len());

        for chunk in names.chunks(LOOKUP_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = self.tx.prepare(&format!(
                "SELECT id, name FROM categories WHERE name IN ({})",
                placeholders
            ))?;

            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), category_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            categories.extend(rows);
        }

        Ok(categories)
    }

    fn create_category(&mut self, name: &str) -> StorageResult<i64> {
        self.tx
            .execute("INSERT INTO categories (name) VALUES (?1)", params![name])
            .map_err(|e| classify_write_error(e, format!("category '{}'", name)))?;
        Ok(self.tx.last_insert_rowid())
    }

    fn create_books(&mut self, books: &[NewBook]) -> StorageResult<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO books (title, price, rating, availability, image_src, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;

        for book in books {
            stmt.execute(params![
                book.title,
                book.price,
                book.rating,
                book.availability,
                book.image_src,
                book.category_id,
            ])
            .map_err(|e| classify_write_error(e, format!("book '{}'", book.title)))?;
        }

        Ok(())
    }

    fn commit(self: Box<Self>) -> StorageResult<()> {
        let SqliteTransaction { tx } = *self;
        tx.commit()?;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> StorageResult<()> {
        let SqliteTransaction { tx } = *self;
        tx.rollback()?;
        Ok(())
    }
}
