//! Statistics generation from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::storage::CatalogStore;
use crate::ScrapeError;

/// Catalog statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStatistics {
    /// Total number of categories
    pub total_categories: u64,

    /// Total number of books
    pub total_books: u64,

    /// (category name, book count), ordered by name
    pub books_per_category: Vec<(String, u64)>,
}

impl CatalogStatistics {
    /// Categories that hold no books
    pub fn empty_categories(&self) -> impl Iterator<Item = &str> {
        self.books_per_category
            .iter()
            .filter(|(_, count)| *count == 0)
            .map(|(name, _)| name.as_str())
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn CatalogStore) -> Result<CatalogStatistics, ScrapeError> {
    Ok(CatalogStatistics {
        total_categories: storage.count_categories()?,
        total_books: storage.count_books()?,
        books_per_category: storage.books_per_category()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Categories: {}", stats.total_categories);
    println!("  Books: {}", stats.total_books);
    println!();

    if stats.books_per_category.is_empty() {
        println!("The catalog is empty.");
        return;
    }

    println!("Books by Category:");
    // Largest first
    let mut counts: Vec<_> = stats.books_per_category.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (name, count) in counts {
        let percentage = if stats.total_books > 0 {
            (*count as f64 / stats.total_books as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", name, count, percentage);
    }

    let empty: Vec<&str> = stats.empty_categories().collect();
    if !empty.is_empty() {
        println!();
        println!("Empty Categories ({}):", empty.len());
        for name in empty {
            println!("  - {}", name);
        }
    }
}
