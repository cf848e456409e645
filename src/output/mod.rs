//! Output module for exports and reports
//!
//! This module handles:
//! - Exporting a scraped batch as a flat CSV file
//! - Summarising catalog contents as statistics

mod csv_export;
pub mod stats;

pub use csv_export::{write_csv, write_csv_to, CSV_HEADER};
pub use stats::{load_statistics, print_statistics, CatalogStatistics};
