//! URL handling module for Shelf-Scraper
//!
//! The listing site stores most of its links as relative references with a
//! few conventions of its own (parent-relative image paths, page links that
//! are relative to the category's `index.html`). This module resolves them
//! into absolute URLs.

mod resolve;

pub use resolve::{resolve_image_url, resolve_next_page, resolve_site_link};
