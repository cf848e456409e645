//! Category crawler
//!
//! Drives pagination for a single category and accumulates its records.

use crate::crawler::fetcher::{fetch_page, FetchFailure, PageFetcher};
use crate::crawler::parser::{parse_listing, BookRecord, ParseAnomaly};
use crate::url::resolve_next_page;
use std::collections::HashSet;
use url::Url;

/// Crawls every listing page of one category
///
/// Starts at `category_url` and follows "next" links until a page has none,
/// a page has no book entries, or a link leads back to a page already read.
///
/// A fetch failure ends the category without discarding what was already
/// collected: if page 3 fails, the records of pages 1 and 2 are returned.
/// This never returns an error.
pub async fn crawl_category<F>(
    fetcher: &F,
    base_url: &Url,
    category_name: &str,
    category_url: &Url,
) -> Vec<BookRecord>
where
    F: PageFetcher + ?Sized,
{
    let mut records = Vec::new();
    let mut visited = HashSet::new();
    let mut page_url = category_url.clone();
    let mut pages_read = 0usize;

    loop {
        if !visited.insert(page_url.to_string()) {
            tracing::warn!(
                "Category '{}': pagination loops back to {}, stopping",
                category_name,
                page_url
            );
            break;
        }

        let body = match fetch_page(fetcher, &page_url).await {
            Ok(response) => response.body,
            Err(failure) => {
                log_fetch_failure(category_name, pages_read, &failure);
                break;
            }
        };
        pages_read += 1;

        let page = parse_listing(&body, category_name, base_url);
        log_anomalies(category_name, &page.anomalies);

        if page.entries == 0 {
            tracing::debug!("Category '{}': {} has no books", category_name, page_url);
            break;
        }

        tracing::debug!(
            "Category '{}': {} books on {}",
            category_name,
            page.records.len(),
            page_url
        );
        records.extend(page.records);

        let Some(href) = page.next_page else {
            break;
        };

        match resolve_next_page(category_url, &href) {
            Ok(next) => page_url = next,
            Err(e) => {
                tracing::warn!(
                    "Category '{}': cannot resolve next page '{}': {}",
                    category_name,
                    href,
                    e
                );
                break;
            }
        }
    }

    tracing::info!(
        "Category '{}': {} books from {} pages",
        category_name,
        records.len(),
        pages_read
    );

    records
}

fn log_fetch_failure(category_name: &str, pages_read: usize, failure: &FetchFailure) {
    match failure {
        // A missing page after the first is how the site ends pagination
        FetchFailure::Status { status: 404, .. } if pages_read > 0 => {
            tracing::debug!("Category '{}': no page at {}", category_name, failure.url());
        }
        _ if pages_read > 0 => {
            tracing::warn!(
                "Category '{}': keeping {} pages after fetch failure: {}",
                category_name,
                pages_read,
                failure
            );
        }
        _ => {
            tracing::warn!("Category '{}': first page unavailable: {}", category_name, failure);
        }
    }
}

fn log_anomalies(category_name: &str, anomalies: &[ParseAnomaly]) {
    for anomaly in anomalies {
        match anomaly {
            ParseAnomaly::MissingTitle => {
                tracing::warn!("Category '{}': {}", category_name, anomaly)
            }
            _ => tracing::debug!("Category '{}': {}", category_name, anomaly),
        }
    }
}
