//! Scrape coordinator - runs a whole scrape
//!
//! The coordinator ties the other crawler pieces together:
//! - Builds the category index from the site root (fatal on failure)
//! - Crawls every category, one at a time or fanned out across tasks
//! - Concatenates the per-category results into one batch

use crate::config::Config;
use crate::crawler::category::crawl_category;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::index::{build_index, CategoryIndex};
use crate::crawler::parser::BookRecord;
use crate::ScrapeError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Runs one scrape of the site at `base_url`
///
/// Records are returned in no meaningful order. With a concurrency limit of
/// one, categories are crawled sequentially in name order.
pub struct Scraper<F: PageFetcher + 'static> {
    fetcher: Arc<F>,
    base_url: Url,
    max_concurrent_categories: usize,
}

impl Scraper<HttpFetcher> {
    /// Creates a scraper that talks HTTP with the configured client settings
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetcher)?;
        let base_url = Url::parse(&config.site.base_url)?;

        Ok(Self::new(fetcher, base_url).with_concurrency(config.crawler.max_concurrent_categories))
    }
}

impl<F: PageFetcher + 'static> Scraper<F> {
    pub fn new(fetcher: F, base_url: Url) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            base_url,
            max_concurrent_categories: 1,
        }
    }

    /// Sets how many categories may be crawled at once (minimum one)
    pub fn with_concurrency(mut self, max_concurrent_categories: usize) -> Self {
        self.max_concurrent_categories = max_concurrent_categories.max(1);
        self
    }

    /// Builds the index, crawls every category, returns the combined batch
    ///
    /// Only an unavailable category index is an error. Per-category problems
    /// shrink the batch instead.
    pub async fn run(&self) -> Result<Vec<BookRecord>, ScrapeError> {
        let index = build_index(self.fetcher.as_ref(), &self.base_url).await?;

        if index.is_empty() {
            tracing::warn!("No categories found at {}", self.base_url);
            return Ok(Vec::new());
        }

        let records = if self.max_concurrent_categories <= 1 {
            self.crawl_sequential(index).await
        } else {
            self.crawl_concurrent(index).await?
        };

        tracing::info!("Scrape produced {} book records", records.len());
        Ok(records)
    }

    async fn crawl_sequential(&self, index: CategoryIndex) -> Vec<BookRecord> {
        let mut categories: Vec<(String, Url)> = index.into_iter().collect();
        categories.sort_by(|a, b| a.0.cmp(&b.0));

        let mut records = Vec::new();
        for (name, url) in categories {
            let batch = crawl_category(self.fetcher.as_ref(), &self.base_url, &name, &url).await;
            records.extend(batch);
        }
        records
    }

    async fn crawl_concurrent(&self, index: CategoryIndex) -> Result<Vec<BookRecord>, ScrapeError> {
        tracing::debug!(
            "Crawling {} categories, up to {} at a time",
            index.len(),
            self.max_concurrent_categories
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_categories));
        let mut tasks = JoinSet::new();

        for (name, url) in index {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ScrapeError::CrawlTask(e.to_string()))?;
            let fetcher = Arc::clone(&self.fetcher);
            let base_url = self.base_url.clone();

            tasks.spawn(async move {
                let records = crawl_category(fetcher.as_ref(), &base_url, &name, &url).await;
                drop(permit);
                records
            });
        }

        let mut records = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let batch = joined.map_err(|e| ScrapeError::CrawlTask(e.to_string()))?;
            records.extend(batch);
        }
        Ok(records)
    }
}
