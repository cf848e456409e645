//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - The [`PageFetcher`] seam the crawler is written against
//! - Classifying transport errors and non-success statuses into
//!   [`FetchFailure`]

use crate::config::{FetcherConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_REDIRECTS: usize = 10;

/// Why a page could not be fetched
///
/// Whether a failure is fatal is up to the caller: the category index
/// aborts the run, a listing page only ends its category early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The request timed out
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    /// Connection refused, DNS failure, broken body, ...
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchFailure {
    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Timeout { url } | Self::Network { url, .. } => url,
        }
    }
}

/// A raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl FetchResponse {
    /// Returns true for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw page transport
///
/// Implementations return whatever status the server sent; only transport
/// problems are errors at this level.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Issues a single GET request
    async fn get(&self, url: &Url) -> Result<FetchResponse, FetchFailure>;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent is formatted as `Name/Version (+ContactURL; ContactEmail)`.
///
/// # Example
///
/// ```no_run
/// use shelf_scraper::config::{FetcherConfig, UserAgentConfig};
/// use shelf_scraper::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "ShelfScraper".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetcher: &FetcherConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetcher.timeout_secs))
        .connect_timeout(Duration::from_secs(fetcher.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetcher: &FetcherConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, fetcher)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &Url) -> Result<FetchResponse, FetchFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchResponse { status, body })
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchFailure::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchFailure::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Fetches one page, treating any non-2xx status as a failure
pub async fn fetch_page<F>(fetcher: &F, url: &Url) -> Result<FetchResponse, FetchFailure>
where
    F: PageFetcher + ?Sized,
{
    let response = fetcher.get(url).await?;

    if !response.is_success() {
        return Err(FetchFailure::Status {
            url: url.to_string(),
            status: response.status,
        });
    }

    tracing::trace!("Fetched {} ({} bytes)", url, response.body.len());
    Ok(response)
}
