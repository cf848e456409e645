//! Test doubles and HTML fixtures for crawler unit tests

use crate::crawler::fetcher::{FetchFailure, FetchResponse, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Serves canned responses; unknown URLs fail like a refused connection
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, FetchResponse>,
    requested: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchResponse {
                status,
                body: body.into(),
            },
        );
        self
    }

    /// URLs requested so far, in order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn get(&self, url: &Url) -> Result<FetchResponse, FetchFailure> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchFailure::Network {
                url: url.to_string(),
                message: "Connection refused".to_string(),
            })
    }
}

/// A book entry to render into a listing fixture
pub struct TestBook {
    pub title: String,
    pub rating_token: String,
    pub price: String,
}

impl TestBook {
    pub fn new(title: &str, rating_token: &str) -> Self {
        Self {
            title: title.to_string(),
            rating_token: rating_token.to_string(),
            price: "£10.00".to_string(),
        }
    }

    pub fn price(mut self, price: &str) -> Self {
        self.price = price.to_string();
        self
    }

    pub fn slug(&self) -> String {
        self.title.to_lowercase().replace(' ', "-")
    }
}

/// Renders one `article.product_pod` the way the site does
pub fn book_entry(book: &TestBook) -> String {
    format!(
        r#"<li><article class="product_pod">
    <div class="image_container">
        <a href="../../../{slug}_1/index.html"><img src="../../../../media/cache/{slug}.jpg" alt="{title}" class="thumbnail"></a>
    </div>
    <p class="star-rating {rating}">
        <i class="icon-star"></i><i class="icon-star"></i>
    </p>
    <h3><a href="../../../{slug}_1/index.html" title="{title}">{title}</a></h3>
    <div class="product_price">
        <p class="price_color">{price}</p>
        <p class="instock availability">
            <i class="icon-ok"></i>
            In stock
        </p>
    </div>
</article></li>"#,
        slug = book.slug(),
        title = book.title,
        rating = book.rating_token,
        price = book.price,
    )
}

/// Renders a listing page with an optional `li.next` pager link
pub fn listing_html(books: &[TestBook], next: Option<&str>) -> String {
    let entries: String = books.iter().map(book_entry).collect();
    let pager = next
        .map(|href| {
            format!(
                r#"<ul class="pager"><li class="current">Page</li><li class="next"><a href="{}">next</a></li></ul>"#,
                href
            )
        })
        .unwrap_or_default();

    format!(
        r#"<html><head><title>Listing</title></head><body>
<section><ol class="row">{}</ol><div>{}</div></section>
</body></html>"#,
        entries, pager
    )
}

/// Renders a site root whose side navigation lists `categories` as (name, href)
pub fn index_html(categories: &[(&str, &str)]) -> String {
    let links: String = categories
        .iter()
        .map(|(name, href)| {
            format!(
                "<li>\n<a href=\"{}\">\n                            {}\n                        </a>\n</li>\n",
                href, name
            )
        })
        .collect();

    format!(
        r#"<html><body>
<div class="side_categories">
  <ul class="nav nav-list">
    <li><a href="catalogue/category/books_1/index.html">Books</a>
      <ul>{}</ul>
    </li>
  </ul>
</div>
<section><ol class="row">{}</ol></section>
</body></html>"#,
        links,
        book_entry(&TestBook::new("Front Page Book", "Two"))
    )
}
