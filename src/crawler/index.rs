//! Category index builder
//!
//! Reads the site root's side navigation into a name → URL map.

use crate::crawler::fetcher::{fetch_page, FetchFailure, PageFetcher};
use crate::crawler::parser::element_text;
use crate::url::resolve_site_link;
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

const CATEGORY_LINK_SELECTOR: &str = "div.side_categories ul li ul li a";

/// Category name → absolute category URL, valid for one scrape run
///
/// Iteration order carries no meaning.
pub type CategoryIndex = HashMap<String, Url>;

/// Fetches the site root and extracts every category link
///
/// A failure here is fatal to the run: without the index there is nothing
/// to crawl.
pub async fn build_index<F>(fetcher: &F, base_url: &Url) -> Result<CategoryIndex, FetchFailure>
where
    F: PageFetcher + ?Sized,
{
    let response = fetch_page(fetcher, base_url).await?;
    let index = parse_category_index(&response.body, base_url);

    tracing::info!("Found {} categories at {}", index.len(), base_url);
    Ok(index)
}

/// Extracts the category index from the site root's markup
///
/// Links without text or with an unresolvable href are skipped. If a name
/// appears twice the later link wins.
pub fn parse_category_index(html: &str, base_url: &Url) -> CategoryIndex {
    let document = Html::parse_document(html);
    let mut index = CategoryIndex::new();

    let Ok(selector) = Selector::parse(CATEGORY_LINK_SELECTOR) else {
        return index;
    };

    for link in document.select(&selector) {
        let name = element_text(link);
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        match resolve_site_link(base_url, href) {
            Ok(url) => {
                index.insert(name, url);
            }
            Err(e) => {
                tracing::warn!("Skipping category '{}' with bad link '{}': {}", name, href, e);
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::{index_html, StaticFetcher};

    fn base_url() -> Url {
        Url::parse("https://books.toscrape.com/").unwrap()
    }

    #[test]
    fn test_parse_category_index() {
        let html = index_html(&[
            ("Travel", "catalogue/category/books/travel_2/index.html"),
            ("Mystery", "catalogue/category/books/mystery_3/index.html"),
        ]);

        let index = parse_category_index(&html, &base_url());

        assert_eq!(index.len(), 2);
        assert_eq!(
            index["Travel"].as_str(),
            "https://books.toscrape.com/catalogue/category/books/travel_2/index.html"
        );
        assert_eq!(
            index["Mystery"].as_str(),
            "https://books.toscrape.com/catalogue/category/books/mystery_3/index.html"
        );
    }

    #[test]
    fn test_top_level_books_link_is_not_a_category() {
        let html = index_html(&[("Poetry", "poetry/index.html")]);
        let index = parse_category_index(&html, &base_url());

        assert!(!index.contains_key("Books"));
        assert!(index.contains_key("Poetry"));
    }

    #[test]
    fn test_links_outside_navigation_are_ignored() {
        let html = r#"<html><body>
            <ul><li><ul><li><a href="x/index.html">Not A Category</a></li></ul></li></ul>
            <div class="side_categories"><ul><li><ul>
                <li><a href="art/index.html">Art</a></li>
                <li><a>No Href</a></li>
                <li><a href="blank/index.html">   </a></li>
            </ul></li></ul></div>
            </body></html>"#;

        let index = parse_category_index(html, &base_url());

        assert_eq!(index.len(), 1);
        assert!(index.contains_key("Art"));
    }

    #[test]
    fn test_empty_page_yields_empty_index() {
        assert!(parse_category_index("<html></html>", &base_url()).is_empty());
    }

    #[tokio::test]
    async fn test_build_index_fetches_root() {
        let fetcher = StaticFetcher::new().page(
            "https://books.toscrape.com/",
            200,
            index_html(&[("Fiction", "/fiction/index.html")]),
        );

        let index = build_index(&fetcher, &base_url()).await.unwrap();

        assert_eq!(
            index["Fiction"].as_str(),
            "https://books.toscrape.com/fiction/index.html"
        );
        assert_eq!(fetcher.requested(), vec!["https://books.toscrape.com/"]);
    }

    #[tokio::test]
    async fn test_build_index_root_failure_is_error() {
        let fetcher = StaticFetcher::new().page("https://books.toscrape.com/", 503, "down");

        let result = build_index(&fetcher, &base_url()).await;

        assert_eq!(
            result,
            Err(FetchFailure::Status {
                url: "https://books.toscrape.com/".to_string(),
                status: 503,
            })
        );
    }
}
