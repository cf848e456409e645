//! Listing page parser
//!
//! This module turns one category listing page into typed book records:
//! - Book entries (`article.product_pod`) with title, price, rating,
//!   availability and image
//! - The page-relative "next page" link, if any
//!
//! Missing or unexpected markup never fails the page. It degrades the
//! affected field and is reported as a [`ParseAnomaly`].

use crate::url::resolve_image_url;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

const PRODUCT_SELECTOR: &str = "article.product_pod";
const TITLE_SELECTOR: &str = "h3 a";
const PRICE_SELECTOR: &str = "p.price_color";
const AVAILABILITY_SELECTOR: &str = "p.availability";
const RATING_SELECTOR: &str = "p.star-rating";
const RATING_CLASS: &str = "star-rating";
const IMAGE_SELECTOR: &str = "img";
const NEXT_PAGE_SELECTOR: &str = "li.next a";

/// Ordinal rating vocabulary used by the site's `star-rating` classes
const RATINGS: [(&str, u8); 5] = [("One", 1), ("Two", 2), ("Three", 3), ("Four", 4), ("Five", 5)];

/// A book as scraped from a listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookRecord {
    pub title: String,
    /// Display price exactly as shown, e.g. `£51.77`
    pub price: String,
    /// 1 to 5, `None` when the rating class is missing or unrecognised
    pub rating: Option<u8>,
    pub availability: String,
    /// Name of the category the listing page belongs to
    pub category: String,
    /// Absolute image URL
    pub image_src: String,
}

/// A markup problem found while reading a book entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAnomaly {
    #[error("book entry has no title; entry skipped")]
    MissingTitle,

    #[error("'{title}' has no price")]
    MissingPrice { title: String },

    #[error("'{title}' has no availability")]
    MissingAvailability { title: String },

    #[error("'{title}' has no rating class")]
    MissingRating { title: String },

    #[error("'{title}' has unrecognised rating token '{token}'")]
    UnknownRating { title: String, token: String },

    #[error("'{title}' has no image")]
    MissingImage { title: String },

    #[error("'{title}' has unresolvable image path '{src}'")]
    InvalidImageUrl { title: String, src: String },
}

/// Everything extracted from one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Books found on the page, in document order
    pub records: Vec<BookRecord>,

    /// Page-relative href of the next page; `None` ends the category
    pub next_page: Option<String>,

    /// Non-fatal problems found while parsing
    pub anomalies: Vec<ParseAnomaly>,

    /// Book entries on the page, including ones skipped for a missing title
    pub entries: usize,
}

/// Maps a rating class token to its numeric value
///
/// # Examples
///
/// ```
/// use shelf_scraper::crawler::parse_rating;
///
/// assert_eq!(parse_rating("Four"), Some(4));
/// assert_eq!(parse_rating("Zero"), None);
/// ```
pub fn parse_rating(token: &str) -> Option<u8> {
    RATINGS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, value)| *value)
}

/// Parses one category listing page
///
/// Every record is tagged with `category_name`; image paths are resolved
/// against `base_url`. A page with no book entries yields no records and no
/// next link, whatever else the markup contains.
///
/// # Example
///
/// ```
/// use shelf_scraper::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<html><body><ol>
///   <article class="product_pod">
///     <img src="../../media/cover.jpg">
///     <p class="star-rating Two"></p>
///     <h3><a title="Sapiens">Sapiens</a></h3>
///     <p class="price_color">£54.23</p>
///     <p class="instock availability">In stock</p>
///   </article>
/// </ol></body></html>"#;
/// let base = Url::parse("https://books.toscrape.com/").unwrap();
///
/// let page = parse_listing(html, "History", &base);
/// assert_eq!(page.records[0].rating, Some(2));
/// assert_eq!(page.records[0].image_src, "https://books.toscrape.com/media/cover.jpg");
/// assert_eq!(page.next_page, None);
/// ```
pub fn parse_listing(html: &str, category_name: &str, base_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);
    let mut page = ListingPage::default();

    let Ok(product_selector) = Selector::parse(PRODUCT_SELECTOR) else {
        return page;
    };

    for entry in document.select(&product_selector) {
        page.entries += 1;
        if let Some(record) = parse_entry(entry, category_name, base_url, &mut page.anomalies) {
            page.records.push(record);
        }
    }

    if page.entries == 0 {
        return page;
    }

    page.next_page = select_first(document.root_element(), NEXT_PAGE_SELECTOR)
        .and_then(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string);

    page
}

/// Extracts one book entry; `None` when the entry has no usable title
fn parse_entry(
    entry: ElementRef<'_>,
    category_name: &str,
    base_url: &Url,
    anomalies: &mut Vec<ParseAnomaly>,
) -> Option<BookRecord> {
    let Some(title) = extract_title(entry) else {
        anomalies.push(ParseAnomaly::MissingTitle);
        return None;
    };

    let price = match select_first(entry, PRICE_SELECTOR).map(element_text) {
        Some(price) if !price.is_empty() => price,
        _ => {
            anomalies.push(ParseAnomaly::MissingPrice {
                title: title.clone(),
            });
            String::new()
        }
    };

    let availability = match select_first(entry, AVAILABILITY_SELECTOR).map(element_text) {
        Some(text) if !text.is_empty() => text,
        _ => {
            anomalies.push(ParseAnomaly::MissingAvailability {
                title: title.clone(),
            });
            String::new()
        }
    };

    let rating = extract_rating(entry, &title, anomalies);
    let image_src = extract_image(entry, base_url, &title, anomalies);

    Some(BookRecord {
        title,
        price,
        rating,
        availability,
        category: category_name.to_string(),
        image_src,
    })
}

/// The full title lives in the link's `title` attribute; the link text is
/// truncated by the site and only used as a fallback
fn extract_title(entry: ElementRef<'_>) -> Option<String> {
    let link = select_first(entry, TITLE_SELECTOR)?;

    link.value()
        .attr("title")
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .or_else(|| Some(element_text(link)).filter(|text| !text.is_empty()))
}

fn extract_rating(
    entry: ElementRef<'_>,
    title: &str,
    anomalies: &mut Vec<ParseAnomaly>,
) -> Option<u8> {
    let token = select_first(entry, RATING_SELECTOR)
        .and_then(|rating| rating.value().classes().find(|class| *class != RATING_CLASS));

    let Some(token) = token else {
        anomalies.push(ParseAnomaly::MissingRating {
            title: title.to_string(),
        });
        return None;
    };

    let rating = parse_rating(token);
    if rating.is_none() {
        anomalies.push(ParseAnomaly::UnknownRating {
            title: title.to_string(),
            token: token.to_string(),
        });
    }
    rating
}

fn extract_image(
    entry: ElementRef<'_>,
    base_url: &Url,
    title: &str,
    anomalies: &mut Vec<ParseAnomaly>,
) -> String {
    let Some(src) = select_first(entry, IMAGE_SELECTOR).and_then(|img| img.value().attr("src"))
    else {
        anomalies.push(ParseAnomaly::MissingImage {
            title: title.to_string(),
        });
        return String::new();
    };

    match resolve_image_url(base_url, src) {
        Ok(url) => url.to_string(),
        Err(_) => {
            anomalies.push(ParseAnomaly::InvalidImageUrl {
                title: title.to_string(),
                src: src.to_string(),
            });
            String::new()
        }
    }
}

/// First descendant of `element` matching `css`
fn select_first<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next()
}

/// Text content with each text node trimmed and blank nodes dropped
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
