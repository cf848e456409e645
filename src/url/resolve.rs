use url::{ParseError, Url};

const INDEX_PAGE: &str = "index.html";

/// Resolves a link found on the site root (e.g. a category link) against the
/// site base URL
///
/// # Examples
///
/// ```
/// use shelf_scraper::url::resolve_site_link;
/// use url::Url;
///
/// let base = Url::parse("https://books.toscrape.com/").unwrap();
/// let url = resolve_site_link(&base, "catalogue/category/books/poetry_23/index.html").unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://books.toscrape.com/catalogue/category/books/poetry_23/index.html"
/// );
/// ```
pub fn resolve_site_link(base_url: &Url, href: &str) -> Result<Url, ParseError> {
    base_url.join(href.trim())
}

/// Resolves a listing image path against the site base URL
///
/// Listing pages reference images as `../../../../media/...`. The leading
/// parent-directory segments are stripped and the remainder is joined to the
/// base, so images always land under the site root regardless of how deep
/// the listing page was.
///
/// # Examples
///
/// ```
/// use shelf_scraper::url::resolve_image_url;
/// use url::Url;
///
/// let base = Url::parse("https://books.toscrape.com/").unwrap();
/// let url = resolve_image_url(&base, "../../../../media/cache/2c/da/cover.jpg").unwrap();
/// assert_eq!(url.as_str(), "https://books.toscrape.com/media/cache/2c/da/cover.jpg");
/// ```
pub fn resolve_image_url(base_url: &Url, src: &str) -> Result<Url, ParseError> {
    let mut path = src.trim();
    loop {
        if let Some(rest) = path.strip_prefix("../") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else {
            break;
        }
    }
    base_url.join(path)
}

/// Resolves a "next page" href against the category's own URL
///
/// The site's pagination links are relative to the category directory, so
/// the category URL has any trailing `index.html` stripped and the href is
/// appended. Every page of a category resolves against the category URL, not
/// against the page currently being read.
///
/// Category URLs that do not end in a directory after stripping fall back to
/// ordinary relative resolution.
///
/// # Examples
///
/// ```
/// use shelf_scraper::url::resolve_next_page;
/// use url::Url;
///
/// let category = Url::parse("https://books.toscrape.com/catalogue/category/books/fiction_10/index.html").unwrap();
/// let next = resolve_next_page(&category, "page-2.html").unwrap();
/// assert_eq!(
///     next.as_str(),
///     "https://books.toscrape.com/catalogue/category/books/fiction_10/page-2.html"
/// );
/// ```
pub fn resolve_next_page(category_url: &Url, href: &str) -> Result<Url, ParseError> {
    let href = href.trim();
    let category = category_url.as_str();
    let directory = category.strip_suffix(INDEX_PAGE).unwrap_or(category);

    if directory.ends_with('/') {
        Url::parse(&format!("{}{}", directory, href))
    } else {
        category_url.join(href)
    }
}
