//! Integration tests for the scrape pipelines
//!
//! These tests use wiremock to serve a small book shop and run the full
//! scrape → reconcile and scrape → CSV pipelines against it.

use shelf_scraper::config::{
    Config, CrawlerConfig, FetcherConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use shelf_scraper::crawler::{scrape_to_catalog, scrape_to_csv};
use shelf_scraper::storage::{open_catalog, BookQuery, CatalogStore};
use shelf_scraper::ScrapeError;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "TestBot/1.0.0 (+https://example.com/contact; test@example.com)";
const FICTION: &str = "/catalogue/category/books/fiction_10/index.html";
const FICTION_2: &str = "/catalogue/category/books/fiction_10/page-2.html";
const POETRY: &str = "/catalogue/category/books/poetry_23/index.html";
const POETRY_2: &str = "/catalogue/category/books/poetry_23/page-2.html";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &TempDir, concurrency: usize) -> Config {
    Config {
        site: SiteConfig {
            base_url: format!("{}/", base_url),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        fetcher: FetcherConfig {
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        crawler: CrawlerConfig {
            max_concurrent_categories: concurrency,
        },
        output: OutputConfig {
            database_path: dir.path().join("data/catalog.db").display().to_string(),
            csv_path: dir.path().join("export/books.csv").display().to_string(),
        },
    }
}

fn book(title: &str, rating: &str, price: &str) -> String {
    let slug = title.to_lowercase().replace(' ', "-");
    format!(
        r#"<li class="col-xs-6"><article class="product_pod">
            <div class="image_container">
                <a href="../../../{slug}/index.html"><img src="../../../../media/cache/{slug}.jpg" alt="{title}"></a>
            </div>
            <p class="star-rating {rating}"><i class="icon-star"></i></p>
            <h3><a href="../../../{slug}/index.html" title="{title}">{title}</a></h3>
            <div class="product_price">
                <p class="price_color">{price}</p>
                <p class="instock availability"><i class="icon-ok"></i>
                    In stock
                </p>
            </div>
        </article></li>"#
    )
}

fn listing(books: &[String], next: Option<&str>) -> String {
    let pager = next
        .map(|href| format!(r#"<ul class="pager"><li class="next"><a href="{}">next</a></li></ul>"#, href))
        .unwrap_or_default();
    format!(
        "<html><body><section><ol class=\"row\">{}</ol>{}</section></body></html>",
        books.concat(),
        pager
    )
}

fn index() -> String {
    format!(
        r#"<html><body>
        <div class="side_categories"><ul class="nav nav-list"><li>
            <a href="catalogue/category/books_1/index.html">Books</a>
            <ul>
                <li><a href="{}">
                    Fiction
                </a></li>
                <li><a href="{}">
                    Poetry
                </a></li>
            </ul>
        </li></ul></div>
        </body></html>"#,
        FICTION.trim_start_matches('/'),
        POETRY.trim_start_matches('/')
    )
}

async fn mount_html(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts a two-category shop; Poetry's second page is a server error
async fn mount_shop(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(index()))
        .mount(server)
        .await;

    mount_html(
        server,
        FICTION,
        200,
        listing(
            &[book("Night Train", "Three", "£51.77"), book("Dawn", "Zero", "£12.00")],
            Some("page-2.html"),
        ),
    )
    .await;
    mount_html(server, FICTION_2, 200, listing(&[book("Dusk", "Five", "£9.99")], None)).await;
    mount_html(
        server,
        POETRY,
        200,
        listing(&[book("Odes", "Two", "£20.00")], Some("page-2.html")),
    )
    .await;
    mount_html(server, POETRY_2, 500, "Internal Server Error".to_string()).await;
}

#[tokio::test]
async fn test_scrape_to_catalog_end_to_end() {
    let server = MockServer::start().await;
    mount_shop(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 1);

    let report = scrape_to_catalog(&config).await.unwrap();

    assert_eq!(report.records, 4);
    assert_eq!(report.categories, 2);
    let outcome = report.outcome.unwrap();
    assert_eq!(outcome.categories_created, 2);
    assert_eq!(outcome.books_created, 4);

    let catalog = open_catalog(dir.path().join("data/catalog.db").as_path()).unwrap();
    assert_eq!(catalog.count_categories().unwrap(), 2);
    assert_eq!(catalog.count_books().unwrap(), 4);

    let fiction = catalog
        .search_books(&BookQuery::default().category("fiction"))
        .unwrap();
    assert_eq!(fiction.len(), 3);

    let dawn = catalog
        .search_books(&BookQuery::default().title("dawn"))
        .unwrap();
    assert_eq!(dawn.len(), 1);
    assert_eq!(dawn[0].rating, None);
    assert_eq!(dawn[0].price, "£12.00");
    assert_eq!(dawn[0].availability, "In stock");
    assert_eq!(
        dawn[0].image_src,
        format!("{}/media/cache/dawn.jpg", server.uri())
    );

    let night = catalog
        .search_books(&BookQuery::default().title("Night Train"))
        .unwrap();
    assert_eq!(night[0].rating, Some(3));
}

#[tokio::test]
async fn test_rescrape_reuses_categories() {
    let server = MockServer::start().await;
    mount_shop(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 1);

    scrape_to_catalog(&config).await.unwrap();
    let second = scrape_to_catalog(&config).await.unwrap();

    let outcome = second.outcome.unwrap();
    assert_eq!(outcome.categories_created, 0);
    assert_eq!(outcome.books_created, 4);

    let catalog = open_catalog(dir.path().join("data/catalog.db").as_path()).unwrap();
    assert_eq!(catalog.count_categories().unwrap(), 2);
    assert_eq!(catalog.count_books().unwrap(), 8);
}

#[tokio::test]
async fn test_concurrent_scrape_collects_same_books() {
    let server = MockServer::start().await;
    mount_shop(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 4);

    let report = scrape_to_catalog(&config).await.unwrap();

    assert_eq!(report.records, 4);

    let catalog = open_catalog(dir.path().join("data/catalog.db").as_path()).unwrap();
    let per_category = catalog.books_per_category().unwrap();
    assert_eq!(
        per_category,
        vec![("Fiction".to_string(), 3), ("Poetry".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_scrape_to_csv() {
    let server = MockServer::start().await;
    mount_shop(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 1);

    let report = scrape_to_csv(&config).await.unwrap();

    assert_eq!(report.records, 4);
    assert!(report.outcome.is_none());

    let mut reader = csv::Reader::from_path(dir.path().join("export/books.csv")).unwrap();
    assert_eq!(
        reader.headers().unwrap().iter().collect::<Vec<_>>(),
        vec!["Title", "Price", "Rating", "Availability", "Category", "Image source"]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 4);

    let dawn = rows.iter().find(|row| &row[0] == "Dawn").unwrap();
    assert_eq!(&dawn[2], "");
    assert_eq!(&dawn[4], "Fiction");

    // CSV mode never touches the catalog
    assert!(!dir.path().join("data/catalog.db").exists());
}

#[tokio::test]
async fn test_index_failure_aborts_without_touching_catalog() {
    let server = MockServer::start().await;
    mount_html(&server, "/", 503, "Service Unavailable".to_string()).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 1);

    let result = scrape_to_catalog(&config).await;

    assert!(matches!(result, Err(ScrapeError::IndexUnavailable(_))));

    let catalog = open_catalog(dir.path().join("data/catalog.db").as_path()).unwrap();
    assert_eq!(catalog.count_categories().unwrap(), 0);
    assert_eq!(catalog.count_books().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_category_page_still_reconciles_others() {
    let server = MockServer::start().await;
    mount_html(&server, "/", 200, index()).await;
    mount_html(
        &server,
        POETRY,
        200,
        listing(&[book("Odes", "Four", "£20.00")], None),
    )
    .await;
    // Fiction is left unmounted and answers 404
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 1);

    let report = scrape_to_catalog(&config).await.unwrap();

    assert_eq!(report.records, 1);
    assert_eq!(report.outcome.unwrap().categories_created, 1);
}
