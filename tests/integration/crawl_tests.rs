//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog API and run the real
//! HTTP fetcher and SQLite store end-to-end.

use catalog_walker::config::{
    ApiConfig, BrowserConfig, Config, CrawlerConfig, OutputConfig, StoreEntry,
};
use catalog_walker::crawler::{crawl, Coordinator, HttpPageFetcher, PageFetcher};
use catalog_walker::storage::{open_storage, CatalogStore, RunStatus, SqliteCatalogStore};
use catalog_walker::{Category, RunMode};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPARTMENTS: &str = "/api/v3/stores/1/departments/";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig::default(),
        browser: BrowserConfig {
            settle_delay_ms: 0, // No settling needed against a mock
            ..BrowserConfig::default()
        },
        api: ApiConfig {
            base_url: base_url.to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        stores: vec![StoreEntry {
            id: 1,
            slug: "auchan".to_string(),
        }],
    }
}

/// Mounts one listing page of `slug`
async fn mount_listing(server: &MockServer, slug: &str, page: u32, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("{}{}", DEPARTMENTS, slug)))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts the children probe of `slug`
///
/// Must be mounted after the listings of the same slug so those win.
async fn mount_probe(server: &MockServer, slug: &str, leaf: bool) {
    let response = if leaf {
        ResponseTemplate::new(404).set_body_json(json!({"message": "category without children"}))
    } else {
        ResponseTemplate::new(200).set_body_json(json!({"department": {"slug": slug}}))
    };

    Mock::given(method("GET"))
        .and(path(format!("{}{}", DEPARTMENTS, slug)))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Root: Food(1, internal) and Drinks(2, leaf); Food: Dairy(11, leaf)
async fn mount_catalog(server: &MockServer) {
    mount_listing(
        server,
        "",
        1,
        json!({"departments": [
            {"id": 1, "slug": "food", "name": "Food"},
            {"id": 2, "slug": "drinks", "name": "Drinks",
             "products": [{"name": "Water", "image_urls": ["w.jpg"], "canonical_url": "/water"}]}
        ]}),
    )
    .await;
    mount_listing(server, "", 2, json!({"departments": []})).await;

    mount_listing(
        server,
        "food",
        1,
        json!({"department": {"id": 1}, "departments": [
            {"id": 11, "slug": "dairy", "name": "Dairy",
             "products": [{"name": "Milk"}, {"name": "Kefir"}]}
        ]}),
    )
    .await;
    mount_listing(server, "food", 2, json!({"department": {"id": 1}, "departments": []})).await;

    mount_probe(server, "food", false).await;
    mount_probe(server, "drinks", true).await;
    mount_probe(server, "dairy", true).await;
}

#[tokio::test]
async fn test_full_crawl_single_store() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());

    let reports = crawl(config, "hash", RunMode::Full, None).await.unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].item_count(), 3);
    assert_eq!(reports[0].unique_categories, 4);

    let store = open_storage(&db_path).unwrap();
    let categories = store.list_categories().unwrap();
    assert_eq!(categories.len(), 4);
    assert_eq!(categories[0], Category::root());
    assert!(categories.contains(&Category::internal(1, "Food", 0)));
    assert!(categories.contains(&Category::leaf(2, "Drinks", 0)));
    assert!(categories.contains(&Category::leaf(11, "Dairy", 1)));

    let products = store.list_products().unwrap();
    assert_eq!(products.len(), 3);
    let water = products
        .iter()
        .find(|p| p.name.as_deref() == Some("Water"))
        .unwrap();
    assert_eq!(water.category_id, 2);
    assert_eq!(water.image_url.as_deref(), Some("w.jpg"));
    assert_eq!(water.link.as_deref(), Some("/water"));

    let run = store.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.item_count, Some(3));
}

#[tokio::test]
async fn test_second_full_crawl_replaces_data() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());

    crawl(config.clone(), "hash", RunMode::Full, None).await.unwrap();
    crawl(config, "hash", RunMode::Full, Some("AUCHAN")).await.unwrap();

    let store = open_storage(&db_path).unwrap();
    assert_eq!(store.count_categories().unwrap(), 4);
    assert_eq!(store.count_products().unwrap(), 3);
}

#[tokio::test]
async fn test_incremental_crawl_keeps_existing_rows() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());

    crawl(config.clone(), "hash", RunMode::Full, None).await.unwrap();
    let reports = crawl(config, "hash", RunMode::Incremental, None).await.unwrap();

    // Nothing new to write, products are appended again
    assert_eq!(reports[0].categories_written, 0);
    let store = open_storage(&db_path).unwrap();
    assert_eq!(store.count_categories().unwrap(), 4);
    assert_eq!(store.count_products().unwrap(), 6);
    assert_eq!(store.list_runs().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rendered_page_is_decoded_from_pre() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEPARTMENTS))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                    r#"<html><head></head><body><pre>{"department":{"id":7},"departments":[]}</pre></body></html>"#,
                )
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpPageFetcher::new(&BrowserConfig {
        settle_delay_ms: 0,
        ..BrowserConfig::default()
    })
    .unwrap();

    let document = fetcher
        .fetch(&format!("{}{}?page=1", server.uri(), DEPARTMENTS))
        .await;

    assert_eq!(document, json!({"department": {"id": 7}, "departments": []}));
}

#[tokio::test]
async fn test_unreachable_server_yields_empty_document() {
    // Nothing listens on port 1
    let uri = "http://127.0.0.1:1/api/v3/stores/1/departments/";

    let fetcher = HttpPageFetcher::new(&BrowserConfig {
        settle_delay_ms: 0,
        request_timeout_secs: Some(5),
        ..BrowserConfig::default()
    })
    .unwrap();

    assert_eq!(fetcher.fetch(uri).await, json!({}));
    assert_eq!(fetcher.fetch_ephemeral(uri).await, json!({}));
}

#[tokio::test]
async fn test_probe_uses_isolated_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}dairy", DEPARTMENTS)))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"message": "category without children"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpPageFetcher::new(&BrowserConfig {
        settle_delay_ms: 0,
        ..BrowserConfig::default()
    })
    .unwrap();

    let document = fetcher
        .fetch_ephemeral(&format!("{}{}dairy", server.uri(), DEPARTMENTS))
        .await;

    assert_eq!(document["message"], "category without children");
}

#[tokio::test]
async fn test_coordinator_over_http_with_in_memory_store() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let config = create_test_config(&server.uri(), ":memory:");
    let fetcher = HttpPageFetcher::new(&config.browser).unwrap();
    let store = SqliteCatalogStore::new_in_memory().unwrap();
    let mut coordinator = Coordinator::new(config, "hash", fetcher, store);

    let report = coordinator.run_selected("auchan", RunMode::Full).await.unwrap();

    assert_eq!(report.categories_written, 4);
    assert_eq!(coordinator.store().count_leaf_categories().unwrap(), 2);
}
