//! End-to-end sync tests
//!
//! Each test stands up a mock catalog, runs a full sync into a temporary
//! database and checks what was stored.

use catalog_sync::config::{Config, OutputConfig, SourceConfig, SyncConfig, TransportConfig};
use catalog_sync::storage::{KeyValueStore, RunStatus, SqliteStorage};
use catalog_sync::sync::sync_catalog;
use catalog_sync::SyncError;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/pw-api/integrations/search-apps";
const STORE: &str = "integrations";
const KEY: &str = "make_integrations";

/// Creates a test configuration pointing at the mock server
fn create_test_config(
    base_uri: &str,
    page_size: u32,
    max_concurrent: u32,
    db_path: &Path,
) -> Config {
    Config {
        source: SourceConfig {
            base_url: format!("{}{}?name=&nativeApps=true&addOnApps=true", base_uri, SEARCH_PATH),
            item_url_prefix: "https://www.make.com/integrations/".to_string(),
            stats_limit: 10,
        },
        sync: SyncConfig {
            page_size,
            max_concurrent_requests: max_concurrent,
        },
        transport: TransportConfig {
            max_retries: 1,
            retry_delay_ms: 10, // Very short for testing
            timeout_secs: 5,
            user_agent: "catalog-sync-test/1.0".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().to_string(),
            key_value_store: STORE.to_string(),
            key: KEY.to_string(),
        },
    }
}

fn entity(n: u64) -> Value {
    if n == 3 {
        // Record without an icon
        json!({ "slug": format!("app-{}", n), "name": format!("App {}", n), "theme": "#333333" })
    } else {
        json!({
            "slug": format!("app-{}", n),
            "name": format!("App {}", n),
            "theme": format!("#00000{}", n),
            "icon": { "url": format!("https://cdn.example.com/app-{}.png", n) }
        })
    }
}

/// Page body holding items `offset..min(offset + limit, total)`
fn page_body(total: u64, limit: u64, offset: u64) -> Value {
    let end = (offset + limit).min(total);
    json!({
        "total": total,
        "limit": limit,
        "offset": offset,
        "entities": (offset..end).map(entity).collect::<Vec<_>>()
    })
}

async fn mount_stats(server: &MockServer, total: u64) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(total, 10, 0)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, total: u64, page_size: u64, offset: u64, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("limit", page_size.to_string().as_str()))
        .and(query_param("offset", offset.to_string().as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(total, page_size, offset))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn offset_of(request: &wiremock::Request) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == "offset")
        .map(|(_, v)| v.to_string())
}

fn open_store(db_path: &Path) -> SqliteStorage {
    SqliteStorage::new(db_path, STORE).expect("Failed to open store")
}

#[tokio::test]
async fn test_full_sync_stores_every_item() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");

    mount_stats(&mock_server, 5).await;
    // First page finishes last so pages complete out of order
    mount_page(&mock_server, 5, 2, 0, 300).await;
    mount_page(&mock_server, 5, 2, 2, 50).await;
    mount_page(&mock_server, 5, 2, 4, 0).await;

    let config = create_test_config(&mock_server.uri(), 2, 2, &db_path);
    let report = sync_catalog(&config, "test-hash")
        .await
        .expect("Sync should succeed");

    assert_eq!(report.total_items, 5);
    assert_eq!(report.pages, 3);
    assert_eq!(report.items_stored, 5);

    // Stats probe strictly first; offset 4 only after 0 and 2 were started
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[0].url.query_pairs().find(|(k, _)| k == "limit").unwrap().1, "10");
    let first_pages: HashSet<_> = requests[1..3].iter().filter_map(offset_of).collect();
    assert_eq!(
        first_pages,
        HashSet::from(["0".to_string(), "2".to_string()])
    );
    assert_eq!(offset_of(&requests[3]).as_deref(), Some("4"));

    let storage = open_store(&db_path);
    let stored = storage.get_value(KEY).unwrap().expect("Catalog should be stored");
    assert_eq!(stored.len(), 5);

    let names: HashSet<_> = stored.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(
        names,
        HashSet::from(["App 0", "App 1", "App 2", "App 3", "App 4"])
    );

    let app3 = stored.iter().find(|item| item.name == "App 3").unwrap();
    assert_eq!(app3.url, "https://www.make.com/integrations/app-3");
    assert_eq!(app3.icon, None);
    assert_eq!(app3.color, "#333333");

    let app1 = stored.iter().find(|item| item.name == "App 1").unwrap();
    assert_eq!(app1.icon.as_deref(), Some("https://cdn.example.com/app-1.png"));

    let run = storage.get_latest_run().unwrap().expect("Run should be recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.items_stored, Some(5));
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_empty_catalog_makes_only_the_stats_call() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");

    mount_stats(&mock_server, 0).await;

    let config = create_test_config(&mock_server.uri(), 100, 5, &db_path);
    let report = sync_catalog(&config, "test-hash").await.unwrap();

    assert_eq!(report.pages, 0);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    assert_eq!(open_store(&db_path).get_value(KEY).unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn test_failed_page_aborts_and_stores_nothing() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");

    mount_stats(&mock_server, 5).await;
    mount_page(&mock_server, 5, 1, 0, 0).await;
    mount_page(&mock_server, 5, 1, 1, 0).await;

    // Offset 2 keeps failing: first attempt plus one retry
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("limit", "1"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 1, &db_path);
    let err = sync_catalog(&config, "test-hash").await.unwrap_err();

    match &err {
        SyncError::Page { offset, .. } => assert_eq!(*offset, 2),
        other => panic!("expected page failure, got {:?}", other),
    }
    assert!(err.to_string().contains("offset 2"));

    // With one request at a time, pages after the failure are never requested
    let requested: Vec<_> = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(offset_of)
        .collect();
    assert!(!requested.contains(&"3".to_string()));
    assert!(!requested.contains(&"4".to_string()));

    let storage = open_store(&db_path);
    assert_eq!(storage.get_value(KEY).unwrap(), None);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error_message.unwrap().contains("offset 2"));
}

#[tokio::test]
async fn test_store_write_failure_marks_run_failed() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");

    mount_stats(&mock_server, 3).await;
    mount_page(&mock_server, 3, 100, 0, 0).await;

    // Create the schema, then reject every catalog write
    drop(open_store(&db_path));
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_catalog BEFORE INSERT ON kv_entries
         BEGIN SELECT RAISE(ABORT, 'catalog writes disabled'); END;",
    )
    .unwrap();
    drop(conn);

    let config = create_test_config(&mock_server.uri(), 100, 5, &db_path);
    let err = sync_catalog(&config, "test-hash").await.unwrap_err();

    assert!(matches!(err, SyncError::Storage(_)));
    // Stats probe and the single page were both fetched
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);

    let storage = open_store(&db_path);
    assert_eq!(storage.get_value(KEY).unwrap(), None);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error_message.unwrap().contains("catalog writes disabled"));
}

#[tokio::test]
async fn test_run_bookkeeping_failure_keeps_successful_sync() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");

    mount_stats(&mock_server, 2).await;
    mount_page(&mock_server, 2, 100, 0, 0).await;

    // Runs can be started but never finished
    drop(open_store(&db_path));
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER freeze_runs BEFORE UPDATE ON runs
         BEGIN SELECT RAISE(ABORT, 'runs are frozen'); END;",
    )
    .unwrap();
    drop(conn);

    let config = create_test_config(&mock_server.uri(), 100, 5, &db_path);
    let report = sync_catalog(&config, "test-hash")
        .await
        .expect("Stored catalog should count as success");

    assert_eq!(report.items_stored, 2);
    let storage = open_store(&db_path);
    assert_eq!(storage.get_value(KEY).unwrap().unwrap().len(), 2);
    assert_eq!(
        storage.get_latest_run().unwrap().unwrap().status,
        RunStatus::Running
    );
}

#[tokio::test]
async fn test_stats_failure_fetches_no_pages() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 100, 5, &db_path);
    let err = sync_catalog(&config, "test-hash").await.unwrap_err();

    assert!(matches!(err, SyncError::StatsProbe(_)));
    assert_eq!(open_store(&db_path).get_value(KEY).unwrap(), None);
}

#[tokio::test]
async fn test_resync_replaces_previous_catalog() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("catalog.db");

    {
        let mock_server = MockServer::start().await;
        mount_stats(&mock_server, 3).await;
        mount_page(&mock_server, 3, 100, 0, 0).await;
        let config = create_test_config(&mock_server.uri(), 100, 5, &db_path);
        sync_catalog(&config, "first").await.unwrap();
    }

    let mock_server = MockServer::start().await;
    mount_stats(&mock_server, 2).await;
    mount_page(&mock_server, 2, 100, 0, 0).await;
    let config = create_test_config(&mock_server.uri(), 100, 5, &db_path);
    sync_catalog(&config, "second").await.unwrap();

    let storage = open_store(&db_path);
    assert_eq!(storage.get_value(KEY).unwrap().unwrap().len(), 2);
    assert_eq!(storage.get_latest_run().unwrap().unwrap().config_hash, "second");
}
