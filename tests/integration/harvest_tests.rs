//! End-to-end harvests: fetch from a mock endpoint, append to SQLite

use crate::support::page_json;
use tag_harvest::config::Config;
use tag_harvest::crawler::run_harvest;
use tag_harvest::storage::{open_store, QuestionStore, StorageError};
use tag_harvest::HarvestError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, db_path: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.page_size = 2;
    config.api.max_attempts = 1;
    config.crawl.tag = "python-polars".to_string();
    config.output.database_path = db_path.to_string();
    config
}

async fn mount_pages(server: &MockServer, pages: &[&[u64]]) {
    for (index, ids) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/2.3/questions"))
            .and(query_param("tagged", "python-polars"))
            .and(query_param("page", (index + 1).to_string()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page_json(
                    ids,
                    index + 1 < pages.len(),
                    None,
                )),
            )
            .up_to_n_times(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_harvest_appends_after_existing_rows() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("questions.db");
    let db_path = db_path.to_str().expect("Temp path is not UTF-8");

    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), db_path);

    mount_pages(&mock_server, &[&[1, 2], &[3]]).await;
    let first = run_harvest(&config, "hash-one").await.expect("First harvest failed");

    assert_eq!(first.questions, 3);
    assert_eq!(first.pages, 2);
    assert_eq!(first.receipt.previous_count, 0);
    assert_eq!(first.receipt.total, 3);

    mount_pages(&mock_server, &[&[3, 4]]).await;
    let second = run_harvest(&config, "hash-two").await.expect("Second harvest failed");

    assert_eq!(second.questions, 2);
    assert_eq!(second.receipt.previous_count, 3);
    assert_eq!(second.receipt.total, 5);

    let store = open_store(std::path::Path::new(db_path)).expect("Failed to open DB");
    let stored = store.load_questions().expect("Failed to load questions");
    let ids: Vec<u64> = stored.iter().map(|s| s.question.question_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 3, 4]);
    assert!(stored[0].crawl_date <= stored[4].crawl_date);

    let runs = store.list_runs().expect("Failed to list runs");
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].config_hash, "hash-one");
    assert_eq!(runs[1].config_hash, "hash-two");
    assert_eq!(runs[1].question_count, 2);
    assert_eq!(runs[1].tag, "python-polars");
}

#[tokio::test]
async fn test_failed_harvest_leaves_store_untouched() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("questions.db");
    let db_path = db_path.to_str().expect("Temp path is not UTF-8");

    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), db_path);

    mount_pages(&mock_server, &[&[1]]).await;
    run_harvest(&config, "hash").await.expect("First harvest failed");

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[2, 3], true, None)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let result = run_harvest(&config, "hash").await;
    assert!(matches!(
        result,
        Err(HarvestError::RetriesExhausted { page: 2, status: 500, .. })
    ));

    let store = open_store(std::path::Path::new(db_path)).expect("Failed to open DB");
    assert_eq!(store.count_questions().expect("Failed to count"), 1);
    assert_eq!(store.list_runs().expect("Failed to list runs").len(), 1);
}

#[tokio::test]
async fn test_unopenable_store_is_a_storage_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("missing").join("questions.db");
    let db_path = db_path.to_str().expect("Temp path is not UTF-8");

    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri(), db_path);
    mount_pages(&mock_server, &[&[1]]).await;

    let result = run_harvest(&config, "hash").await;
    assert!(matches!(
        result,
        Err(HarvestError::StorageError(StorageError::Sqlite(_)))
    ));
}
