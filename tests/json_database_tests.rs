//! Integration tests for the file-backed JSON store: persistence, recovery
//! and concurrent writers.

use std::sync::Arc;

use serde_json::{Value, json};
use task_control::{DbError, JsonDatabase, Record, StoreConfig, StoreStatus};
use tempfile::TempDir;

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

async fn open(temp_dir: &TempDir) -> JsonDatabase {
    let db = JsonDatabase::new(StoreConfig::new(temp_dir.path(), "db.json"));
    db.initialize().await.unwrap();
    db
}

#[tokio::test]
async fn test_missing_file_is_created_on_initialize() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    assert!(!path.exists());

    let db = open(&temp_dir).await;

    assert_eq!(db.status(), StoreStatus::Ready);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
}

#[tokio::test]
async fn test_round_trip_through_reinitialize() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(&temp_dir).await;

    db.insert("tasks", record(json!({"id": "a", "title": "First", "n": 1})))
        .await
        .unwrap();
    db.insert("tasks", record(json!({"id": "b", "title": "Second", "tags": ["x"]})))
        .await
        .unwrap();
    db.insert("notes", record(json!({"id": "n1", "body": null})))
        .await
        .unwrap();
    let before_tasks = db.select("tasks", None).unwrap();
    let before_notes = db.select("notes", None).unwrap();
    drop(db);

    let reopened = open(&temp_dir).await;
    assert_eq!(reopened.select("tasks", None).unwrap(), before_tasks);
    assert_eq!(reopened.select("notes", None).unwrap(), before_notes);
    assert_eq!(reopened.info().tables, vec!["notes", "tasks"]);
}

#[tokio::test]
async fn test_initialize_again_reloads_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(&temp_dir).await;
    db.insert("tasks", record(json!({"id": "1"}))).await.unwrap();

    std::fs::write(
        temp_dir.path().join("db.json"),
        r#"{"tasks": [{"id": "from-disk"}]}"#,
    )
    .unwrap();
    db.initialize().await.unwrap();

    assert!(db.find_by_id("tasks", "1").unwrap().is_none());
    assert!(db.find_by_id("tasks", "from-disk").unwrap().is_some());
}

#[tokio::test]
async fn test_partial_match_filter() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(&temp_dir).await;
    db.insert("t", record(json!({"id": "1", "title": "Buy milk", "completed": false})))
        .await
        .unwrap();
    db.insert("t", record(json!({"id": "2", "title": "buy eggs", "completed": true})))
        .await
        .unwrap();

    let found = db
        .select("t", Some(&record(json!({"title": "BUY", "completed": false}))))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], "1");

    // null is a wildcard, a field the record lacks is not
    assert_eq!(db.select("t", Some(&record(json!({"title": null})))).unwrap().len(), 2);
    assert!(db.select("t", Some(&record(json!({"priority": "high"})))).unwrap().is_empty());
}

#[tokio::test]
async fn test_update_merges_and_preserves_id() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(&temp_dir).await;
    db.insert("t", record(json!({"id": "1", "title": "Old", "keep": true})))
        .await
        .unwrap();

    let updated = db
        .update("t", "1", record(json!({"id": "hijack", "title": "New"})))
        .await
        .unwrap();
    assert!(updated);

    let row = db.find_by_id("t", "1").unwrap().unwrap();
    assert_eq!(row, record(json!({"id": "1", "title": "New", "keep": true})));
    assert!(db.find_by_id("t", "hijack").unwrap().is_none());

    assert!(!db.update("t", "missing", Record::new()).await.unwrap());
}

#[tokio::test]
async fn test_delete_missing_leaves_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    let db = open(&temp_dir).await;
    db.insert("t", record(json!({"id": "1"}))).await.unwrap();

    let before = std::fs::read(&path).unwrap();
    assert!(!db.delete("t", "nope").await.unwrap());
    assert!(!db.delete("other", "1").await.unwrap());
    assert_eq!(std::fs::read(&path).unwrap(), before);

    assert!(db.delete("t", "1").await.unwrap());
    assert_ne!(std::fs::read(&path).unwrap(), before);
    assert_eq!(db.count("t").unwrap(), 0);
}

#[tokio::test]
async fn test_file_is_pretty_printed_and_complete() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(&temp_dir).await;
    db.insert("tasks", record(json!({"id": "1"}))).await.unwrap();

    let text = std::fs::read_to_string(temp_dir.path().join("db.json")).unwrap();
    assert_eq!(text, "{\n  \"tasks\": [\n    {\n      \"id\": \"1\"\n    }\n  ]\n}");
    assert!(!temp_dir.path().join("db.json.tmp").exists());
}

#[tokio::test]
async fn test_malformed_file_recovers_to_empty_store() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    std::fs::write(&path, "{ not json").unwrap();

    let db = open(&temp_dir).await;

    assert_eq!(db.status(), StoreStatus::Ready);
    assert!(db.info().tables.is_empty());
    let rewritten: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(rewritten, json!({}));
}

#[tokio::test]
async fn test_wrong_shape_counts_as_malformed() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("db.json"), r#"[1, 2, 3]"#).unwrap();

    let db = open(&temp_dir).await;
    assert_eq!(db.info().total_records, 0);
}

#[tokio::test]
async fn test_whitespace_file_is_empty_database() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    std::fs::write(&path, "  \n").unwrap();

    let db = open(&temp_dir).await;
    assert!(db.info().tables.is_empty());
    // left as is until the first mutation
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "  \n");
}

#[tokio::test]
async fn test_clear_drop_and_info() {
    let temp_dir = TempDir::new().unwrap();
    let db = open(&temp_dir).await;
    db.insert("a", record(json!({"id": "1"}))).await.unwrap();
    db.insert("a", record(json!({"id": "2"}))).await.unwrap();
    db.insert("b", record(json!({"id": "3"}))).await.unwrap();

    let info = db.info();
    assert_eq!(info.tables, vec!["a", "b"]);
    assert_eq!(info.total_records, 3);
    assert!(info.initialized);
    assert_eq!(info.path, temp_dir.path().join("db.json"));

    db.clear("a").await.unwrap();
    assert_eq!(db.count("a").unwrap(), 0);
    assert_eq!(db.info().tables, vec!["a", "b"]);

    db.clear("fresh").await.unwrap();
    assert_eq!(db.info().tables, vec!["a", "b", "fresh"]);

    db.drop_table("b").await.unwrap();
    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("db.json")).unwrap())
            .unwrap();
    assert_eq!(on_disk, json!({"a": [], "fresh": []}));
}

#[tokio::test]
async fn test_force_sync_rewrites_deleted_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    let db = open(&temp_dir).await;
    db.insert("t", record(json!({"id": "1"}))).await.unwrap();

    std::fs::remove_file(&path).unwrap();
    db.force_sync().await.unwrap();

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk, json!({"t": [{"id": "1"}]}));
}

#[tokio::test]
async fn test_failed_persist_keeps_committed_state() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let db = JsonDatabase::new(StoreConfig::new(&data_dir, "db.json"));
    db.initialize().await.unwrap();
    db.insert("t", record(json!({"id": "1"}))).await.unwrap();

    // A directory where the temp file should go makes the next write fail.
    std::fs::create_dir(data_dir.join("db.json.tmp")).unwrap();

    let err = db.insert("t", record(json!({"id": "2"}))).await.unwrap_err();
    assert!(matches!(err, DbError::IoError(_)));
    assert_eq!(db.count("t").unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_writers_are_all_persisted() {
    let temp_dir = TempDir::new().unwrap();
    let db = Arc::new(open(&temp_dir).await);

    let writers = (0..50).map(|i| {
        let db = Arc::clone(&db);
        async move {
            db.insert("t", record(json!({"id": i.to_string(), "n": i})))
                .await
                .unwrap();
        }
    });
    futures::future::join_all(writers).await;

    let mut handles = Vec::new();
    for i in 50..100 {
        let db = Arc::clone(&db);
        handles.push(tokio::spawn(async move {
            db.insert("t", record(json!({"id": i.to_string(), "n": i})))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(db.count("t").unwrap(), 100);

    let reopened = open(&temp_dir).await;
    assert_eq!(reopened.count("t").unwrap(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_unpersisted_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db.json");
    let db = Arc::new(open(&temp_dir).await);

    let writer = {
        let db = Arc::clone(&db);
        tokio::spawn(async move {
            for i in 0..60 {
                db.insert("t", record(json!({"id": i.to_string()}))).await.unwrap();
            }
        })
    };

    let reader = tokio::task::spawn_blocking(move || {
        let mut checks = 0;
        loop {
            let in_memory = db.count("t").unwrap();
            let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
            let persisted = on_disk.get("t").and_then(Value::as_array).map_or(0, Vec::len);
            assert!(
                persisted >= in_memory,
                "memory shows {in_memory} rows while the file holds {persisted}"
            );
            checks += 1;
            if in_memory == 60 {
                return checks;
            }
        }
    });

    writer.await.unwrap();
    assert!(reader.await.unwrap() > 0);
}
