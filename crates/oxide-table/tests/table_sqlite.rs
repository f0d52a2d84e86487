//! Integration tests for `Table` against an in-memory SQLite store.

mod common;

use common::{profiles_schema, profiles_table, store, tokens_schema, tokens_table};
use oxide_table::{Data, DecodePolicy, Filters, Store, Table, TableError, Value};
use serde_json::json;

// =============================================================================
// Schema sync
// =============================================================================

#[tokio::test]
async fn test_new_creates_prefixed_table() {
    let store = store().await.with_prefix("wp_");
    let table = Table::new(store, tokens_schema()).await.unwrap();

    assert_eq!(table.name(), "tokens");
    assert_eq!(table.table_name(), "wp_tokens");

    let found = table
        .store()
        .fetch_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'wp_tokens'",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(found, Value::Text("wp_tokens".into()));
}

#[tokio::test]
async fn test_sync_schema_is_idempotent() {
    let table = profiles_table().await;
    table.sync_schema().await.unwrap();
    table.sync_schema().await.unwrap();
    assert_eq!(table.count(&Filters::new()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_prefix_rejected() {
    let store = store().await.with_prefix("wp-");
    let err = Table::new(store, tokens_schema()).await.unwrap_err();
    assert!(matches!(err, TableError::Configuration(_)));
}

// =============================================================================
// CRUD round trip
// =============================================================================

#[tokio::test]
async fn test_insert_get_delete_flow() {
    let table = tokens_table().await;

    let id = table.insert(&Data::new().set("token", "abc")).await.unwrap();
    assert!(id > 0);

    let filters: Filters = serde_json::from_str(r#"{"token": {"value": "abc"}}"#).unwrap();
    let row = table.get_row(&filters).await.unwrap().unwrap();
    assert_eq!(row.get("token"), Some(&Value::Text("abc".into())));
    assert_eq!(row.get("id"), Some(&Value::Int(id)));

    let by_id: Filters = serde_json::from_value(json!({"id": {"value": id}})).unwrap();
    assert_eq!(table.delete(&by_id).await.unwrap(), 1);
    assert!(table.get_row(&by_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_count() {
    let table = tokens_table().await;
    assert_eq!(table.count(&Filters::new()).await.unwrap(), 0);

    table.insert(&Data::new().set("token", "a")).await.unwrap();
    table.insert(&Data::new().set("token", "b")).await.unwrap();

    assert_eq!(table.count(&Filters::new()).await.unwrap(), 2);
    assert_eq!(
        table.count(&Filters::new().eq("token", "a")).await.unwrap(),
        1
    );
    assert_eq!(
        table.count(&Filters::new().eq("token", "zzz")).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_unknown_insert_columns_ignored() {
    let table = tokens_table().await;
    let data = Data::new().set("token", "abc").set("bogus", 1);
    let id = table.insert(&data).await.unwrap();

    let row = table
        .get_row(&Filters::new().eq("id", id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "token", "ts"]);
}

#[tokio::test]
async fn test_unique_violation_is_persistence_error() {
    let table = tokens_table().await;
    table.insert(&Data::new().set("token", "dup")).await.unwrap();

    let err = table
        .insert(&Data::new().set("token", "dup"))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::Persistence(ref msg) if msg.contains("UNIQUE")));
}

// =============================================================================
// Limits
// =============================================================================

#[tokio::test]
async fn test_query_limits() {
    let table = tokens_table().await;
    for i in 0..12 {
        table
            .insert(&Data::new().set("token", format!("t{i}")))
            .await
            .unwrap();
    }

    let all = Filters::new();
    assert_eq!(table.query(&all, 0, 0).await.unwrap().len(), 10);
    assert_eq!(table.query(&all, -5, 0).await.unwrap().len(), 5);
    assert_eq!(table.query(&all, 20, 0).await.unwrap().len(), 12);
    assert_eq!(table.query(&all, 20, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_query_most_negative_limit() {
    let table = tokens_table().await;
    table.insert(&Data::new().set("token", "a")).await.unwrap();

    let rows = table.query(&Filters::new(), i64::MIN, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_query_with_operators() {
    let table = tokens_table().await;
    for token in ["apple", "apricot", "banana"] {
        table.insert(&Data::new().set("token", token)).await.unwrap();
    }

    let like = Filters::new().compare("token", "LIKE", "ap%");
    assert_eq!(table.query(&like, 0, 0).await.unwrap().len(), 2);

    let greater = Filters::new().compare("id", ">", 1);
    assert_eq!(table.query(&greater, 0, 0).await.unwrap().len(), 2);

    // Unknown operator compares with `=`.
    let bogus = Filters::new().compare("token", "!= 'x' OR 1=1 --", "banana");
    assert_eq!(table.query(&bogus, 0, 0).await.unwrap().len(), 1);
}

// =============================================================================
// Safety
// =============================================================================

#[tokio::test]
async fn test_delete_without_known_filter_refused() {
    let table = tokens_table().await;
    table.insert(&Data::new().set("token", "a")).await.unwrap();

    let err = table.delete(&Filters::new()).await.unwrap_err();
    assert!(matches!(err, TableError::UnsafeOperation(_)));

    let err = table
        .delete(&Filters::new().eq("nope", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::UnsafeOperation(_)));

    assert_eq!(table.count(&Filters::new()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_filter_values_are_bound() {
    let table = tokens_table().await;
    table.insert(&Data::new().set("token", "a")).await.unwrap();

    let injection = Filters::new().eq("token", "a' OR '1'='1");
    assert_eq!(table.delete(&injection).await.unwrap(), 0);
    assert_eq!(table.count(&Filters::new()).await.unwrap(), 1);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update() {
    let table = tokens_table().await;
    let id = table.insert(&Data::new().set("token", "old")).await.unwrap();

    let affected = table
        .update(
            &Data::new().set("token", "new"),
            &Data::new().set("id", id.to_string()),
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let token = table
        .get_column(&Filters::new().eq("id", id), "token")
        .await
        .unwrap();
    assert_eq!(token, Some(Value::Text("new".into())));
}

#[tokio::test]
async fn test_update_guards() {
    let table = tokens_table().await;
    let id = table.insert(&Data::new().set("token", "a")).await.unwrap();

    let err = table
        .update(&Data::new().set("token", "b"), &Data::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::UnsafeOperation(_)));

    let affected = table
        .update(&Data::new().set("bogus", "b"), &Data::new().set("id", id))
        .await
        .unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
async fn test_on_update_column_refreshed() {
    let table = profiles_table().await;
    let id = table
        .insert(
            &Data::new()
                .set("name", "ada")
                .set("updated", "2000-01-01 00:00:00"),
        )
        .await
        .unwrap();
    let by_id = Filters::new().eq("id", id);

    table
        .update(&Data::new().set("name", "grace"), &Data::new().set("id", id))
        .await
        .unwrap();
    let updated = table.get_column(&by_id, "updated").await.unwrap();
    assert_ne!(updated, Some(Value::Text("2000-01-01 00:00:00".into())));

    table
        .update(
            &Data::new().set("updated", "2001-01-01 00:00:00"),
            &Data::new().set("id", id),
        )
        .await
        .unwrap();
    let updated = table.get_column(&by_id, "updated").await.unwrap();
    assert_eq!(updated, Some(Value::Text("2001-01-01 00:00:00".into())));
}

// =============================================================================
// Codec
// =============================================================================

#[tokio::test]
async fn test_opaque_blob_round_trip() {
    let table = profiles_table().await;
    let meta = json!({"roles": ["admin", "editor"], "level": 3});
    let id = table
        .insert(&Data::new().set("name", "ada").set("meta", meta.clone()))
        .await
        .unwrap();

    let value = table
        .get_column(&Filters::new().eq("id", id), "meta")
        .await
        .unwrap();
    assert_eq!(value, Some(Value::Composite(meta)));

    let stored = table
        .store()
        .fetch_scalar("SELECT meta FROM profiles", &[])
        .await
        .unwrap();
    assert!(matches!(stored, Value::Text(ref s) if s.starts_with('{')));
}

#[tokio::test]
async fn test_composite_rejected_outside_opaque_blob() {
    let table = tokens_table().await;

    let err = table
        .insert(&Data::new().set("token", json!({"a": [1, 2]})))
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::TypeMismatch(ref msg) if msg.contains("token")));
    assert_eq!(table.count(&Filters::new()).await.unwrap(), 0);

    let id = table.insert(&Data::new().set("token", "a")).await.unwrap();
    let err = table
        .update(
            &Data::new().set("token", json!([1, 2])),
            &Data::new().set("id", id),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TableError::TypeMismatch(_)));

    let token = table
        .get_column(&Filters::new().eq("id", id), "token")
        .await
        .unwrap();
    assert_eq!(token, Some(Value::Text("a".into())));
}

#[tokio::test]
async fn test_decode_policies() {
    let store = store().await;
    let strict = Table::new(store.clone(), profiles_schema()).await.unwrap();
    let legacy = Table::new(store, profiles_schema())
        .await
        .unwrap()
        .with_decode_policy(DecodePolicy::Heuristic);

    strict
        .insert(&Data::new().set("name", "42").set("meta", "plain"))
        .await
        .unwrap();

    let row = strict.get_row(&Filters::new()).await.unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&Value::Text("42".into())));
    assert_eq!(row.get("meta"), Some(&Value::Text("plain".into())));

    // The heuristic reads numeric-looking text back as a number.
    let row = legacy.get_row(&Filters::new()).await.unwrap().unwrap();
    assert_eq!(row.get("name"), Some(&Value::Int(42)));
    assert_eq!(row.get("meta"), Some(&Value::Text("plain".into())));
}

#[tokio::test]
async fn test_get_column_not_found() {
    let table = profiles_table().await;
    let missing = Filters::new().eq("id", 99);
    assert_eq!(table.get_column(&missing, "name").await.unwrap(), None);

    let id = table.insert(&Data::new().set("name", "ada")).await.unwrap();
    let by_id = Filters::new().eq("id", id);
    assert_eq!(table.get_column(&by_id, "nope").await.unwrap(), None);
    assert_eq!(
        table.get_column(&by_id, "score").await.unwrap(),
        Some(Value::Float(0.0))
    );
}
