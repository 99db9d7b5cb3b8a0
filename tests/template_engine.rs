//! Template engine integration tests
//!
//! Exercises extraction, catalog sync, completeness and rendering together
//! through the public API, the way the message flow chains them.

use serde_json::json;

use notification_template_service::metrics::TAGS_EXTRACTED_TOTAL;
use notification_template_service::store::{MemoryStore, TagCatalog};
use notification_template_service::template::{
    extract_tags, missing_tags, render, sync_tags, TagValueMap,
};

fn values(value: serde_json::Value) -> TagValueMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn test_extraction_keeps_order_and_duplicates() {
    assert_eq!(
        extract_tags("Hi {name}, your code is {code}. Bye {name}"),
        vec!["name", "code", "name"]
    );
    assert!(extract_tags("no placeholders here").is_empty());
    assert_eq!(extract_tags("{a}{b}"), vec!["a", "b"]);
    assert_eq!(extract_tags("{}"), vec![""]);
}

#[test]
fn test_complete_values_render() {
    let body = "dear {username}";
    let supplied = values(json!({"username": "Alice"}));

    assert!(missing_tags(body, &supplied).is_empty());
    assert_eq!(render(body, &supplied), "dear Alice");
}

#[test]
fn test_incomplete_values_report_missing() {
    let body = "{a} and {b}";
    let supplied = values(json!({"a": "1"}));

    assert_eq!(missing_tags(body, &supplied), vec!["b"]);
}

#[test]
fn test_render_replaces_every_occurrence() {
    let body = "{x}-{x}-{y}";
    let supplied = values(json!({"x": "1", "y": 2}));

    assert_eq!(render(body, &supplied), "1-1-2");
}

#[test]
fn test_extra_values_are_ignored() {
    let body = "Hello {name}";
    let supplied = values(json!({"name": "Bob", "unused": "x"}));

    assert!(missing_tags(body, &supplied).is_empty());
    assert_eq!(render(body, &supplied), "Hello Bob");
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    let store = MemoryStore::new();
    let body = "Hi {name}, your code is {code}. Bye {name}";

    let first = sync_tags(&store, extract_tags(body)).await.unwrap();
    assert_eq!(first, vec!["name", "code", "name"]);

    let second = sync_tags(&store, extract_tags(body)).await.unwrap();
    assert_eq!(second, first);

    let labels: Vec<String> = store
        .list_tags()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.label)
        .collect();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&"name".to_string()));
    assert!(labels.contains(&"code".to_string()));
}

#[tokio::test]
async fn test_sync_adds_only_new_tags() {
    let store = MemoryStore::new();

    sync_tags(&store, extract_tags("{greeting} {name}"))
        .await
        .unwrap();
    sync_tags(&store, extract_tags("{name} owes {amount}"))
        .await
        .unwrap();

    assert_eq!(store.list_tags().await.unwrap().len(), 3);
    assert!(store.find_tag_by_name("amount").await.unwrap().is_some());
}

#[test]
fn test_checking_values_does_not_count_as_extraction() {
    let body = "{a} and {b}";

    assert_eq!(extract_tags(body).len(), 2);
    assert_eq!(missing_tags(body, &values(json!({"a": "1"}))), vec!["b"]);

    // Only saving a notification type records extracted tags
    assert_eq!(TAGS_EXTRACTED_TOTAL.get(), 0);
}
