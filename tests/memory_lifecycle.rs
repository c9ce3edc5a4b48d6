mod common;

use chrono::{Duration, Utc};
use neo4j_session_store::{
    GraphStore, MemoryGraph, SessionData, SessionStore, SetOutcome, StoreConfig,
};
use serde_json::json;

use common::{lifecycle, payload};

#[tokio::test]
async fn test_lifecycle() {
    let store = GraphStore::new(MemoryGraph::new()).unwrap();
    lifecycle(&store).await;
}

#[tokio::test]
async fn test_unknown_id() {
    let store = GraphStore::new(MemoryGraph::new()).unwrap();
    assert_eq!(store.get("nope").await.unwrap(), None);
    assert_eq!(store.ttl("nope").await.unwrap(), None);
    assert_eq!(store.destroy("nope").await.unwrap(), 0);
}

#[tokio::test]
async fn test_overwrite_keeps_one_record() {
    let graph = MemoryGraph::new();
    let store = GraphStore::new(graph.clone()).unwrap();

    store.set("1", &payload(json!({ "n": 1 }))).await.unwrap();
    store.set("1", &payload(json!({ "n": 2 }))).await.unwrap();

    assert_eq!(store.length().await.unwrap(), 1);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(store.get("1").await.unwrap(), Some(payload(json!({ "n": 2 }))));
}

#[tokio::test]
async fn test_expired_set_matches_destroy() {
    let store = GraphStore::new(MemoryGraph::new()).unwrap();
    let past = SessionData::expiring_at(Utc::now() - Duration::seconds(1));

    // Nothing to destroy yet
    assert_eq!(store.set("1", &past).await.unwrap(), SetOutcome::Destroyed(0));
    assert_eq!(store.get("1").await.unwrap(), None);
}

#[tokio::test]
async fn test_prefixes_share_label() {
    let graph = MemoryGraph::new();
    let app = GraphStore::with_config(graph.clone(), StoreConfig::new().with_prefix("app:")).unwrap();
    let other =
        GraphStore::with_config(graph.clone(), StoreConfig::new().with_prefix("other:")).unwrap();

    app.set("1", &SessionData::new(60)).await.unwrap();
    app.set("2", &SessionData::new(60)).await.unwrap();
    other.set("1", &SessionData::new(60)).await.unwrap();

    let mut ids = app.ids().await.unwrap();
    ids.sort();
    assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);

    assert_eq!(app.clear().await.unwrap(), 2);
    assert_eq!(other.length().await.unwrap(), 1);
    assert!(other.get("1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_enumeration_skips_expired() {
    let graph = MemoryGraph::new();
    let store = GraphStore::new(graph.clone()).unwrap();

    store.set("live", &SessionData::new(60)).await.unwrap();
    let past = Utc::now().timestamp_millis() - 1;
    graph.insert_raw("sess:dead", r#"{"foo":"bar"}"#, Some(past));

    assert_eq!(store.ids().await.unwrap(), vec!["live".to_string()]);
    assert_eq!(store.all().await.unwrap().len(), 1);
    // The expired node was removed along the way
    assert_eq!(graph.node_count(), 1);

    graph.insert_raw("sess:dead", r#"{"foo":"bar"}"#, Some(past));
    assert_eq!(store.clear().await.unwrap(), 1, "only live sessions are counted");
}

#[tokio::test]
async fn test_default_ttl_window() {
    let store =
        GraphStore::with_config(MemoryGraph::new(), StoreConfig::new().with_ttl(120)).unwrap();

    store.set("1", &payload(json!({ "foo": "bar" }))).await.unwrap();
    let ttl = store.ttl("1").await.unwrap().unwrap();
    assert!(ttl > 115_000 && ttl <= 120_000, "got {}", ttl);
}
