//! Store lifecycle shared by the in-memory and Neo4j test suites

use chrono::{Duration, Utc};
use neo4j_session_store::{SessionData, SessionStore, SetOutcome};
use serde_json::json;

#[allow(dead_code)]
pub fn payload(value: serde_json::Value) -> SessionData {
    serde_json::from_value(value).unwrap()
}

pub async fn lifecycle<S: SessionStore>(store: &S) {
    store.clear().await.unwrap();

    let res = store.set("123", &payload(json!({ "foo": "bar" }))).await.unwrap();
    assert_eq!(res, SetOutcome::Stored, "set value");

    let res = store.get("123").await.unwrap();
    assert_eq!(res, Some(payload(json!({ "foo": "bar" }))), "get value");

    let ttl = store.ttl("123").await.unwrap().unwrap();
    assert!(ttl > 86_300_000 && ttl <= 86_400_000, "one day ttl, got {}", ttl);

    let expires = (Utc::now() + Duration::seconds(60)).to_rfc3339();
    let cookie_session = payload(json!({ "cookie": { "expires": expires } }));
    let res = store.set("456", &cookie_session).await.unwrap();
    assert_eq!(res, SetOutcome::Stored, "set cookie expires");

    let ttl_456 = store.ttl("456").await.unwrap().unwrap();
    assert!(ttl_456 <= 60_000, "cookie ttl, got {}", ttl_456);

    let new_expires = (Utc::now() + Duration::seconds(90)).to_rfc3339();
    store
        .touch("456", &payload(json!({ "cookie": { "expires": new_expires } })))
        .await
        .unwrap();
    let touched = store.ttl("456").await.unwrap().unwrap();
    assert!(touched > 60_000, "touched ttl, got {}", touched);
    assert!(touched > ttl_456);

    assert_eq!(store.length().await.unwrap(), 2, "stored two keys length");

    let mut ids = store.ids().await.unwrap();
    ids.sort();
    assert_eq!(ids, vec!["123".to_string(), "456".to_string()]);

    let mut all = store.all().await.unwrap();
    all.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(
        serde_json::to_value(&all).unwrap(),
        json!([
            { "id": "123", "foo": "bar" },
            { "id": "456", "cookie": serde_json::to_value(&cookie_session.cookie).unwrap() },
        ]),
        "stored two keys data"
    );

    assert_eq!(store.destroy("456").await.unwrap(), 1, "destroyed one");
    assert_eq!(store.destroy("456").await.unwrap(), 0, "destroy is idempotent");
    assert_eq!(store.length().await.unwrap(), 1, "one key remains");

    assert_eq!(store.clear().await.unwrap(), 1, "cleared remaining key");
    assert_eq!(store.length().await.unwrap(), 0, "no key remains");

    let count = 1000;
    for i in 1..=count {
        let session = SessionData::expiring_at(Utc::now() + Duration::seconds(60))
            .with("data", "some data");
        store.set(&format!("s{}", i), &session).await.unwrap();
    }
    assert_eq!(store.length().await.unwrap(), count, "bulk count");
    assert_eq!(store.clear().await.unwrap(), count as u64, "bulk clear");
    assert_eq!(store.length().await.unwrap(), 0);

    let future = SessionData::expiring_at(Utc::now() + Duration::seconds(90));
    assert_eq!(store.set("789", &future).await.unwrap(), SetOutcome::Stored);
    assert_eq!(store.length().await.unwrap(), 1, "one key exists (session 789)");

    let past = SessionData::expiring_at(Utc::now() - Duration::seconds(90));
    assert_eq!(
        store.set("789", &past).await.unwrap(),
        SetOutcome::Destroyed(1),
        "destroy was invoked"
    );
    assert_eq!(store.length().await.unwrap(), 0, "session 789 is gone too");
}
