//! Basic example using the in-memory graph client

use neo4j_session_store::{
    GraphStore, MemoryGraph, SessionData, SessionError, SessionStore, StoreConfig,
};

#[tokio::main]
async fn main() -> Result<(), SessionError> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Create store on top of an in-memory graph
    let config = StoreConfig::new()
        .with_prefix("demo:")
        .with_ttl(3600); // 1 hour
    let store = GraphStore::with_config(MemoryGraph::new(), config)?;

    // A session written by a host framework on first request
    let mut session = SessionData::new(3600);
    session.set("views", 1);
    store.set("abc", &session).await?;

    // Later requests read it back and bump the counter
    if let Some(mut session) = store.get("abc").await? {
        let views: i32 = session.get("views").unwrap_or(0);
        session.set("views", views + 1);
        store.set("abc", &session).await?;
        println!("Views: {}", views + 1);
    }

    // Unmodified sessions only get their expiry extended
    store.touch("abc", &SessionData::new(7200)).await?;
    println!("TTL: {:?} ms", store.ttl("abc").await?);

    store.set("def", &SessionData::new(60).with("user", "alice")).await?;
    println!("Sessions: {:?}", store.ids().await?);

    for entry in store.all().await? {
        println!("  {} -> {}", entry.id, serde_json::to_string(&entry.session).unwrap_or_default());
    }

    println!("Destroyed: {}", store.destroy("abc").await?);
    println!("Cleared: {}", store.clear().await?);
    println!("Remaining: {}", store.length().await?);

    Ok(())
}
