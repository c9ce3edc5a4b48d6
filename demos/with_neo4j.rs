//! Neo4j session store example compatible with connect-style stores
//!
//! Sessions written here use the same `sess:` keys and JSON payloads that a
//! Node.js store keeps in the same graph, so both sides can read them.
//!
//! Run with a local server:
//!
//! ```text
//! NEO4J_URI=bolt://localhost:7687 NEO4J_USER=neo4j NEO4J_PASSWORD=secret \
//!     cargo run --example with_neo4j
//! ```

use neo4j_session_store::{
    GraphStore, Neo4jClient, OwnerLink, SessionData, SessionStore, SetOutcome, StoreConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging
    tracing_subscriber::fmt::init();

    // Get connection settings from environment or use defaults
    let uri = std::env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://localhost:7687".to_string());
    let user = std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string());
    let password = std::env::var("NEO4J_PASSWORD").unwrap_or_else(|_| "neo4j".to_string());

    println!("Connecting to Neo4j at {}", uri);

    let mut client = Neo4jClient::connect(&uri, &user, &password).await?;
    if let Ok(db) = std::env::var("NEO4J_DATABASE") {
        client = client.with_database(db);
    }

    // Must match the Node.js store settings for the sessions to be shared
    let config = StoreConfig::new()
        .with_prefix("sess:")
        .with_node_label("Session")
        .with_ttl(86400) // 1 day in seconds
        .with_owner(OwnerLink::new("userId"));
    let store = GraphStore::with_config(client, config)?;

    let session = SessionData::new(3600)
        .with("userId", "alice")
        .with("lastModifiedBy", "rust");
    store.set("rust-demo", &session).await?;
    println!("Stored session, ttl = {:?} ms", store.ttl("rust-demo").await?);

    let loaded = store.get("rust-demo").await?;
    println!("Loaded: {:?}", loaded);

    // A payload whose cookie already expired is removed instead of stored
    let stale = SessionData::expiring_at(chrono::Utc::now() - chrono::Duration::seconds(5));
    if let SetOutcome::Destroyed(n) = store.set("rust-demo", &stale).await? {
        println!("Stale session destroyed ({} node)", n);
    }

    println!("Sessions under prefix: {}", store.length().await?);

    Ok(())
}
