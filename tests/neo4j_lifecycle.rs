//! Tests require a running Neo4j instance
//! Run with: cargo test --features neo4j -- --ignored

#![cfg(feature = "neo4j")]

mod common;

use neo4j_session_store::{GraphStore, Neo4jClient, StoreConfig};

async fn client() -> Neo4jClient {
    let uri = std::env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://localhost:7687".to_string());
    let user = std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string());
    let password = std::env::var("NEO4J_PASSWORD").unwrap_or_else(|_| "neo4j".to_string());
    Neo4jClient::connect(&uri, &user, &password).await.unwrap()
}

#[tokio::test]
#[ignore]
async fn test_neo4j_lifecycle() {
    let config = StoreConfig::new().with_prefix("rs-test:");
    let store = GraphStore::with_config(client().await, config).unwrap();
    common::lifecycle(&store).await;
}
