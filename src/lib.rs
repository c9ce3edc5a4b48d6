//! # neo4j-session-store
//!
//! Express-session compatible session store backed by a Neo4j graph database.
//!
//! Sessions are stored as graph nodes in the same shape connect-style stores
//! use: the key is `prefix + session_id` and the payload is serialized JSON,
//! so Rust and Node.js applications can share the same session graph.
//!
//! ## Features
//!
//! - **Full store lifecycle**: get, set, destroy, touch, clear, length, ids, all and ttl
//! - **Expiry from the session cookie**: TTL follows `cookie.expires`, with a configurable default
//! - **Lazy expiry**: expired sessions are removed when a read comes across them
//! - **Pluggable clients and codecs**: Neo4j, in-memory, or your own
//!   [`GraphClient`]; JSON or your own [`SessionSerializer`]
//! - **Owner links**: optionally relate each session to a user node
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use neo4j_session_store::{GraphStore, Neo4jClient, SessionData, SessionStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Neo4jClient::connect("bolt://localhost:7687", "neo4j", "password").await?;
//!     let store = GraphStore::with_config(client, StoreConfig::new().with_prefix("app:"))?;
//!
//!     let session = SessionData::new(3600).with("views", 1);
//!     store.set("some-session-id", &session).await?;
//!
//!     let loaded = store.get("some-session-id").await?;
//!     assert_eq!(loaded.and_then(|s| s.get::<i32>("views")), Some(1));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod serializer;
pub mod session;
pub mod store;

pub use config::{OwnerLink, StoreConfig};
pub use error::SessionError;
pub use graph::{GraphClient, GraphQuery, MemoryGraph, QueryKind, QueryResult};
pub use serializer::{JsonSerializer, SessionSerializer};
pub use session::{SessionCookie, SessionData, SessionEntry};
pub use store::{GraphStore, GraphStoreBuilder, SessionStore, SetOutcome};

#[cfg(feature = "neo4j")]
pub use graph::Neo4jClient;
