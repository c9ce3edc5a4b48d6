//! Graph-backed session store
//!
//! Sessions are nodes `(:Session {sid, data, expires})`:
//! - `sid`: `prefix + session_id` (default prefix: "sess:")
//! - `data`: the payload as encoded by the serializer (JSON by default)
//! - `expires`: absolute expiry in epoch milliseconds, null when TTL is disabled
//!
//! Expired nodes are not swept in the background. Reads that come across
//! one delete it and report the session as missing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::queries::Queries;
use super::{SessionStore, SetOutcome};
use crate::config::StoreConfig;
use crate::error::SessionError;
use crate::graph::{GraphClient, QueryResult, Row};
use crate::serializer::{JsonSerializer, SessionSerializer};
use crate::session::{SessionData, SessionEntry};

/// A session node as returned by fetch and scan queries
#[derive(Debug, Deserialize)]
struct SessionNode {
    sid: String,
    data: String,
    #[serde(default)]
    expires: Option<i64>,
}

impl SessionNode {
    fn from_row(row: Row) -> Result<Self, SessionError> {
        serde_json::from_value(Value::Object(row))
            .map_err(|e| SessionError::StoreError(format!("Malformed session node: {}", e)))
    }
}

/// Session store persisting sessions as graph nodes
///
/// # Example
///
/// ```rust,ignore
/// use neo4j_session_store::{GraphStore, Neo4jClient, StoreConfig};
///
/// let client = Neo4jClient::connect("bolt://localhost:7687", "neo4j", "password").await?;
/// let store = GraphStore::with_config(client, StoreConfig::new().with_ttl(3600))?;
/// ```
pub struct GraphStore<C: GraphClient> {
    client: Arc<C>,
    config: Arc<StoreConfig>,
    serializer: Arc<dyn SessionSerializer>,
    queries: Arc<Queries>,
}

impl<C: GraphClient> GraphStore<C> {
    /// Create a store with default settings
    ///
    /// - Prefix: "sess:"
    /// - Node label: "Session"
    /// - Default TTL: 86400 seconds (1 day)
    pub fn new(client: C) -> Result<Self, SessionError> {
        Self::builder().client(client).build()
    }

    /// Create a store with custom settings
    pub fn with_config(client: C, config: StoreConfig) -> Result<Self, SessionError> {
        Self::builder().client(client).config(config).build()
    }

    /// Start building a store
    pub fn builder() -> GraphStoreBuilder<C> {
        GraphStoreBuilder::new()
    }

    /// The active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The graph client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Make a storage key from session ID
    fn make_key(&self, sid: &str) -> String {
        format!("{}{}", self.config.prefix, sid)
    }

    /// TTL in seconds for a payload: the cookie expiry if present, else the default
    fn effective_ttl(&self, session: &SessionData, now: DateTime<Utc>) -> i64 {
        session
            .cookie_ttl_secs(now)
            .unwrap_or_else(|| i64::try_from(self.config.ttl).unwrap_or(i64::MAX))
    }

    fn is_expired(&self, expires: Option<i64>, now_ms: i64) -> bool {
        !self.config.disable_ttl && expires.is_some_and(|exp| exp < now_ms)
    }

    /// Delete a session found expired on read
    ///
    /// The read reports the session as missing whether or not this succeeds.
    async fn expire(&self, sid: &str) {
        debug!(sid, "Removing expired session");
        if let Err(e) = self.destroy(sid).await {
            warn!(sid, error = %e, "Failed to remove expired session");
        }
    }

    async fn fetch(&self, sid: &str) -> Result<Option<SessionNode>, SessionError> {
        let key = self.make_key(sid);
        let result = self.client.run(self.queries.fetch(&key)).await?;
        result
            .rows
            .into_iter()
            .next()
            .map(SessionNode::from_row)
            .transpose()
    }

    /// Delete expired nodes under this prefix
    async fn purge_expired(&self, now_ms: i64) -> Result<u64, SessionError> {
        if self.config.disable_ttl {
            return Ok(0);
        }

        let result = self
            .client
            .run(self.queries.purge_expired(&self.config.prefix, now_ms))
            .await?;
        let purged = result.first_count("deleted")?;
        if purged > 0 {
            debug!(purged, prefix = %self.config.prefix, "Removed expired sessions");
        }
        Ok(purged)
    }

    /// Live nodes under this prefix, with the prefix stripped from `sid`
    async fn scan(&self) -> Result<Vec<SessionNode>, SessionError> {
        let now_ms = Utc::now().timestamp_millis();
        self.purge_expired(now_ms).await?;

        let QueryResult { rows } = self.client.run(self.queries.scan(&self.config.prefix)).await?;

        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let mut node = SessionNode::from_row(row)?;
            if self.is_expired(node.expires, now_ms) {
                continue;
            }
            match node.sid.strip_prefix(self.config.prefix.as_str()) {
                Some(id) => node.sid = id.to_string(),
                None => continue,
            }
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Attach the session node to its owner, if configured and present
    async fn link_owner(&self, key: &str, session: &SessionData) {
        let Some(owner) = &self.config.owner else {
            return;
        };
        let owner_id = match session.data.get(&owner.key) {
            Some(Value::Null) | None => return,
            Some(value) => value.clone(),
        };

        if let Some(query) = self.queries.link_owner(key, owner_id) {
            if let Err(e) = self.client.run(query).await {
                warn!(sid = key, error = %e, "Failed to link session to owner");
            }
        }
    }
}

impl<C: GraphClient> Clone for GraphStore<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
            serializer: Arc::clone(&self.serializer),
            queries: Arc::clone(&self.queries),
        }
    }
}

impl<C: GraphClient> std::fmt::Debug for GraphStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("config", &*self.config)
            .finish()
    }
}

#[async_trait]
impl<C: GraphClient> SessionStore for GraphStore<C> {
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError> {
        let Some(node) = self.fetch(sid).await? else {
            return Ok(None);
        };

        if self.is_expired(node.expires, Utc::now().timestamp_millis()) {
            self.expire(sid).await;
            return Ok(None);
        }

        Ok(Some(self.serializer.decode(&node.data)?))
    }

    async fn set(&self, sid: &str, session: &SessionData) -> Result<SetOutcome, SessionError> {
        let key = self.make_key(sid);
        let now = Utc::now();
        let data = self.serializer.encode(session)?;

        let expires = if self.config.disable_ttl {
            None
        } else {
            let ttl = self.effective_ttl(session, now);
            if ttl <= 0 {
                // Already expired: drop it rather than store a dead session
                debug!(sid, ttl, "Session expired before save, destroying");
                return Ok(SetOutcome::Destroyed(self.destroy(sid).await?));
            }
            Some(expiry_ms(now, ttl))
        };

        // With touch disabled, saving is the only way an expiry gets extended
        let refresh = self.config.disable_touch || self.config.disable_ttl;

        debug!(sid, ?expires, "Saving session");
        self.client
            .run(self.queries.upsert(&key, data, expires, refresh))
            .await?;

        self.link_owner(&key, session).await;

        Ok(SetOutcome::Stored)
    }

    async fn destroy(&self, sid: &str) -> Result<u64, SessionError> {
        let key = self.make_key(sid);
        let result = self
            .client
            .run(self.queries.destroy(&key, &self.config.prefix))
            .await?;
        result.first_count("deleted")
    }

    async fn touch(&self, sid: &str, session: &SessionData) -> Result<(), SessionError> {
        if self.config.disable_touch || self.config.disable_ttl {
            return Ok(());
        }

        let key = self.make_key(sid);
        let now = Utc::now();
        let expires = expiry_ms(now, self.effective_ttl(session, now));

        // Only updates an existing node; a non-positive TTL is written as-is
        // and the session expires on its next read
        self.client
            .run(self.queries.touch(&key, Some(expires)))
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<u64, SessionError> {
        self.purge_expired(Utc::now().timestamp_millis()).await?;

        let result = self
            .client
            .run(self.queries.clear(&self.config.prefix))
            .await?;
        let cleared = result.first_count("deleted")?;
        debug!(cleared, prefix = %self.config.prefix, "Cleared sessions");
        Ok(cleared)
    }

    async fn ids(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.scan().await?.into_iter().map(|node| node.sid).collect())
    }

    async fn all(&self) -> Result<Vec<SessionEntry>, SessionError> {
        // One undecodable payload fails the whole listing
        self.scan()
            .await?
            .into_iter()
            .map(|node| -> Result<SessionEntry, SessionError> {
                Ok(SessionEntry {
                    session: self.serializer.decode(&node.data)?,
                    id: node.sid,
                })
            })
            .collect()
    }

    async fn ttl(&self, sid: &str) -> Result<Option<i64>, SessionError> {
        if self.config.disable_ttl {
            return Ok(None);
        }

        let Some(node) = self.fetch(sid).await? else {
            return Ok(None);
        };

        let now_ms = Utc::now().timestamp_millis();
        if self.is_expired(node.expires, now_ms) {
            self.expire(sid).await;
            return Ok(None);
        }

        Ok(node.expires.map(|exp| exp - now_ms))
    }
}

/// Absolute expiry in epoch milliseconds, pinned at `i64::MAX` for huge TTLs
fn expiry_ms(now: DateTime<Utc>, ttl_secs: i64) -> i64 {
    now.timestamp_millis()
        .saturating_add(ttl_secs.saturating_mul(1000))
}

/// Builder for [`GraphStore`]
pub struct GraphStoreBuilder<C: GraphClient> {
    client: Option<C>,
    config: StoreConfig,
    serializer: Arc<dyn SessionSerializer>,
}

impl<C: GraphClient> GraphStoreBuilder<C> {
    /// Create a builder with default settings and no client
    pub fn new() -> Self {
        Self {
            client: None,
            config: StoreConfig::default(),
            serializer: Arc::new(JsonSerializer),
        }
    }

    /// Set the graph client (required)
    pub fn client(mut self, client: C) -> Self {
        self.client = Some(client);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the payload codec (default: JSON)
    pub fn serializer<S: SessionSerializer>(mut self, serializer: S) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Validate the settings and create the store
    pub fn build(self) -> Result<GraphStore<C>, SessionError> {
        let client = self.client.ok_or_else(|| {
            SessionError::ConfigError("a graph client must be provided to the store".to_string())
        })?;
        self.config.validate()?;

        Ok(GraphStore {
            client: Arc::new(client),
            queries: Arc::new(Queries::new(&self.config)),
            config: Arc::new(self.config),
            serializer: self.serializer,
        })
    }
}

impl<C: GraphClient> Default for GraphStoreBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
