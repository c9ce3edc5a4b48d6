//! In-memory graph client
//!
//! This is primarily for development and testing.
//! For production, use Neo4jClient or another real graph database.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::{GraphClient, GraphQuery, QueryKind, QueryResult, Row};
use crate::error::SessionError;

#[derive(Debug, Clone)]
struct StoredNode {
    data: String,
    expires: Option<i64>,
    owners: BTreeSet<String>,
}

/// In-memory stand-in for a graph database
///
/// Holds session nodes keyed by `sid` and answers the queries a
/// [`GraphStore`](crate::GraphStore) issues by their [`QueryKind`]; the
/// Cypher text is not interpreted, so node labels are ignored.
///
/// Warning: This client is not suitable for production use because:
/// - Sessions are lost on server restart
/// - Sessions are not shared across multiple server instances
#[derive(Clone, Default)]
pub struct MemoryGraph {
    nodes: Arc<RwLock<HashMap<String, StoredNode>>>,
    fail_next: Arc<RwLock<Option<(QueryKind, String)>>>,
}

impl MemoryGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes, expired ones included
    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    /// Raw `expires` property of a node, by full `sid`
    pub fn expires_of(&self, sid: &str) -> Option<i64> {
        self.nodes.read().get(sid).and_then(|n| n.expires)
    }

    /// Owner identifiers linked to a node, by full `sid`
    pub fn owners_of(&self, sid: &str) -> Vec<String> {
        self.nodes
            .read()
            .get(sid)
            .map(|n| n.owners.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Write a node directly, bypassing any store
    pub fn insert_raw(&self, sid: &str, data: &str, expires: Option<i64>) {
        self.nodes.write().insert(
            sid.to_string(),
            StoredNode {
                data: data.to_string(),
                expires,
                owners: BTreeSet::new(),
            },
        );
    }

    /// Make the next query of `kind` fail with a store error carrying `message`
    pub fn fail_next_query<S: Into<String>>(&self, kind: QueryKind, message: S) {
        *self.fail_next.write() = Some((kind, message.into()));
    }

    fn execute(&self, query: &GraphQuery) -> Result<QueryResult, SessionError> {
        match query.kind {
            QueryKind::Fetch => {
                let sid = str_param(query, "sid")?;
                let nodes = self.nodes.read();
                Ok(QueryResult::from_rows(
                    nodes.get(sid).map(|n| node_row(sid, n)).into_iter().collect(),
                ))
            }
            QueryKind::Upsert => {
                let sid = str_param(query, "sid")?;
                let data = str_param(query, "data")?;
                let expires = opt_int_param(query, "expires")?;
                let refresh = query
                    .get_param("refresh")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                let mut nodes = self.nodes.write();
                match nodes.get_mut(sid) {
                    Some(node) => {
                        node.data = data.to_string();
                        if refresh {
                            node.expires = expires;
                        }
                    }
                    None => {
                        nodes.insert(
                            sid.to_string(),
                            StoredNode {
                                data: data.to_string(),
                                expires,
                                owners: BTreeSet::new(),
                            },
                        );
                    }
                }
                Ok(QueryResult::default())
            }
            QueryKind::Touch => {
                let sid = str_param(query, "sid")?;
                let expires = opt_int_param(query, "expires")?;
                if let Some(node) = self.nodes.write().get_mut(sid) {
                    node.expires = expires;
                }
                Ok(QueryResult::default())
            }
            QueryKind::Destroy => {
                let sid = str_param(query, "sid")?;
                let prefix = str_param(query, "prefix")?;
                let deleted = if sid.starts_with(prefix) {
                    self.nodes.write().remove(sid).map_or(0, |_| 1)
                } else {
                    0
                };
                Ok(deleted_row(deleted))
            }
            QueryKind::PurgeExpired => {
                let prefix = str_param(query, "prefix")?;
                let now = opt_int_param(query, "now")?.unwrap_or(i64::MIN);
                Ok(deleted_row(self.remove_where(|sid, node| {
                    sid.starts_with(prefix) && node.expires.is_some_and(|exp| exp < now)
                })))
            }
            QueryKind::Clear => {
                let prefix = str_param(query, "prefix")?;
                Ok(deleted_row(
                    self.remove_where(|sid, _| sid.starts_with(prefix)),
                ))
            }
            QueryKind::Scan => {
                let prefix = str_param(query, "prefix")?;
                let nodes = self.nodes.read();
                Ok(QueryResult::from_rows(
                    nodes
                        .iter()
                        .filter(|(sid, _)| sid.starts_with(prefix))
                        .map(|(sid, node)| node_row(sid, node))
                        .collect(),
                ))
            }
            QueryKind::LinkOwner => {
                let sid = str_param(query, "sid")?;
                let owner = match query.get_param("owner") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => return Err(missing("owner")),
                };
                if let Some(node) = self.nodes.write().get_mut(sid) {
                    node.owners.insert(owner);
                }
                Ok(QueryResult::default())
            }
        }
    }

    fn remove_where<F>(&self, mut pred: F) -> u64
    where
        F: FnMut(&str, &StoredNode) -> bool,
    {
        let mut nodes = self.nodes.write();
        let before = nodes.len();
        nodes.retain(|sid, node| !pred(sid, node));
        (before - nodes.len()) as u64
    }
}

#[async_trait]
impl GraphClient for MemoryGraph {
    async fn run(&self, query: GraphQuery) -> Result<QueryResult, SessionError> {
        {
            let mut fail_next = self.fail_next.write();
            if fail_next.as_ref().is_some_and(|(kind, _)| *kind == query.kind) {
                if let Some((_, message)) = fail_next.take() {
                    return Err(SessionError::StoreError(message));
                }
            }
        }
        self.execute(&query)
    }
}

fn node_row(sid: &str, node: &StoredNode) -> Row {
    let mut row = Row::new();
    row.insert("sid".to_string(), json!(sid));
    row.insert("data".to_string(), json!(node.data));
    row.insert("expires".to_string(), json!(node.expires));
    row
}

fn deleted_row(count: u64) -> QueryResult {
    let mut row = Row::new();
    row.insert("deleted".to_string(), json!(count));
    QueryResult::from_rows(vec![row])
}

fn missing(key: &str) -> SessionError {
    SessionError::StoreError(format!("missing parameter `{}`", key))
}

fn str_param<'q>(query: &'q GraphQuery, key: &str) -> Result<&'q str, SessionError> {
    query
        .get_param(key)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(key))
}

fn opt_int_param(query: &GraphQuery, key: &str) -> Result<Option<i64>, SessionError> {
    match query.get_param(key) {
        None => Err(missing(key)),
        Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| SessionError::StoreError(format!("parameter `{}` is not an integer", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_graph_basic() {
        let graph = MemoryGraph::new();

        let upsert = GraphQuery::new(QueryKind::Upsert, "")
            .param("sid", "sess:a")
            .param("data", "{}")
            .param("expires", 10_i64)
            .param("refresh", false);
        graph.run(upsert).await.unwrap();

        let fetched = graph
            .run(GraphQuery::new(QueryKind::Fetch, "").param("sid", "sess:a"))
            .await
            .unwrap();
        assert_eq!(fetched.rows.len(), 1);
        assert_eq!(fetched.rows[0]["expires"], json!(10));

        // Updating without refresh keeps the original expiry
        let upsert = GraphQuery::new(QueryKind::Upsert, "")
            .param("sid", "sess:a")
            .param("data", "{\"x\":1}")
            .param("expires", 20_i64)
            .param("refresh", false);
        graph.run(upsert).await.unwrap();
        assert_eq!(graph.expires_of("sess:a"), Some(10));

        let destroy = GraphQuery::new(QueryKind::Destroy, "")
            .param("sid", "sess:a")
            .param("prefix", "sess:");
        let result = graph.run(destroy).await.unwrap();
        assert_eq!(result.first_count("deleted").unwrap(), 1);
        assert_eq!(graph.node_count(), 0);
    }

    #[tokio::test]
    async fn test_memory_graph_purge() {
        let graph = MemoryGraph::new();
        graph.insert_raw("sess:old", "{}", Some(5));
        graph.insert_raw("sess:new", "{}", Some(50));
        graph.insert_raw("sess:forever", "{}", None);
        graph.insert_raw("other:old", "{}", Some(5));

        let purge = GraphQuery::new(QueryKind::PurgeExpired, "")
            .param("prefix", "sess:")
            .param("now", 10_i64);
        let result = graph.run(purge).await.unwrap();
        assert_eq!(result.first_count("deleted").unwrap(), 1);
        assert_eq!(graph.node_count(), 3);
    }

    #[tokio::test]
    async fn test_memory_graph_injected_failure() {
        let graph = MemoryGraph::new();
        graph.fail_next_query(QueryKind::Scan, "connection reset");

        // Other kinds are unaffected
        assert!(graph
            .run(GraphQuery::new(QueryKind::Clear, "").param("prefix", "sess:"))
            .await
            .is_ok());

        let err = graph
            .run(GraphQuery::new(QueryKind::Scan, "").param("prefix", "sess:"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::StoreError(_)));

        // Only the next matching query fails
        assert!(graph
            .run(GraphQuery::new(QueryKind::Scan, "").param("prefix", "sess:"))
            .await
            .is_ok());
    }
}
