//! Graph database clients
//!
//! The store talks to the database through [`GraphClient`]: one parameterized
//! Cypher query in, a table of named columns out.

mod memory;

pub use memory::MemoryGraph;

#[cfg(feature = "neo4j")]
mod neo4j;

#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jClient;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::SessionError;

/// A result row, keyed by column alias
pub type Row = Map<String, Value>;

/// What a query does to session nodes
///
/// Clients that execute Cypher only use this for logging; [`MemoryGraph`]
/// dispatches on it instead of parsing the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Read one session node by `sid`
    Fetch,
    /// Create or update a session node
    Upsert,
    /// Update `expires` of an existing node
    Touch,
    /// Delete one node, returning the `deleted` count
    Destroy,
    /// Delete expired nodes under a prefix, returning the `deleted` count
    PurgeExpired,
    /// Delete every node under a prefix, returning the `deleted` count
    Clear,
    /// List every node under a prefix
    Scan,
    /// Attach a session node to its owner node
    LinkOwner,
}

impl QueryKind {
    /// Short name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Fetch => "fetch",
            QueryKind::Upsert => "upsert",
            QueryKind::Touch => "touch",
            QueryKind::Destroy => "destroy",
            QueryKind::PurgeExpired => "purge_expired",
            QueryKind::Clear => "clear",
            QueryKind::Scan => "scan",
            QueryKind::LinkOwner => "link_owner",
        }
    }
}

/// A parameterized Cypher query
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQuery {
    /// Operation tag
    pub kind: QueryKind,
    /// Cypher text with `$name` placeholders
    pub text: String,
    /// Named parameters
    pub params: BTreeMap<String, Value>,
}

impl GraphQuery {
    /// Create a query without parameters
    pub fn new<S: Into<String>>(kind: QueryKind, text: S) -> Self {
        Self {
            kind,
            text: text.into(),
            params: BTreeMap::new(),
        }
    }

    /// Bind a parameter
    pub fn param<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Look up a bound parameter
    pub fn get_param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }
}

/// Rows returned by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Result rows in server order
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Build a result from rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Read an integer column from the first row, as returned by `count(*)`
    pub fn first_count(&self, column: &str) -> Result<u64, SessionError> {
        match self.rows.first() {
            Some(row) => row.get(column).and_then(Value::as_u64).ok_or_else(|| {
                SessionError::StoreError(format!("missing integer column `{}`", column))
            }),
            None => Ok(0),
        }
    }
}

/// Executes parameterized queries against a graph database
///
/// Each call is independent: implementations acquire whatever connection or
/// session they need for the query and release it before returning, on
/// success and failure alike. Errors are returned as-is, without retries.
#[async_trait]
pub trait GraphClient: Send + Sync + 'static {
    /// Run a query and collect its rows
    async fn run(&self, query: GraphQuery) -> Result<QueryResult, SessionError>;
}

#[async_trait]
impl<C: GraphClient> GraphClient for Arc<C> {
    async fn run(&self, query: GraphQuery) -> Result<QueryResult, SessionError> {
        (**self).run(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params() {
        let query = GraphQuery::new(QueryKind::Fetch, "MATCH (s) RETURN s")
            .param("sid", "sess:1")
            .param("expires", Value::Null);
        assert_eq!(query.get_param("sid"), Some(&json!("sess:1")));
        assert_eq!(query.get_param("expires"), Some(&Value::Null));
        assert_eq!(query.get_param("missing"), None);
    }

    #[test]
    fn test_first_count() {
        let mut row = Row::new();
        row.insert("deleted".to_string(), json!(3));
        let result = QueryResult::from_rows(vec![row]);
        assert_eq!(result.first_count("deleted").unwrap(), 3);
        assert!(result.first_count("other").is_err());
        assert_eq!(QueryResult::default().first_count("deleted").unwrap(), 0);
    }
}
