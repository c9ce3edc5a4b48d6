//! Neo4j client built on the neo4rs driver
//!
//! Queries run through the driver's connection pool: each call checks out a
//! connection, and the row stream hands it back when dropped.

use async_trait::async_trait;
use neo4rs::{BoltNull, BoltType, Graph};
use serde_json::Value;

use super::{GraphClient, GraphQuery, QueryResult, Row};
use crate::error::SessionError;

/// Neo4j graph client
///
/// # Example
///
/// ```rust,ignore
/// use neo4j_session_store::{GraphStore, Neo4jClient};
///
/// let client = Neo4jClient::connect("bolt://localhost:7687", "neo4j", "password").await?;
/// let store = GraphStore::new(client)?;
/// ```
#[derive(Clone)]
pub struct Neo4jClient {
    graph: Graph,
    database: Option<String>,
}

impl Neo4jClient {
    /// Connect with default driver settings
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, SessionError> {
        let graph = Graph::new(uri, user, password).await?;
        Ok(Self::from_graph(graph))
    }

    /// Wrap an existing driver handle
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            graph,
            database: None,
        }
    }

    /// Run queries against a named database instead of the default one
    pub fn with_database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// The underlying driver handle
    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

#[async_trait]
impl GraphClient for Neo4jClient {
    async fn run(&self, query: GraphQuery) -> Result<QueryResult, SessionError> {
        let mut q = neo4rs::query(&query.text);
        for (key, value) in query.params {
            q = q.param(&key, to_bolt(value));
        }

        let mut stream = match &self.database {
            Some(db) => self.graph.execute_on(db, q).await?,
            None => self.graph.execute(q).await?,
        };

        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row.to::<Row>()?);
        }

        Ok(QueryResult::from_rows(rows))
    }
}

fn to_bolt(value: Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => b.into(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().unwrap_or_default().into(),
        },
        Value::String(s) => s.into(),
        // Nested values are stored as their JSON text
        other => other.to_string().into(),
    }
}
