//! Cypher statements for session nodes
//!
//! Labels and relationship types cannot be parameters, so they are formatted
//! into the text once, after [`StoreConfig::validate`] has accepted them.

use crate::config::{OwnerLink, StoreConfig};
use crate::graph::{GraphQuery, QueryKind};

#[derive(Debug, Clone)]
pub(crate) struct Queries {
    fetch: String,
    upsert: String,
    touch: String,
    destroy: String,
    purge_expired: String,
    clear: String,
    scan: String,
    link_owner: Option<String>,
}

impl Queries {
    pub(crate) fn new(config: &StoreConfig) -> Self {
        let label = &config.node_label;
        Self {
            fetch: format!(
                "MATCH (s:{label} {{sid: $sid}}) \
                 RETURN s.sid AS sid, s.data AS data, s.expires AS expires"
            ),
            upsert: format!(
                "MERGE (s:{label} {{sid: $sid}}) \
                 ON CREATE SET s.expires = $expires \
                 ON MATCH SET s.expires = CASE WHEN $refresh THEN $expires ELSE s.expires END \
                 SET s.data = $data"
            ),
            touch: format!("MATCH (s:{label} {{sid: $sid}}) SET s.expires = $expires"),
            destroy: format!(
                "MATCH (s:{label} {{sid: $sid}}) WHERE s.sid STARTS WITH $prefix \
                 DETACH DELETE s RETURN count(*) AS deleted"
            ),
            purge_expired: format!(
                "MATCH (s:{label}) WHERE s.sid STARTS WITH $prefix \
                 AND s.expires IS NOT NULL AND s.expires < $now \
                 DETACH DELETE s RETURN count(*) AS deleted"
            ),
            clear: format!(
                "MATCH (s:{label}) WHERE s.sid STARTS WITH $prefix \
                 DETACH DELETE s RETURN count(*) AS deleted"
            ),
            scan: format!(
                "MATCH (s:{label}) WHERE s.sid STARTS WITH $prefix \
                 RETURN s.sid AS sid, s.data AS data, s.expires AS expires"
            ),
            link_owner: config.owner.as_ref().map(|owner| link_owner(label, owner)),
        }
    }

    pub(crate) fn fetch(&self, key: &str) -> GraphQuery {
        GraphQuery::new(QueryKind::Fetch, self.fetch.as_str()).param("sid", key)
    }

    pub(crate) fn upsert(
        &self,
        key: &str,
        data: String,
        expires: Option<i64>,
        refresh: bool,
    ) -> GraphQuery {
        GraphQuery::new(QueryKind::Upsert, self.upsert.as_str())
            .param("sid", key)
            .param("data", data)
            .param("expires", expires)
            .param("refresh", refresh)
    }

    pub(crate) fn touch(&self, key: &str, expires: Option<i64>) -> GraphQuery {
        GraphQuery::new(QueryKind::Touch, self.touch.as_str())
            .param("sid", key)
            .param("expires", expires)
    }

    pub(crate) fn destroy(&self, key: &str, prefix: &str) -> GraphQuery {
        GraphQuery::new(QueryKind::Destroy, self.destroy.as_str())
            .param("sid", key)
            .param("prefix", prefix)
    }

    pub(crate) fn purge_expired(&self, prefix: &str, now: i64) -> GraphQuery {
        GraphQuery::new(QueryKind::PurgeExpired, self.purge_expired.as_str())
            .param("prefix", prefix)
            .param("now", now)
    }

    pub(crate) fn clear(&self, prefix: &str) -> GraphQuery {
        GraphQuery::new(QueryKind::Clear, self.clear.as_str()).param("prefix", prefix)
    }

    pub(crate) fn scan(&self, prefix: &str) -> GraphQuery {
        GraphQuery::new(QueryKind::Scan, self.scan.as_str()).param("prefix", prefix)
    }

    pub(crate) fn link_owner(&self, key: &str, owner: serde_json::Value) -> Option<GraphQuery> {
        self.link_owner.as_ref().map(|text| {
            GraphQuery::new(QueryKind::LinkOwner, text.as_str())
                .param("sid", key)
                .param("owner", owner)
        })
    }
}

fn link_owner(label: &str, owner: &OwnerLink) -> String {
    format!(
        "MATCH (s:{label} {{sid: $sid}}) \
         MERGE (o:{owner_label} {{{property}: $owner}}) \
         MERGE (o)-[:{relationship}]->(s)",
        owner_label = owner.label,
        property = owner.property,
        relationship = owner.relationship,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_in_text() {
        let queries = Queries::new(&StoreConfig::new().with_node_label("WebSession"));
        let query = queries.fetch("sess:1");
        assert_eq!(query.kind, QueryKind::Fetch);
        assert!(query.text.starts_with("MATCH (s:WebSession {sid: $sid})"));
        assert_eq!(query.get_param("sid"), Some(&json!("sess:1")));
    }

    #[test]
    fn test_upsert_params() {
        let queries = Queries::new(&StoreConfig::default());
        let query = queries.upsert("sess:1", "{}".to_string(), None, false);
        assert!(query.text.starts_with("MERGE (s:Session {sid: $sid})"));
        assert_eq!(query.get_param("expires"), Some(&serde_json::Value::Null));
        assert_eq!(query.get_param("refresh"), Some(&json!(false)));
    }

    #[test]
    fn test_link_owner_text() {
        let queries = Queries::new(&StoreConfig::default());
        assert!(queries.link_owner("sess:1", json!("u1")).is_none());

        let config = StoreConfig::new().with_owner(
            OwnerLink::new("userId")
                .with_label("Account")
                .with_relationship("OWNS")
                .with_property("uid"),
        );
        let query = Queries::new(&config)
            .link_owner("sess:1", json!("u1"))
            .unwrap();
        assert_eq!(
            query.text,
            "MATCH (s:Session {sid: $sid}) \
             MERGE (o:Account {uid: $owner}) \
             MERGE (o)-[:OWNS]->(s)"
        );
    }
}
