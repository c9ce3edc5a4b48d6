//! Store configuration

use std::time::Duration;

use crate::error::SessionError;

/// Default key prefix, shared with connect-style stores
pub const DEFAULT_PREFIX: &str = "sess:";

/// Default label of session nodes
pub const DEFAULT_NODE_LABEL: &str = "Session";

/// Default lifetime in seconds (one day)
pub const DEFAULT_TTL: u64 = 86400;

/// Configuration for a graph-backed session store
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Prefix prepended to every session ID (default: "sess:")
    pub prefix: String,

    /// Label of session nodes (default: "Session")
    pub node_label: String,

    /// Lifetime in seconds for payloads without a cookie expiry (default: 86400)
    pub ttl: u64,

    /// Store sessions without an expiry and skip expiry checks (default: false)
    pub disable_ttl: bool,

    /// Make `touch` a no-op (default: false)
    pub disable_touch: bool,

    /// Link session nodes to owner nodes (default: None)
    pub owner: Option<OwnerLink>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            node_label: DEFAULT_NODE_LABEL.to_string(),
            ttl: DEFAULT_TTL,
            disable_ttl: false,
            disable_touch: false,
            owner: None,
        }
    }
}

impl StoreConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session key prefix (default: "sess:")
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the session node label (default: "Session")
    pub fn with_node_label<S: Into<String>>(mut self, label: S) -> Self {
        self.node_label = label.into();
        self
    }

    /// Set the default TTL in seconds (default: 86400 = 1 day)
    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the default TTL from a Duration
    pub fn with_ttl_duration(mut self, ttl: Duration) -> Self {
        self.ttl = ttl.as_secs();
        self
    }

    /// Disable expiry tracking (default: false)
    pub fn with_disable_ttl(mut self, disable: bool) -> Self {
        self.disable_ttl = disable;
        self
    }

    /// Disable `touch` (default: false)
    pub fn with_disable_touch(mut self, disable: bool) -> Self {
        self.disable_touch = disable;
        self
    }

    /// Link each stored session to an owner node
    pub fn with_owner(mut self, owner: OwnerLink) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Check values that end up inside query text
    ///
    /// Labels and relationship types cannot be passed as query parameters, so
    /// they are restricted to plain identifiers.
    pub fn validate(&self) -> Result<(), SessionError> {
        check_identifier("node label", &self.node_label)?;
        if let Some(owner) = &self.owner {
            owner.validate()?;
        }
        Ok(())
    }
}

/// Relationship from an owner node (a user, an account) to its sessions
///
/// After every stored session whose payload has a top-level `key` field, the
/// store merges `(:label {property: payload[key]})-[:relationship]->(session)`.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnerLink {
    /// Label of the owner node (default: "User")
    pub label: String,

    /// Relationship type from owner to session (default: "HAS_SESSION")
    pub relationship: String,

    /// Payload field holding the owner's identifier
    pub key: String,

    /// Owner node property matched against the identifier (default: "id")
    pub property: String,
}

impl OwnerLink {
    /// Link via the payload field `key` using default label, type and property
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self {
            label: "User".to_string(),
            relationship: "HAS_SESSION".to_string(),
            key: key.into(),
            property: "id".to_string(),
        }
    }

    /// Set the owner node label (default: "User")
    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    /// Set the relationship type (default: "HAS_SESSION")
    pub fn with_relationship<S: Into<String>>(mut self, relationship: S) -> Self {
        self.relationship = relationship.into();
        self
    }

    /// Set the owner node property (default: "id")
    pub fn with_property<S: Into<String>>(mut self, property: S) -> Self {
        self.property = property.into();
        self
    }

    fn validate(&self) -> Result<(), SessionError> {
        if self.key.is_empty() {
            return Err(SessionError::ConfigError(
                "owner link requires an identifying payload field".to_string(),
            ));
        }
        check_identifier("owner label", &self.label)?;
        check_identifier("owner relationship", &self.relationship)?;
        check_identifier("owner property", &self.property)
    }
}

fn check_identifier(what: &str, value: &str) -> Result<(), SessionError> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SessionError::ConfigError(format!(
            "{} must be a plain identifier, got {:?}",
            what, value
        )))
    }
}
