//! Session error types

use std::fmt;

/// Errors that can occur during session operations
#[derive(Debug)]
pub enum SessionError {
    /// Invalid store configuration, reported at construction time
    ConfigError(String),
    /// Error from the graph client, or a row the store could not read
    StoreError(String),
    /// Error during serialization/deserialization
    SerializationError(String),
    /// Neo4j driver error (when neo4j feature is enabled)
    #[cfg(feature = "neo4j")]
    Neo4jError(neo4rs::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ConfigError(msg) => write!(f, "Session store configuration error: {}", msg),
            SessionError::StoreError(msg) => write!(f, "Session store error: {}", msg),
            SessionError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            #[cfg(feature = "neo4j")]
            SessionError::Neo4jError(e) => write!(f, "Neo4j error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "neo4j")]
            SessionError::Neo4jError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "neo4j")]
impl From<neo4rs::Error> for SessionError {
    fn from(err: neo4rs::Error) -> Self {
        SessionError::Neo4jError(err)
    }
}

#[cfg(feature = "neo4j")]
impl From<neo4rs::DeError> for SessionError {
    fn from(err: neo4rs::DeError) -> Self {
        SessionError::StoreError(format!("Failed to read row: {}", err))
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerializationError(err.to_string())
    }
}
