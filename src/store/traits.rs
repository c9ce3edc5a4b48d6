//! Session store trait

use async_trait::async_trait;
use crate::error::SessionError;
use crate::session::{SessionData, SessionEntry};

/// What [`SessionStore::set`] did with the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The session was written
    Stored,
    /// The payload had already expired, so the session was destroyed instead;
    /// carries the destroy count
    Destroyed(u64),
}

/// Trait for session storage backends
///
/// This trait is designed to be compatible with express-session store interface.
/// Implementations store session data under the key `prefix + session_id`
/// and strip the prefix again when listing sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Get a session by ID
    ///
    /// Returns None if the session doesn't exist or has expired
    async fn get(&self, sid: &str) -> Result<Option<SessionData>, SessionError>;

    /// Set/update a session
    ///
    /// The TTL is derived from the session cookie's expires field
    async fn set(&self, sid: &str, session: &SessionData) -> Result<SetOutcome, SessionError>;

    /// Destroy/delete a session, returning how many records were removed
    async fn destroy(&self, sid: &str) -> Result<u64, SessionError>;

    /// Touch a session - update its TTL without modifying data
    ///
    /// This is called when the session is accessed but not modified
    async fn touch(&self, sid: &str, session: &SessionData) -> Result<(), SessionError>;

    /// Clear all sessions under the store prefix, returning how many were removed
    async fn clear(&self) -> Result<u64, SessionError>;

    /// Get the count of all sessions
    async fn length(&self) -> Result<usize, SessionError> {
        Ok(self.ids().await?.len())
    }

    /// Get all session IDs, without the store prefix
    async fn ids(&self) -> Result<Vec<String>, SessionError>;

    /// Get all sessions along with their IDs
    async fn all(&self) -> Result<Vec<SessionEntry>, SessionError>;

    /// Remaining lifetime of a session in milliseconds
    ///
    /// Returns None if the session doesn't exist or has no tracked expiry
    async fn ttl(&self, sid: &str) -> Result<Option<i64>, SessionError>;
}
