//! Payload codecs
//!
//! The store never looks inside the encoded `data` property; it only hands
//! session payloads to a [`SessionSerializer`] on the way in and out.

use crate::error::SessionError;
use crate::session::SessionData;

/// Encode/decode pair for the `data` property of a session node
pub trait SessionSerializer: Send + Sync + 'static {
    /// Turn a session payload into the string stored on the node
    fn encode(&self, session: &SessionData) -> Result<String, SessionError>;

    /// Parse a stored string back into a session payload
    fn decode(&self, raw: &str) -> Result<SessionData, SessionError>;
}

/// JSON codec, the same format connect-style stores use
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl SessionSerializer for JsonSerializer {
    fn encode(&self, session: &SessionData) -> Result<String, SessionError> {
        Ok(serde_json::to_string(session)?)
    }

    fn decode(&self, raw: &str) -> Result<SessionData, SessionError> {
        Ok(serde_json::from_str(raw)?)
    }
}
