//! Session payload types compatible with express-session

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Latest expiry a new cookie gets, `9999-12-31T23:59:59.999Z`
const MAX_EXPIRES_MS: i64 = 253_402_300_799_999;

/// Cookie object of an express-session payload
///
/// The object is kept exactly as the host wrote it, so attributes not
/// covered by the accessors below (`priority`, `partitioned`, `signed`, ...)
/// and the original `expires` text come back unchanged after a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCookie(Map<String, Value>);

impl Default for SessionCookie {
    fn default() -> Self {
        let mut fields = Map::new();
        fields.insert("httpOnly".to_string(), Value::Bool(true));
        fields.insert("path".to_string(), Value::String("/".to_string()));
        Self(fields)
    }
}

impl From<Map<String, Value>> for SessionCookie {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl SessionCookie {
    /// Create a new session cookie with the given max age in seconds
    ///
    /// Ages past year 9999 are capped there.
    pub fn new(max_age_secs: u64) -> Self {
        let latest = DateTime::<Utc>::from_timestamp_millis(MAX_EXPIRES_MS)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let expires = i64::try_from(max_age_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|age| Utc::now().checked_add_signed(age))
            .map_or(latest, |exp| exp.min(latest));
        Self::expiring_at(expires)
    }

    /// Create a cookie that expires at the given instant
    pub fn expiring_at(expires: DateTime<Utc>) -> Self {
        let mut cookie = Self::default();
        let original = (expires - Utc::now()).num_milliseconds();
        cookie.set("originalMaxAge", original);
        cookie.set_expires(Some(expires));
        cookie
    }

    /// Raw attribute by its express-session name
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set an attribute by its express-session name
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.0.insert(key.to_string(), v);
        }
    }

    /// All attributes, as stored
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Original max age in milliseconds
    pub fn original_max_age(&self) -> Option<i64> {
        self.0.get("originalMaxAge").and_then(Value::as_i64)
    }

    /// Expiration instant
    ///
    /// Reads an ISO-8601 string or epoch milliseconds. `None` for
    /// browser-session cookies and for values that do not parse.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        match self.0.get("expires")? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
            _ => None,
        }
    }

    /// Replace `expires`, written the way `Date#toJSON` writes it
    ///
    /// `None` stores `null`, the browser-session form.
    pub fn set_expires(&mut self, expires: Option<DateTime<Utc>>) {
        let value = match expires {
            Some(exp) => Value::String(exp.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => Value::Null,
        };
        self.0.insert("expires".to_string(), value);
    }

    /// Whole seconds left until `expires`, rounded up
    ///
    /// Returns `None` for browser-session cookies. The result is zero or
    /// negative once the cookie has expired.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires().map(|exp| {
            let ms = (exp - now).num_milliseconds();
            ms / 1000 + i64::from(ms % 1000 > 0)
        })
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires() {
            Some(exp) => exp < Utc::now(),
            None => false, // No expiry = browser session
        }
    }
}

/// Session payload as written by express-session
///
/// The optional `cookie` object sits next to arbitrary application fields,
/// which are flattened at the same level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Cookie information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<SessionCookie>,

    /// Additional session data (flattened at same level as cookie)
    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl SessionData {
    /// Create a new session data with the given max age in seconds
    pub fn new(max_age_secs: u64) -> Self {
        Self {
            cookie: Some(SessionCookie::new(max_age_secs)),
            data: HashMap::new(),
        }
    }

    /// Create session data carrying a cookie that expires at `expires`
    pub fn expiring_at(expires: DateTime<Utc>) -> Self {
        Self {
            cookie: Some(SessionCookie::expiring_at(expires)),
            data: HashMap::new(),
        }
    }

    /// Seconds until the cookie expires, if the payload carries an expiry
    pub fn cookie_ttl_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.cookie.as_ref().and_then(|c| c.remaining_secs(now))
    }

    /// Get a value from session data
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in session data
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.data.insert(key.to_string(), v);
        }
    }

    /// Builder form of [`SessionData::set`]
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.set(key, value);
        self
    }

    /// Remove a value from session data
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Check if session data is empty (no user data)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One element of [`SessionStore::all`](crate::SessionStore::all)
///
/// Serializes as the session payload with an extra `id` field. When the
/// payload has an `id` field of its own, the store's ID takes its place in
/// the serialized form; `session` still holds the payload untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionEntry {
    /// Session ID without the store prefix
    pub id: String,

    /// Decoded session payload
    #[serde(flatten)]
    pub session: SessionData,
}

impl Serialize for SessionEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        if let Some(cookie) = &self.session.cookie {
            map.serialize_entry("cookie", cookie)?;
        }
        for (key, value) in self.session.data.iter().filter(|(key, _)| key.as_str() != "id") {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
