//! Session state: flash queues, CSRF token and free-form values.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;

/// Queue used when no explicit queue name is given.
pub const DEFAULT_QUEUE: &str = "";

/// Session data stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionData {
    /// Anti-CSRF token, created on first use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    /// Pending flash messages keyed by queue name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flash: BTreeMap<String, Vec<String>>,
    /// Additional session data, kept apart from the reserved fields above.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A session tracking per-visitor state between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session key (64 character hex string).
    pub session_key: String,
    /// Decoded session data.
    pub data: SessionData,
    /// Session expiration timestamp.
    pub expire_date: DateTime<Utc>,
}

impl Session {
    /// Default session expiration time (2 weeks).
    pub const DEFAULT_EXPIRY_DAYS: i64 = 14;

    /// Creates a new empty session.
    pub fn new() -> Self {
        Self {
            session_key: generate_token(),
            data: SessionData::default(),
            expire_date: Utc::now() + Duration::days(Self::DEFAULT_EXPIRY_DAYS),
        }
    }

    /// Returns whether this session has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expire_date
    }

    /// Extends the session expiration.
    pub fn extend(&mut self, days: i64) {
        self.expire_date = Utc::now() + Duration::days(days);
    }

    /// Queues a flash message.
    pub fn flash(&mut self, queue: &str, message: impl Into<String>) {
        self.data
            .flash
            .entry(queue.to_string())
            .or_default()
            .push(message.into());
    }

    /// Queues a flash message unless an identical one is already pending.
    pub fn flash_unique(&mut self, queue: &str, message: impl Into<String>) {
        let message = message.into();
        let pending = self.data.flash.entry(queue.to_string()).or_default();
        if !pending.contains(&message) {
            pending.push(message);
        }
    }

    /// Returns the pending messages of a queue without clearing them.
    pub fn peek_flash(&self, queue: &str) -> Vec<String> {
        self.data.flash.get(queue).cloned().unwrap_or_default()
    }

    /// Returns the pending messages of a queue and clears it.
    pub fn pop_flash(&mut self, queue: &str) -> Vec<String> {
        self.data.flash.remove(queue).unwrap_or_default()
    }

    /// Returns the CSRF token, creating one if the session has none.
    pub fn get_csrf_token(&mut self) -> String {
        self.data
            .csrf_token
            .get_or_insert_with(generate_token)
            .clone()
    }

    /// Replaces the CSRF token with a fresh one.
    pub fn new_csrf_token(&mut self) -> String {
        let token = generate_token();
        self.data.csrf_token = Some(token.clone());
        token
    }

    /// Gets a value from the session data.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .extra
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Sets a value in the session data.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        self.data
            .extra
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Removes a value from the session data.
    pub fn remove(&mut self, key: &str) {
        self.data.extra.remove(key);
    }

    /// Encodes the whole session as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a session previously encoded with [`Session::to_json`].
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a random 64 character hex token.
pub(crate) fn generate_token() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
