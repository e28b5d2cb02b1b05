use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Admin sessions held in memory: session id → expiry.
/// A restart logs every admin out.
pub struct SessionRegistry {
    ttl: Duration,
    sessions: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SessionRegistry {
    pub fn new(ttl_hours: i64) -> Self {
        SessionRegistry {
            ttl: Duration::hours(ttl_hours.max(1)),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a session and return its id and expiry.
    pub fn create(&self) -> (String, DateTime<Utc>) {
        let id = uuid::Uuid::new_v4().to_string();
        let expires_at = Utc::now() + self.ttl;
        let mut map = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(id.clone(), expires_at);
        (id, expires_at)
    }

    /// Expiry of a live session. Expired entries are dropped on sight.
    pub fn validate(&self, id: &str) -> Option<DateTime<Utc>> {
        self.validate_at(id, Utc::now())
    }

    fn validate_at(&self, id: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut map = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        match map.get(id).copied() {
            Some(expires_at) if expires_at > now => Some(expires_at),
            Some(_) => {
                map.remove(id);
                None
            }
            None => None,
        }
    }

    pub fn destroy(&self, id: &str) {
        let mut map = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(id);
    }

    /// Drop every expired session; returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut map = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = map.len();
        map.retain(|_, expires_at| *expires_at > now);
        before - map.len()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
