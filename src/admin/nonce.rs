// src/admin/nonce.rs
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct NonceEntry {
    action: String,
    expires_at: DateTime<Utc>,
}

/// Action-bound, time-limited tokens handed to the admin page.
///
/// A nonce stays valid for its whole lifetime and may be reused, so the
/// refresh button can run repeated health checks with one token.
#[derive(Debug)]
pub struct NonceRegistry {
    nonces: DashMap<String, NonceEntry>,
    ttl: chrono::Duration,
}

impl NonceRegistry {
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(1));
        Self {
            nonces: DashMap::new(),
            ttl,
        }
    }

    pub fn issue(&self, action: &str) -> String {
        self.purge_expired();

        let nonce = Uuid::new_v4().simple().to_string();
        self.nonces.insert(
            nonce.clone(),
            NonceEntry {
                action: action.to_string(),
                expires_at: Utc::now() + self.ttl,
            },
        );
        tracing::debug!(action, "issued nonce");
        nonce
    }

    pub fn verify(&self, action: &str, nonce: &str) -> bool {
        let Some(entry) = self.nonces.get(nonce).map(|e| e.value().clone()) else {
            return false;
        };

        if entry.expires_at <= Utc::now() {
            self.nonces.remove(nonce);
            return false;
        }
        entry.action == action
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.nonces.len();
        self.nonces.retain(|_, entry| entry.expires_at > now);
        before - self.nonces.len()
    }

    pub fn len(&self) -> usize {
        self.nonces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nonces.is_empty()
    }
}
