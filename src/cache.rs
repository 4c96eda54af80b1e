// SPDX-License-Identifier: MIT

//! Process-wide response cache with per-entry TTL and a capacity bound.
//!
//! Entries are shared across requests within one process and lost on
//! restart. Keys carry a fingerprint of the caller's access token so one
//! user's cached data is never served to another user.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Injectable time source so tests can control expiry.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
struct CacheEntry {
    value: serde_json::Value,
    inserted_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// In-memory cache for upstream responses.
///
/// TTL is checked on read; when the cache is full, expired entries are
/// evicted first, then the oldest entry.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    capacity: usize,
    clock: Clock,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(Utc::now))
    }

    pub fn with_clock(capacity: usize, clock: Clock) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
            clock,
        }
    }

    /// Look up a cached value, dropping it if its TTL has lapsed.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = (self.clock)();
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Insert a value with a TTL in seconds, evicting if at capacity.
    pub fn set(&self, key: &str, value: serde_json::Value, ttl_secs: i64) {
        let now = (self.clock)();

        if !self.entries.contains_key(key) && self.entries.len() >= self.capacity {
            self.evict(now);
        }

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
                expires_at: now + Duration::seconds(ttl_secs),
            },
        );
    }

    /// Remove expired entries; if none were expired, remove the oldest.
    fn evict(&self, now: DateTime<Utc>) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.expires_at);
        if self.entries.len() < before {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.inserted_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Build a cache key scoped to one credential.
///
/// The token is fingerprinted (truncated SHA-256) rather than embedded, so
/// keys are fixed-length and logs never see a bearer token.
pub fn user_key(route: &str, access_token: &str, params: &str) -> String {
    let digest = Sha256::digest(access_token.as_bytes());
    let fingerprint = hex::encode(digest);
    format!("{}:{}:{}", route, &fingerprint[..16], params)
}
