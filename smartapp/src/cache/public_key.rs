//! Public key cache

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::KeyFetchError;
use crate::http::keyserver::KeyServerClient;

/// Default number of signing keys kept in memory
pub const DEFAULT_CAPACITY: usize = 32;

/// Source of signing keys, by key server and key id
#[async_trait]
pub trait PublicKeySource: Send + Sync {
    /// Retrieve the PEM text of a public key
    async fn retrieve(&self, keyserver_url: &str, key_id: &str) -> Result<String, KeyFetchError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    pem: String,
    last_used: u64,
}

type CacheKey = (String, String);

/// Memoizing key source in front of the key server.
///
/// Only successful fetches are cached. The map lock is never held across a
/// fetch, so two concurrent misses for the same key may both go to the
/// network; the later insert wins.
pub struct PublicKeyCache {
    client: KeyServerClient,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    capacity: usize,
    tick: AtomicU64,
}

impl PublicKeyCache {
    /// Create a new key cache
    pub fn new(client: KeyServerClient, capacity: usize) -> Self {
        Self {
            client,
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            tick: AtomicU64::new(0),
        }
    }

    /// Get a cached key, marking it as recently used
    pub fn get(&self, keyserver_url: &str, key_id: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = (keyserver_url.to_string(), key_id.to_string());
        entries.get_mut(&key).map(|entry| {
            entry.last_used = self.next_tick();
            entry.pem.clone()
        })
    }

    /// Insert a key, evicting the least recently used one when full
    pub fn insert(&self, keyserver_url: &str, key_id: &str, pem: String) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let key = (keyserver_url.to_string(), key_id.to_string());

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            {
                debug!(key_id = %oldest.1, "Evicting public key from cache");
                entries.remove(&oldest);
            }
        }

        let entry = CacheEntry {
            pem,
            last_used: self.next_tick(),
        };
        entries.insert(key, entry);
    }

    /// Get cache size
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    /// Check if cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl PublicKeySource for PublicKeyCache {
    async fn retrieve(&self, keyserver_url: &str, key_id: &str) -> Result<String, KeyFetchError> {
        if let Some(pem) = self.get(keyserver_url, key_id) {
            return Ok(pem);
        }

        let pem = self.client.fetch(keyserver_url, key_id).await?;
        self.insert(keyserver_url, key_id, pem.clone());
        Ok(pem)
    }
}
