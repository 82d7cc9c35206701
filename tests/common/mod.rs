//! Shared test doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cache_load_tester::error::{CacheError, CacheResult};
use cache_load_tester::client::CacheClient;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct StoredValue {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-memory cache with TTL expiry and operation counters
pub struct MemoryCache {
    store: Mutex<HashMap<String, StoredValue>>,
    gets: AtomicU64,
    sets: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            gets: AtomicU64::new(0),
            sets: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub fn get_count(&self) -> u64 {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn set_count(&self) -> u64 {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let store = self.store.lock().unwrap();
        Ok(store
            .get(key)
            .filter(|stored| stored.expires_at > Instant::now())
            .map(|stored| stored.value.clone()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        let mut store = self.store.lock().unwrap();
        store.insert(
            key.to_string(),
            StoredValue {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}

/// Cache where every operation fails with a transient error
pub struct UnavailableCache;

#[async_trait]
impl CacheClient for UnavailableCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(CacheError::ClusterUnavailable("CLUSTERDOWN".to_string()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::ClusterUnavailable("CLUSTERDOWN".to_string()))
    }
}
