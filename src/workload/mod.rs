//! Workload engine: traffic synthesis, virtual users and run control

pub mod controller;
pub mod traffic;
pub mod user;

pub use controller::LoadController;
pub use traffic::{cold_key, filler_value, hot_key, TrafficDecision, TrafficSynthesizer};
pub use user::{UserState, VirtualUser};

#[cfg(test)]
pub(crate) mod testutil {
    //! In-memory cache fake shared by workload unit tests

    use crate::client::CacheClient;
    use crate::error::CacheResult;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    struct StoredValue {
        value: Vec<u8>,
        expires_at: Instant,
    }

    /// HashMap-backed cache with TTL expiry and call counters
    pub(crate) struct MemoryCache {
        store: Mutex<HashMap<String, StoredValue>>,
        gets: AtomicU64,
        sets: AtomicU64,
    }

    impl MemoryCache {
        pub(crate) fn new() -> Self {
            Self {
                store: Mutex::new(HashMap::new()),
                gets: AtomicU64::new(0),
                sets: AtomicU64::new(0),
            }
        }

        pub(crate) fn len(&self) -> usize {
            self.store.lock().unwrap().len()
        }

        pub(crate) fn get_count(&self) -> u64 {
            self.gets.load(Ordering::SeqCst)
        }

        #[allow(dead_code)]
        pub(crate) fn set_count(&self) -> u64 {
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
}
