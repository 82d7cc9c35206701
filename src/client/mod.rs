//! Cache-client capability consumed by the workload engine
//!
//! The engine only depends on the [`CacheClient`] trait; the cluster-aware
//! redis implementation lives here as the production collaborator. The
//! trait contract requires implementations to be safe for concurrent
//! invocation by many virtual users sharing one handle.

use crate::{
    error::{AppError, CacheError, CacheResult, Result},
    models::Config,
};
use async_trait::async_trait;
use redis::cluster::ClusterClientBuilder;
use redis::cluster_async::ClusterConnection;
use redis::AsyncCommands;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Capability exposed by the cache backend
///
/// `get` distinguishes "present" from "absent"; both operations may fail
/// with a transient or permanent [`CacheError`].
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Fetch the value stored under `key`, or `None` when absent
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store `value` under `key` with the given time-to-live
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;
}

/// Cluster-aware redis cache client
///
/// Holds a fixed-size pool of multiplexed cluster connections handed out
/// round-robin. Each connection is internally safe for concurrent use;
/// the pool spreads load so one socket does not serialize every virtual
/// user.
pub struct RedisClusterCache {
    connections: Vec<ClusterConnection>,
    next: AtomicUsize,
}

impl RedisClusterCache {
    /// Connect to the cluster described by `config`
    ///
    /// Establishes `pool_size` connections up front; any failure here is a
    /// fatal startup error, not a per-operation failure.
    pub async fn connect(config: &Config) -> Result<Self> {
        let scheme = if config.tls { "rediss" } else { "redis" };
        let node = format!("{}://{}:{}", scheme, config.host, config.port);

        info!(
            endpoint = %config.endpoint(),
            tls = config.tls,
            pool_size = config.pool_size,
            "connecting to cache cluster"
        );

        let client = ClusterClientBuilder::new(vec![node])
            .connection_timeout(config.op_timeout())
            .response_timeout(config.op_timeout())
            .build()
            .map_err(|e| AppError::connection(format!("Failed to build cluster client: {}", e)))?;

        let mut connections = Vec::with_capacity(config.pool_size);
        for i in 0..config.pool_size {
            let conn = client.get_async_connection().await.map_err(|e| {
                AppError::connection(format!(
                    "Failed to establish cluster connection {}/{}: {}",
                    i + 1,
                    config.pool_size,
                    e
                ))
            })?;
            connections.push(conn);
        }

        debug!(pool_size = connections.len(), "cluster connection pool ready");

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Pick the next pooled connection round-robin
    fn connection(&self) -> ClusterConnection {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[index].clone()
    }
}

#[async_trait]
impl CacheClient for RedisClusterCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.connection();
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(classify_redis_error)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(classify_redis_error)
    }
}

/// Map a redis error into the engine's transient/permanent taxonomy
fn classify_redis_error(error: redis::RedisError) -> CacheError {
    use redis::ErrorKind;

    if error.is_timeout() {
        return CacheError::Timeout;
    }

    match error.kind() {
        ErrorKind::ClusterDown | ErrorKind::MasterDown | ErrorKind::TryAgain => {
            CacheError::ClusterUnavailable(error.to_string())
        }
        _ if error.is_connection_refusal()
            || error.is_connection_dropped()
            || error.is_io_error() =>
        {
            CacheError::ConnectionFailed(error.to_string())
        }
        _ => CacheError::Other(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_down_is_transient() {
        let error = redis::RedisError::from((redis::ErrorKind::ClusterDown, "CLUSTERDOWN"));
        let classified = classify_redis_error(error);
        assert!(matches!(classified, CacheError::ClusterUnavailable(_)));
        assert!(classified.is_transient());
    }

    #[test]
    fn test_try_again_is_transient() {
        let error = redis::RedisError::from((redis::ErrorKind::TryAgain, "TRYAGAIN"));
        assert!(classify_redis_error(error).is_transient());
    }

    #[test]
    fn test_io_timeout_maps_to_timeout() {
        let io_error = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let error = redis::RedisError::from(io_error);
        assert_eq!(classify_redis_error(error), CacheError::Timeout);
    }

    #[test]
    fn test_connection_refused_maps_to_connection_failed() {
        let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error = redis::RedisError::from(io_error);
        assert!(matches!(
            classify_redis_error(error),
            CacheError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_response_error_is_permanent() {
        let error = redis::RedisError::from((redis::ErrorKind::ResponseError, "WRONGTYPE"));
        let classified = classify_redis_error(error);
        assert!(matches!(classified, CacheError::Other(_)));
        assert!(!classified.is_transient());
    }
}
