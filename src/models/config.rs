//! Run configuration data model and validation

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable run parameters for one load test
///
/// Validated once at startup; read-only for every component afterwards.
/// The Load Controller owns the instance, every other component receives
/// a shared reference. In distributed mode the master serializes this
/// struct verbatim to its workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Hostname of a cluster startup node
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the cluster startup node
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use TLS for cluster connections
    #[serde(default)]
    pub tls: bool,

    /// Per-operation timeout in seconds
    #[serde(default = "default_op_timeout_secs")]
    pub op_timeout_secs: u64,

    /// Target cache-hit rate in [0.0, 1.0]
    #[serde(default = "default_hit_rate")]
    pub hit_rate: f64,

    /// Run duration in seconds
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Number of concurrent virtual users
    #[serde(default = "default_users")]
    pub users: u32,

    /// Virtual users started per second during ramp-up
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: f64,

    /// Synthesized value size in kilobytes
    #[serde(default = "default_value_size_kb")]
    pub value_size_kb: usize,

    /// Key time-to-live in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Number of pooled cluster connections shared by all virtual users
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Total attempts per operation (first try included)
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Fixed delay between retry attempts, in seconds
    #[serde(default = "default_retry_wait_secs")]
    pub retry_wait_secs: f64,

    /// Lower bound of the inter-request pacing wait, in seconds
    #[serde(default = "default_wait_secs")]
    pub wait_min_secs: f64,

    /// Upper bound of the inter-request pacing wait, in seconds
    #[serde(default = "default_wait_secs")]
    pub wait_max_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tls: false,
            op_timeout_secs: default_op_timeout_secs(),
            hit_rate: default_hit_rate(),
            duration_secs: default_duration_secs(),
            users: default_users(),
            spawn_rate: default_spawn_rate(),
            value_size_kb: default_value_size_kb(),
            ttl_secs: default_ttl_secs(),
            pool_size: default_pool_size(),
            retry_count: default_retry_count(),
            retry_wait_secs: default_retry_wait_secs(),
            wait_min_secs: default_wait_secs(),
            wait_max_secs: default_wait_secs(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the per-operation timeout as Duration
    pub fn op_timeout(&self) -> Duration {
        Duration::from_secs(self.op_timeout_secs)
    }

    /// Get the run duration as Duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// Get the key TTL as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Get the retry backoff as Duration
    pub fn retry_wait(&self) -> Duration {
        Duration::from_secs_f64(self.retry_wait_secs)
    }

    /// Get the pacing bounds as Durations
    pub fn wait_bounds(&self) -> (Duration, Duration) {
        (
            Duration::from_secs_f64(self.wait_min_secs),
            Duration::from_secs_f64(self.wait_max_secs),
        )
    }

    /// Target endpoint in host:port form, for log lines
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(AppError::config("Target host cannot be empty"));
        }

        if self.port == 0 {
            return Err(AppError::config("Target port cannot be 0"));
        }

        if !(0.0..=1.0).contains(&self.hit_rate) {
            return Err(AppError::config(format!(
                "Hit rate must be between 0.0 and 1.0, got {}",
                self.hit_rate
            )));
        }

        if self.duration_secs == 0 {
            return Err(AppError::config("Run duration must be greater than 0"));
        }

        if self.users == 0 {
            return Err(AppError::config("User count must be greater than 0"));
        }

        if self.spawn_rate <= 0.0 {
            return Err(AppError::config("Spawn rate must be greater than 0"));
        }

        if self.value_size_kb == 0 {
            return Err(AppError::config("Value size must be at least 1 KB"));
        }

        if self.value_size_kb > 16 * 1024 {
            return Err(AppError::config("Value size cannot exceed 16 MB"));
        }

        if self.ttl_secs == 0 {
            return Err(AppError::config("Key TTL must be greater than 0"));
        }

        if self.pool_size == 0 {
            return Err(AppError::config("Connection pool size must be greater than 0"));
        }

        if self.retry_count == 0 {
            return Err(AppError::config("Retry count must allow at least one attempt"));
        }

        if self.retry_wait_secs < 0.0 {
            return Err(AppError::config("Retry wait cannot be negative"));
        }

        if self.op_timeout_secs == 0 {
            return Err(AppError::config("Operation timeout must be greater than 0"));
        }

        if self.op_timeout_secs > 300 {
            return Err(AppError::config("Operation timeout cannot exceed 300 seconds"));
        }

        if self.wait_min_secs < 0.0 {
            return Err(AppError::config("Pacing wait cannot be negative"));
        }

        if self.wait_max_secs < self.wait_min_secs {
            return Err(AppError::config(format!(
                "Pacing wait upper bound ({}) is below the lower bound ({})",
                self.wait_max_secs, self.wait_min_secs
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    ///
    /// Environment variables are a convenience of the CLI layer; the engine
    /// itself only ever sees the resulting struct.
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("CACHE_HOST") {
            self.host = host;
        }

        if let Ok(port) = std::env::var("CACHE_PORT") {
            self.port = port
                .parse()
                .map_err(|e| AppError::config(format!("Invalid CACHE_PORT value '{}': {}", port, e)))?;
        }

        if let Ok(tls) = std::env::var("CACHE_TLS") {
            self.tls = tls
                .parse()
                .map_err(|e| AppError::config(format!("Invalid CACHE_TLS value '{}': {}", tls, e)))?;
        }

        if let Ok(hit_rate) = std::env::var("HIT_RATE") {
            self.hit_rate = hit_rate
                .parse()
                .map_err(|e| AppError::config(format!("Invalid HIT_RATE value '{}': {}", hit_rate, e)))?;
        }

        if let Ok(value_size) = std::env::var("VALUE_SIZE_KB") {
            self.value_size_kb = value_size.parse().map_err(|e| {
                AppError::config(format!("Invalid VALUE_SIZE_KB value '{}': {}", value_size, e))
            })?;
        }

        if let Ok(ttl) = std::env::var("TTL_SECS") {
            self.ttl_secs = ttl
                .parse()
                .map_err(|e| AppError::config(format!("Invalid TTL_SECS value '{}': {}", ttl, e)))?;
        }

        if let Ok(pool) = std::env::var("POOL_SIZE") {
            self.pool_size = pool
                .parse()
                .map_err(|e| AppError::config(format!("Invalid POOL_SIZE value '{}': {}", pool, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_host() -> String {
    crate::defaults::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    crate::defaults::DEFAULT_PORT
}

fn default_op_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_OP_TIMEOUT.as_secs()
}

fn default_hit_rate() -> f64 {
    crate::defaults::DEFAULT_HIT_RATE
}

fn default_duration_secs() -> u64 {
    crate::defaults::DEFAULT_DURATION.as_secs()
}

fn default_users() -> u32 {
    crate::defaults::DEFAULT_USERS
}

fn default_spawn_rate() -> f64 {
    crate::defaults::DEFAULT_SPAWN_RATE
}

fn default_value_size_kb() -> usize {
    crate::defaults::DEFAULT_VALUE_SIZE_KB
}

fn default_ttl_secs() -> u64 {
    crate::defaults::DEFAULT_TTL.as_secs()
}

fn default_pool_size() -> usize {
    crate::defaults::DEFAULT_POOL_SIZE
}

fn default_retry_count() -> u32 {
    crate::defaults::DEFAULT_RETRY_COUNT
}

fn default_retry_wait_secs() -> f64 {
    crate::defaults::DEFAULT_RETRY_WAIT.as_secs_f64()
}

fn default_wait_secs() -> f64 {
    crate::defaults::DEFAULT_WAIT.as_secs_f64()
}
