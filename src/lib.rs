//! Cache Load Tester
//!
//! A load generator for clustered key-value caches: drives a configurable
//! rate of GET/SET traffic shaped to a target hit ratio across many
//! concurrent virtual users, and reports per-category latency/throughput
//! statistics. Supports a distributed mode where one master coordinates
//! several worker processes into a single logical run.

pub mod cli;
pub mod client;
pub mod config;
pub mod distributed;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod stats;
pub mod warmup;
pub mod workload;

// Re-export commonly used types
pub use client::{CacheClient, RedisClusterCache};
pub use error::{AppError, CacheError, CacheResult, Result};
pub use executor::{OperationExecutor, RetryPolicy};
pub use models::{Config, OpCategory, OperationOutcome};
pub use output::ReportFormatter;
pub use stats::{CategoryStats, StatsAggregator, StatsSnapshot};
pub use workload::{LoadController, TrafficSynthesizer, VirtualUser};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_HOST: &str = "localhost";
    pub const DEFAULT_PORT: u16 = 6379;
    pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_HIT_RATE: f64 = 0.5;
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(60);
    pub const DEFAULT_USERS: u32 = 1;
    pub const DEFAULT_SPAWN_RATE: f64 = 1.0;
    pub const DEFAULT_VALUE_SIZE_KB: usize = 1;
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
    pub const DEFAULT_POOL_SIZE: usize = 4;
    pub const DEFAULT_RETRY_COUNT: u32 = 3;
    pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(2);
    pub const DEFAULT_WAIT: Duration = Duration::from_secs(1);
    pub const DEFAULT_WARM_KEYS: u32 = 1000;
    pub const DEFAULT_MASTER_PORT: u16 = 5557;
    pub const DEFAULT_ATTACH_TIMEOUT: Duration = Duration::from_secs(60);

    /// Size of the bounded hot keyspace (`key_1..=key_N`)
    pub const HOT_KEYSPACE_SIZE: u32 = 1000;

    /// How often workers ship interim snapshots to the master
    pub const REPORT_INTERVAL: Duration = Duration::from_secs(2);

    /// How often the controller logs interim progress
    pub const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(5);
}
