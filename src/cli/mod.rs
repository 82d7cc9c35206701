//! Command-line interface definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Cache Load Tester - drives GET/SET traffic against a clustered cache
#[derive(Parser, Debug, Clone)]
#[command(name = "clt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color
    }
}

/// Top-level subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a load test from this process
    Loadtest(LoadtestArgs),
    /// Coordinate a distributed load test across worker processes
    Master(MasterArgs),
    /// Attach to a master and execute the run configuration it hands out
    Worker(WorkerArgs),
    /// Pre-populate the hot keyspace, then exit
    Init(InitArgs),
}

/// Connection parameters shared by every mode that touches the cache
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Hostname of a cluster startup node
    #[arg(short = 'f', long, default_value = crate::defaults::DEFAULT_HOST)]
    pub host: String,

    /// Port of the cluster startup node
    #[arg(short = 'p', long, default_value_t = crate::defaults::DEFAULT_PORT)]
    pub port: u16,

    /// Use TLS for cluster connections
    #[arg(short = 'x', long)]
    pub tls: bool,

    /// Per-operation timeout in seconds
    #[arg(short = 'q', long = "query-timeout", default_value_t = crate::defaults::DEFAULT_OP_TIMEOUT.as_secs())]
    pub query_timeout: u64,

    /// Number of pooled cluster connections
    #[arg(short = 'l', long = "pool-size", default_value_t = crate::defaults::DEFAULT_POOL_SIZE)]
    pub pool_size: usize,

    /// Synthesized value size in kilobytes
    #[arg(short = 'k', long = "value-size", default_value_t = crate::defaults::DEFAULT_VALUE_SIZE_KB)]
    pub value_size: usize,

    /// Key time-to-live in seconds
    #[arg(short = 't', long, default_value_t = crate::defaults::DEFAULT_TTL.as_secs())]
    pub ttl: u64,
}

/// Arguments for a local (or master-coordinated) load test
#[derive(Args, Debug, Clone)]
pub struct LoadtestArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Target cache-hit rate between 0.0 and 1.0
    #[arg(short = 'r', long = "hit-rate", default_value_t = crate::defaults::DEFAULT_HIT_RATE)]
    pub hit_rate: f64,

    /// Run duration in seconds
    #[arg(short = 'd', long, default_value_t = crate::defaults::DEFAULT_DURATION.as_secs())]
    pub duration: u64,

    /// Number of concurrent virtual users
    #[arg(short = 'c', long, default_value_t = crate::defaults::DEFAULT_USERS)]
    pub users: u32,

    /// Virtual users started per second during ramp-up
    #[arg(short = 'n', long = "spawn-rate", default_value_t = crate::defaults::DEFAULT_SPAWN_RATE)]
    pub spawn_rate: f64,

    /// Total attempts per operation (first try included)
    #[arg(long = "retry-count", default_value_t = crate::defaults::DEFAULT_RETRY_COUNT)]
    pub retry_count: u32,

    /// Fixed delay between retry attempts, in seconds
    #[arg(long = "retry-wait", default_value_t = crate::defaults::DEFAULT_RETRY_WAIT.as_secs_f64())]
    pub retry_wait: f64,

    /// Lower bound of the inter-request wait, in seconds
    #[arg(long = "wait-min", default_value_t = crate::defaults::DEFAULT_WAIT.as_secs_f64())]
    pub wait_min: f64,

    /// Upper bound of the inter-request wait, in seconds
    #[arg(long = "wait-max", default_value_t = crate::defaults::DEFAULT_WAIT.as_secs_f64())]
    pub wait_max: f64,

    /// Write the final report to a CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

/// Arguments for the distributed master role
#[derive(Args, Debug, Clone)]
pub struct MasterArgs {
    #[command(flatten)]
    pub loadtest: LoadtestArgs,

    /// Address to bind the control endpoint on
    #[arg(long = "bind-host", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// Port to bind the control endpoint on
    #[arg(long = "bind-port", default_value_t = crate::defaults::DEFAULT_MASTER_PORT)]
    pub bind_port: u16,

    /// Number of workers that must attach before the run starts
    #[arg(long = "expect-workers", default_value_t = 1)]
    pub expect_workers: usize,

    /// How long to wait for the worker quorum, in seconds
    #[arg(long = "attach-timeout", default_value_t = crate::defaults::DEFAULT_ATTACH_TIMEOUT.as_secs())]
    pub attach_timeout: u64,
}

/// Arguments for the distributed worker role
#[derive(Args, Debug, Clone)]
pub struct WorkerArgs {
    /// Hostname of the master's control endpoint
    #[arg(long = "master-host", default_value = "127.0.0.1")]
    pub master_host: String,

    /// Port of the master's control endpoint
    #[arg(long = "master-port", default_value_t = crate::defaults::DEFAULT_MASTER_PORT)]
    pub master_port: u16,
}

/// Arguments for pre-populate (init) mode
#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Number of sequential keys to pre-populate
    #[arg(short = 's', long = "keys", default_value_t = crate::defaults::DEFAULT_WARM_KEYS)]
    pub keys: u32,
}
