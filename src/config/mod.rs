//! Configuration loading: CLI arguments + environment merge + validation

use crate::{
    cli::{InitArgs, LoadtestArgs},
    error::{AppError, Result},
    models::Config,
};
use tracing::warn;

/// Build the validated run configuration for a load test
///
/// Order of precedence: CLI arguments, then environment variables (with
/// `.env` support). The returned struct is the engine's only source of
/// configuration; nothing downstream reads the environment.
pub fn load_config(args: &LoadtestArgs) -> Result<Config> {
    dotenv::dotenv().ok();

    let mut config = config_from_args(args);
    config.merge_from_env()?;
    config.validate()?;

    if config.users as usize > config.pool_size * 64 {
        warn!(
            users = config.users,
            pool_size = config.pool_size,
            "many users share few pooled connections; consider raising --pool-size"
        );
    }

    Ok(config)
}

/// Build the validated configuration for pre-populate (init) mode
pub fn load_init_config(args: &InitArgs) -> Result<Config> {
    dotenv::dotenv().ok();

    if args.keys == 0 {
        return Err(AppError::config("Key count for init mode must be greater than 0"));
    }

    let mut config = Config::default();
    apply_connection_args(&mut config, args);
    config.merge_from_env()?;
    config.validate()?;
    Ok(config)
}

fn config_from_args(args: &LoadtestArgs) -> Config {
    Config {
        host: args.connection.host.clone(),
        port: args.connection.port,
        tls: args.connection.tls,
        op_timeout_secs: args.connection.query_timeout,
        hit_rate: args.hit_rate,
        duration_secs: args.duration,
        users: args.users,
        spawn_rate: args.spawn_rate,
        value_size_kb: args.connection.value_size,
        ttl_secs: args.connection.ttl,
        pool_size: args.connection.pool_size,
        retry_count: args.retry_count,
        retry_wait_secs: args.retry_wait,
        wait_min_secs: args.wait_min,
        wait_max_secs: args.wait_max,
    }
}

fn apply_connection_args(config: &mut Config, args: &InitArgs) {
    config.host = args.connection.host.clone();
    config.port = args.connection.port;
    config.tls = args.connection.tls;
    config.op_timeout_secs = args.connection.query_timeout;
    config.pool_size = args.connection.pool_size;
    config.value_size_kb = args.connection.value_size;
    config.ttl_secs = args.connection.ttl;
}
