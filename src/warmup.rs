//! Idempotent cache pre-population (init mode)

use crate::{
    client::CacheClient,
    error::{AppError, Result},
    workload::traffic::{filler_value, hot_key},
};
use std::time::Duration;
use tracing::info;

/// Result of one warm-up pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmupSummary {
    /// Keys written because they were absent
    pub written: u32,
    /// Keys skipped because they were already present
    pub skipped: u32,
}

/// Pre-populate the hot keyspace with sequential keys
///
/// Writes `key_1..=key_{key_count}` with a fixed filler value and TTL,
/// skipping keys that are already present with a live TTL. Running it
/// twice back to back performs zero additional writes. Any operation
/// failure aborts the warm-up; this runs before a load test, so a flaky
/// cluster here is a startup problem.
pub async fn warm_cache<C: CacheClient>(
    client: &C,
    key_count: u32,
    value_size_kb: usize,
    ttl: Duration,
) -> Result<WarmupSummary> {
    info!(keys = key_count, value_size_kb, "pre-populating cache");

    let value = filler_value(value_size_kb);
    let mut summary = WarmupSummary {
        written: 0,
        skipped: 0,
    };

    for index in 1..=key_count {
        let key = hot_key(index);

        let existing = client
            .get(&key)
            .await
            .map_err(|e| AppError::connection(format!("warm-up GET failed for {}: {}", key, e)))?;

        if existing.is_some() {
            summary.skipped += 1;
            continue;
        }

        client
            .set(&key, &value, ttl)
            .await
            .map_err(|e| AppError::connection(format!("warm-up SET failed for {}: {}", key, e)))?;
        summary.written += 1;
    }

    info!(
        written = summary.written,
        skipped = summary.skipped,
        "cache pre-population complete"
    );
    Ok(summary)
}
