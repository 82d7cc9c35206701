//! Concurrent statistics aggregation for operation outcomes
//!
//! One [`StatsAggregator`] instance is owned per run session and injected
//! into every virtual user; counters are commutative so delivery order
//! across users does not affect the final snapshot.

use crate::models::OperationOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Running counters for one operation category
#[derive(Debug, Clone, Default)]
struct CategoryCounters {
    count: u64,
    failures: u64,
    latency_sum: Duration,
    latency_min: Duration,
    latency_max: Duration,
}

impl CategoryCounters {
    fn observe(&mut self, outcome: &OperationOutcome) {
        if self.count == 0 {
            self.latency_min = outcome.latency;
            self.latency_max = outcome.latency;
        } else {
            self.latency_min = self.latency_min.min(outcome.latency);
            self.latency_max = self.latency_max.max(outcome.latency);
        }

        self.count += 1;
        if !outcome.success {
            self.failures += 1;
        }
        self.latency_sum += outcome.latency;
    }
}

/// Thread-safe aggregator for operation outcomes
///
/// `record` never loses or double-counts an outcome under concurrent
/// delivery; `snapshot` may be called at any time, including while
/// records are still arriving.
pub struct StatsAggregator {
    started: Instant,
    categories: Mutex<HashMap<String, CategoryCounters>>,
}

impl StatsAggregator {
    /// Create an empty aggregator; elapsed time starts counting now
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            categories: Mutex::new(HashMap::new()),
        }
    }

    /// Record one terminal operation outcome
    pub fn record(&self, outcome: &OperationOutcome) {
        let mut categories = self.categories.lock().expect("stats lock poisoned");
        categories
            .entry(outcome.category.as_str().to_string())
            .or_default()
            .observe(outcome);
    }

    /// Take an immutable snapshot of all category aggregates
    pub fn snapshot(&self) -> StatsSnapshot {
        let elapsed_secs = self.started.elapsed().as_secs_f64();
        let categories = self.categories.lock().expect("stats lock poisoned");

        let mut entries: Vec<CategoryStats> = categories
            .iter()
            .map(|(name, counters)| CategoryStats::from_counters(name, counters, elapsed_secs))
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        StatsSnapshot {
            generated_at: Utc::now(),
            elapsed_secs,
            entries,
        }
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Final aggregates for one operation category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Category name (e.g. `get_hit`)
    pub name: String,
    /// Total terminal outcomes
    pub count: u64,
    /// Failed terminal outcomes
    pub failures: u64,
    /// Mean latency in milliseconds
    pub avg_ms: f64,
    /// Minimum latency in milliseconds
    pub min_ms: f64,
    /// Maximum latency in milliseconds
    pub max_ms: f64,
    /// Requests per second over the elapsed run time
    pub rate: f64,
}

impl CategoryStats {
    fn from_counters(name: &str, counters: &CategoryCounters, elapsed_secs: f64) -> Self {
        let count = counters.count;
        let avg_ms = if count > 0 {
            counters.latency_sum.as_secs_f64() * 1000.0 / count as f64
        } else {
            0.0
        };
        let rate = if elapsed_secs > f64::EPSILON {
            count as f64 / elapsed_secs
        } else {
            0.0
        };

        Self {
            name: name.to_string(),
            count,
            failures: counters.failures,
            avg_ms,
            min_ms: counters.latency_min.as_secs_f64() * 1000.0,
            max_ms: counters.latency_max.as_secs_f64() * 1000.0,
            rate,
        }
    }
}

/// Immutable view of all category aggregates at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// When the snapshot was taken
    pub generated_at: DateTime<Utc>,
    /// Elapsed run time at snapshot time, in seconds
    pub elapsed_secs: f64,
    /// Per-category aggregates, sorted by name
    pub entries: Vec<CategoryStats>,
}

impl StatsSnapshot {
    /// Empty snapshot
    pub fn empty() -> Self {
        Self {
            generated_at: Utc::now(),
            elapsed_secs: 0.0,
            entries: Vec::new(),
        }
    }

    /// Look up one category by name
    pub fn get(&self, name: &str) -> Option<&CategoryStats> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Total terminal outcomes across all categories
    pub fn total_requests(&self) -> u64 {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    /// Total failures across all categories
    pub fn total_failures(&self) -> u64 {
        self.entries.iter().map(|entry| entry.failures).sum()
    }

    /// Whether the snapshot holds no outcomes at all
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Combine several snapshots into one, category by category
    ///
    /// Counts and failures sum; min/max extend; means are weighted by
    /// count. Rates sum because the inputs describe workers running
    /// concurrently over the same wall-clock window.
    pub fn union<'a, I>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = &'a StatsSnapshot>,
    {
        let mut elapsed_secs = 0.0f64;
        let mut combined: HashMap<String, CategoryStats> = HashMap::new();

        for snapshot in snapshots {
            elapsed_secs = elapsed_secs.max(snapshot.elapsed_secs);
            for entry in &snapshot.entries {
                combined
                    .entry(entry.name.clone())
                    .and_modify(|existing| {
                        let total = existing.count + entry.count;
                        if total > 0 {
                            existing.avg_ms = (existing.avg_ms * existing.count as f64
                                + entry.avg_ms * entry.count as f64)
                                / total as f64;
                        }
                        existing.count = total;
                        existing.failures += entry.failures;
                        existing.min_ms = existing.min_ms.min(entry.min_ms);
                        existing.max_ms = existing.max_ms.max(entry.max_ms);
                        existing.rate += entry.rate;
                    })
                    .or_insert_with(|| entry.clone());
            }
        }

        let mut entries: Vec<CategoryStats> = combined.into_values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            generated_at: Utc::now(),
            elapsed_secs,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OpCategory;
    use std::sync::Arc;

    fn success(category: OpCategory, ms: u64) -> OperationOutcome {
        OperationOutcome::success(category, Duration::from_millis(ms))
    }

    fn failure(category: OpCategory, ms: u64) -> OperationOutcome {
        OperationOutcome::failure(category, Duration::from_millis(ms), "timeout".to_string())
    }

    #[test]
    fn test_single_category_aggregation() {
        let stats = StatsAggregator::new();
        stats.record(&success(OpCategory::GetHit, 10));
        stats.record(&success(OpCategory::GetHit, 30));
        stats.record(&failure(OpCategory::GetHit, 20));

        let snapshot = stats.snapshot();
        let entry = snapshot.get("get_hit").unwrap();

        assert_eq!(entry.count, 3);
        assert_eq!(entry.failures, 1);
        assert_eq!(entry.avg_ms, 20.0);
        assert_eq!(entry.min_ms, 10.0);
        assert_eq!(entry.max_ms, 30.0);
        assert!(entry.rate > 0.0);
    }

    #[test]
    fn test_categories_are_independent() {
        let stats = StatsAggregator::new();
        stats.record(&success(OpCategory::GetHit, 5));
        stats.record(&success(OpCategory::SetMiss, 50));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.get("get_hit").unwrap().count, 1);
        assert_eq!(snapshot.get("set_miss").unwrap().count, 1);
        assert!(snapshot.get("get_miss").is_none());
    }

    #[test]
    fn test_snapshot_totals() {
        let stats = StatsAggregator::new();
        stats.record(&success(OpCategory::GetHit, 1));
        stats.record(&failure(OpCategory::GetMiss, 1));
        stats.record(&failure(OpCategory::SetMiss, 1));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests(), 3);
        assert_eq!(snapshot.total_failures(), 2);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_concurrent_record_loses_nothing() {
        let stats = Arc::new(StatsAggregator::new());
        let threads = 8u64;
        let per_thread = 1000u64;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..per_thread {
                        stats.record(&success(OpCategory::GetHit, 1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.get("get_hit").unwrap().count, threads * per_thread);
        assert_eq!(snapshot.get("get_hit").unwrap().failures, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_async_record_loses_nothing() {
        let stats = Arc::new(StatsAggregator::new());
        let tasks = 16u64;
        let per_task = 500u64;

        let handles: Vec<_> = (0..tasks)
            .map(|_| {
                let stats = Arc::clone(&stats);
                tokio::spawn(async move {
                    for _ in 0..per_task {
                        stats.record(&failure(OpCategory::SetHit, 2));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = stats.snapshot();
        let entry = snapshot.get("set_hit").unwrap();
        assert_eq!(entry.count, tasks * per_task);
        assert_eq!(entry.failures, tasks * per_task);
    }

    #[test]
    fn test_union_combines_categories() {
        let mut a = StatsSnapshot::empty();
        a.elapsed_secs = 10.0;
        a.entries = vec![CategoryStats {
            name: "get_hit".to_string(),
            count: 100,
            failures: 2,
            avg_ms: 10.0,
            min_ms: 1.0,
            max_ms: 40.0,
            rate: 10.0,
        }];

        let mut b = StatsSnapshot::empty();
        b.elapsed_secs = 12.0;
        b.entries = vec![
            CategoryStats {
                name: "get_hit".to_string(),
                count: 300,
                failures: 1,
                avg_ms: 20.0,
                min_ms: 0.5,
                max_ms: 90.0,
                rate: 25.0,
            },
            CategoryStats {
                name: "set_miss".to_string(),
                count: 50,
                failures: 0,
                avg_ms: 5.0,
                min_ms: 2.0,
                max_ms: 9.0,
                rate: 4.0,
            },
        ];

        let union = StatsSnapshot::union([&a, &b]);
        assert_eq!(union.elapsed_secs, 12.0);
        assert_eq!(union.entries.len(), 2);

        let get_hit = union.get("get_hit").unwrap();
        assert_eq!(get_hit.count, 400);
        assert_eq!(get_hit.failures, 3);
        assert_eq!(get_hit.avg_ms, 17.5); // (100*10 + 300*20) / 400
        assert_eq!(get_hit.min_ms, 0.5);
        assert_eq!(get_hit.max_ms, 90.0);
        assert_eq!(get_hit.rate, 35.0);

        assert_eq!(union.get("set_miss").unwrap().count, 50);
    }

    #[test]
    fn test_snapshot_serde_roundtrip() {
        let stats = StatsAggregator::new();
        stats.record(&success(OpCategory::GetMiss, 7));

        let snapshot = stats.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: StatsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.entries, snapshot.entries);
    }
}
