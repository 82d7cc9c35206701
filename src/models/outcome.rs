//! Operation categories and terminal outcomes

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Report category for one cache operation
///
/// GET and SET are split by the traffic path that issued them, so the
/// final report distinguishes intended hits from forced misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCategory {
    /// GET against the hot keyspace
    GetHit,
    /// Repair SET after a hot-key GET came back absent
    SetHit,
    /// GET against a freshly synthesized cold key
    GetMiss,
    /// Unconditional SET of a cold key
    SetMiss,
}

impl OpCategory {
    /// Wire/report name for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetHit => "get_hit",
            Self::SetHit => "set_hit",
            Self::GetMiss => "get_miss",
            Self::SetMiss => "set_miss",
        }
    }
}

impl fmt::Display for OpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one logical cache operation
///
/// Created by the retrying executor once per operation after the final
/// attempt; consumed immediately by the stats aggregator. Retried attempts
/// that eventually succeed produce a single success outcome.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    /// Report category
    pub category: OpCategory,

    /// Wall-clock latency of the final attempt
    pub latency: Duration,

    /// Whether the final attempt succeeded
    pub success: bool,

    /// Error kind of the final attempt, if it failed
    pub error: Option<String>,

    /// When the outcome was produced
    pub timestamp: DateTime<Utc>,
}

impl OperationOutcome {
    /// Create a successful outcome
    pub fn success(category: OpCategory, latency: Duration) -> Self {
        Self {
            category,
            latency,
            success: true,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a failed outcome
    pub fn failure(category: OpCategory, latency: Duration, error: String) -> Self {
        Self {
            category,
            latency,
            success: false,
            error: Some(error),
            timestamp: Utc::now(),
        }
    }

    /// Latency in fractional milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }
}
