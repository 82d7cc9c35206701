//! Traffic synthesis: hot/cold routing and key/value generation
//!
//! The synthesizer produces a controllable, reproducible-in-distribution
//! hit ratio without a real request trace: with probability `hit_rate` it
//! targets the bounded hot keyspace (expected resident), otherwise a
//! virtually-unique cold key (expected absent).

use crate::models::Config;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Per-request routing decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrafficDecision {
    /// Target a key expected to already reside in the cache
    Hot { key: String },
    /// Target a freshly synthesized key expected absent
    Cold { key: String },
}

impl TrafficDecision {
    /// The key this decision targets
    pub fn key(&self) -> &str {
        match self {
            Self::Hot { key } | Self::Cold { key } => key,
        }
    }

    /// Whether this decision models an intended cache hit
    pub fn is_hot(&self) -> bool {
        matches!(self, Self::Hot { .. })
    }
}

/// Decides, per simulated request, which traffic path to take and
/// synthesizes the key/value material for it
#[derive(Debug)]
pub struct TrafficSynthesizer {
    hit_rate: f64,
    hot_keyspace: u32,
    value_size_kb: usize,
    rng: StdRng,
}

impl TrafficSynthesizer {
    /// Create a synthesizer with an OS-seeded RNG
    pub fn new(hit_rate: f64, value_size_kb: usize) -> Self {
        Self::with_rng(hit_rate, value_size_kb, StdRng::from_os_rng())
    }

    /// Create a synthesizer with an explicit RNG (deterministic in tests)
    pub fn with_rng(hit_rate: f64, value_size_kb: usize, rng: StdRng) -> Self {
        Self {
            hit_rate,
            hot_keyspace: crate::defaults::HOT_KEYSPACE_SIZE,
            value_size_kb,
            rng,
        }
    }

    /// Build from run configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.hit_rate, config.value_size_kb)
    }

    /// Draw the next routing decision
    pub fn decide(&mut self) -> TrafficDecision {
        if self.rng.random_bool(self.hit_rate) {
            let index = self.rng.random_range(1..=self.hot_keyspace);
            TrafficDecision::Hot { key: hot_key(index) }
        } else {
            TrafficDecision::Cold { key: cold_key() }
        }
    }

    /// Synthesize a value of the configured size
    pub fn synth_value(&self) -> Vec<u8> {
        filler_value(self.value_size_kb)
    }
}

/// Name of the `index`-th hot key
pub fn hot_key(index: u32) -> String {
    format!("key_{}", index)
}

/// A virtually-unique cold key
pub fn cold_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Filler bytes of exactly `size_kb * 1024` length
///
/// Content is arbitrary; only the size is contractual.
pub fn filler_value(size_kb: usize) -> Vec<u8> {
    vec![b'A'; size_kb * 1024]
}
