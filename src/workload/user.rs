//! Virtual user loop: one simulated concurrent cache client

use crate::{
    client::CacheClient,
    executor::{OperationExecutor, RetryPolicy},
    models::{Config, OpCategory},
    stats::StatsAggregator,
    workload::traffic::{TrafficDecision, TrafficSynthesizer},
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Lifecycle of a virtual user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    /// Constructed, not yet scheduled
    Idle,
    /// Executing the request loop
    Running,
    /// Stop observed, finishing the in-flight operation
    Stopping,
    /// Loop exited; no further outcomes will be delivered
    Done,
}

/// One simulated concurrent client issuing a continuous operation stream
///
/// Shares only the aggregator and the cache-client handle with its peers.
/// The stop signal is level-triggered: it is checked between iterations
/// and during the pacing wait, never mid-operation, so an in-flight
/// operation and its retries always complete before the user drains.
pub struct VirtualUser<C> {
    id: u32,
    client: Arc<C>,
    synth: TrafficSynthesizer,
    executor: OperationExecutor,
    stats: Arc<StatsAggregator>,
    stop: watch::Receiver<bool>,
    ttl: Duration,
    wait_min: Duration,
    wait_max: Duration,
    pace_rng: StdRng,
    state: UserState,
}

impl<C: CacheClient> VirtualUser<C> {
    /// Create a user bound to a run session
    pub fn new(
        id: u32,
        client: Arc<C>,
        config: &Config,
        stats: Arc<StatsAggregator>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let (wait_min, wait_max) = config.wait_bounds();
        Self {
            id,
            client,
            synth: TrafficSynthesizer::from_config(config),
            executor: OperationExecutor::new(RetryPolicy::from_config(config)),
            stats,
            stop,
            ttl: config.ttl(),
            wait_min,
            wait_max,
            pace_rng: StdRng::from_os_rng(),
            state: UserState::Idle,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> UserState {
        self.state
    }

    /// Drive the request loop until the stop signal is observed
    pub async fn run(mut self) -> UserState {
        self.state = UserState::Running;
        debug!(user = self.id, "virtual user running");

        loop {
            if *self.stop.borrow() {
                self.state = UserState::Stopping;
                break;
            }

            self.iteration().await;

            if *self.stop.borrow() {
                self.state = UserState::Stopping;
                break;
            }

            self.pace().await;
        }

        self.state = UserState::Done;
        debug!(user = self.id, "virtual user drained");
        self.state
    }

    /// Execute one synthesized scenario and deliver its outcomes
    async fn iteration(&mut self) {
        match self.synth.decide() {
            TrafficDecision::Hot { key } => {
                let client = Arc::clone(&self.client);
                let lookup_key = key.clone();
                let (value, outcome) = self
                    .executor
                    .execute(OpCategory::GetHit, || {
                        let client = Arc::clone(&client);
                        let key = lookup_key.clone();
                        async move { client.get(&key).await }
                    })
                    .await;
                self.stats.record(&outcome);

                // Absent hot key (cold start or TTL expiry): repair it.
                if let Some(None) = value {
                    let payload = self.synth.synth_value();
                    let ttl = self.ttl;
                    let (_, outcome) = self
                        .executor
                        .execute(OpCategory::SetHit, || {
                            let client = Arc::clone(&client);
                            let key = key.clone();
                            let payload = payload.clone();
                            async move { client.set(&key, &payload, ttl).await }
                        })
                        .await;
                    self.stats.record(&outcome);
                }
            }
            TrafficDecision::Cold { key } => {
                let client = Arc::clone(&self.client);
                let lookup_key = key.clone();
                let (_, outcome) = self
                    .executor
                    .execute(OpCategory::GetMiss, || {
                        let client = Arc::clone(&client);
                        let key = lookup_key.clone();
                        async move { client.get(&key).await }
                    })
                    .await;
                self.stats.record(&outcome);

                let payload = self.synth.synth_value();
                let ttl = self.ttl;
                let (_, outcome) = self
                    .executor
                    .execute(OpCategory::SetMiss, || {
                        let client = Arc::clone(&client);
                        let key = key.clone();
                        let payload = payload.clone();
                        async move { client.set(&key, &payload, ttl).await }
                    })
                    .await;
                self.stats.record(&outcome);
            }
        }
    }

    /// Inter-request pacing: a bounded-random wait, cut short by stop
    async fn pace(&mut self) {
        let wait = if self.wait_max > self.wait_min {
            let secs = self
                .pace_rng
                .random_range(self.wait_min.as_secs_f64()..=self.wait_max.as_secs_f64());
            Duration::from_secs_f64(secs)
        } else {
            self.wait_min
        };

        if wait.is_zero() {
            tokio::task::yield_now().await;
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = self.stop.changed() => {}
        }
    }
}
