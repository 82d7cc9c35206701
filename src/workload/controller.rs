//! Load controller: ramp-up, steady state, stop and drain

use crate::{
    client::CacheClient,
    error::{drain_grace, AppError, Result},
    models::Config,
    stats::{StatsAggregator, StatsSnapshot},
    workload::user::{UserState, VirtualUser},
};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Execution context for one run: the broadcast stop channel and the pool
/// of spawned virtual users. Created fresh per run and consumed on drain;
/// nothing is reused across runs.
struct RunSession {
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    users: Vec<JoinHandle<UserState>>,
}

impl RunSession {
    fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            stop_tx,
            stop_rx,
            users: Vec::new(),
        }
    }

    /// Broadcast stop once and wait for every user to reach `Done`
    async fn drain(self, grace: Duration) -> Result<()> {
        if self.stop_tx.send(true).is_err() {
            warn!("no virtual users were listening for the stop signal");
        }
        info!(users = self.users.len(), "stop signal broadcast, draining virtual users");

        let joined = tokio::time::timeout(grace, join_all(self.users))
            .await
            .map_err(|_| {
                AppError::shutdown(format!(
                    "virtual users failed to drain within {:.1}s grace period",
                    grace.as_secs_f64()
                ))
            })?;

        for result in joined {
            let state = result
                .map_err(|e| AppError::internal(format!("virtual user task failed: {}", e)))?;
            if state != UserState::Done {
                return Err(AppError::shutdown(format!(
                    "virtual user drained in unexpected state {:?}",
                    state
                )));
            }
        }

        Ok(())
    }
}

/// Orchestrates one load test run end to end
///
/// Brings up the configured virtual users at the spawn rate (a ramp, not
/// a burst), holds steady state for the run duration, then stops and
/// drains every user before taking the final snapshot.
pub struct LoadController<C> {
    config: Config,
    client: Arc<C>,
    stats: Arc<StatsAggregator>,
}

impl<C: CacheClient + 'static> LoadController<C> {
    /// Create a controller for one run
    pub fn new(config: Config, client: Arc<C>, stats: Arc<StatsAggregator>) -> Self {
        Self {
            config,
            client,
            stats,
        }
    }

    /// Execute the run and return the final statistics snapshot
    pub async fn run(&self) -> Result<StatsSnapshot> {
        let mut session = RunSession::new();
        let deadline = Instant::now() + self.config.duration();

        info!(
            users = self.config.users,
            spawn_rate = self.config.spawn_rate,
            duration_secs = self.config.duration_secs,
            hit_rate = self.config.hit_rate,
            "starting load test run"
        );

        // Ramp: one user every 1/spawn_rate seconds. The run clock is
        // already ticking, so a slow ramp eats into the steady state.
        let spawn_interval = Duration::from_secs_f64(1.0 / self.config.spawn_rate);
        for id in 0..self.config.users {
            let user = VirtualUser::new(
                id,
                Arc::clone(&self.client),
                &self.config,
                Arc::clone(&self.stats),
                session.stop_rx.clone(),
            );
            session.users.push(tokio::spawn(user.run()));

            if id + 1 < self.config.users {
                tokio::time::sleep(spawn_interval).await;
            }
        }
        debug!(spawned = session.users.len(), "ramp-up complete");

        // Hold steady state, logging interim progress.
        let interval = crate::defaults::PROGRESS_LOG_INTERVAL;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep_until(deadline.min(now + interval)).await;
            if Instant::now() >= deadline {
                break;
            }

            let snapshot = self.stats.snapshot();
            info!(
                requests = snapshot.total_requests(),
                failures = snapshot.total_failures(),
                elapsed_secs = snapshot.elapsed_secs as u64,
                "run in progress"
            );
        }

        let grace = drain_grace(
            self.config.op_timeout(),
            self.config.retry_count,
            self.config.retry_wait(),
            self.config.wait_bounds().1,
        );
        session.drain(grace).await?;

        let snapshot = self.stats.snapshot();
        info!(
            requests = snapshot.total_requests(),
            failures = snapshot.total_failures(),
            "load test run complete"
        );
        Ok(snapshot)
    }
}
