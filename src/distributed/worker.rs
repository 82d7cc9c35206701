//! Worker role: attach to a master, run locally, stream reports back

use crate::{
    client::RedisClusterCache,
    distributed::protocol::{self, ControlMessage},
    error::{AppError, Result},
    stats::{StatsAggregator, StatsSnapshot},
    workload::LoadController,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use uuid::Uuid;

/// Attach to the master at `master_addr`, execute the run it hands out
/// and stream aggregate snapshots back
///
/// The worker aggregates locally and reports periodically; the master
/// owns the final union. Returns the worker's own final snapshot so the
/// caller can log a local summary.
pub async fn run(master_addr: &str) -> Result<StatsSnapshot> {
    let worker_id = Uuid::new_v4();
    info!(%worker_id, master_addr, "connecting to master");

    let stream = TcpStream::connect(master_addr).await.map_err(|e| {
        AppError::coordination(format!("Failed to connect to master at {}: {}", master_addr, e))
    })?;
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let (tx, mut rx) = mpsc::unbounded_channel::<ControlMessage>();
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = protocol::send_message(&mut write_half, &message).await {
                warn!(error = %e, "failed to send message to master");
                break;
            }
        }
    });

    tx.send(ControlMessage::Attach { worker_id })
        .map_err(|_| AppError::coordination("control connection closed during attach"))?;

    // Block until the master hands out the run configuration.
    let config = loop {
        match protocol::read_message(&mut lines).await? {
            Some(ControlMessage::Start { config }) => break config,
            Some(other) => {
                warn!(?other, "ignoring unexpected message while waiting for start");
            }
            None => {
                return Err(AppError::coordination(
                    "master closed the connection before the start signal",
                ))
            }
        }
    };
    config.validate()?;
    info!(
        users = config.users,
        duration_secs = config.duration_secs,
        endpoint = %config.endpoint(),
        "received run configuration from master"
    );

    let client = Arc::new(RedisClusterCache::connect(&config).await?);
    let stats = Arc::new(StatsAggregator::new());

    // Periodic reporter; stopped once the local run has drained.
    let (done_tx, mut done_rx) = watch::channel(false);
    let reporter = {
        let stats = Arc::clone(&stats);
        let tx = tx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(crate::defaults::REPORT_INTERVAL) => {
                        let _ = tx.send(ControlMessage::Report {
                            worker_id,
                            snapshot: stats.snapshot(),
                        });
                    }
                    _ = done_rx.changed() => break,
                }
            }
        })
    };

    let controller = LoadController::new(config, client, Arc::clone(&stats));
    let run_result = controller.run().await;

    let _ = done_tx.send(true);
    let _ = reporter.await;

    let snapshot = run_result?;

    tx.send(ControlMessage::Report {
        worker_id,
        snapshot: snapshot.clone(),
    })
    .map_err(|_| AppError::coordination("control connection closed before the final report"))?;
    tx.send(ControlMessage::Done { worker_id })
        .map_err(|_| AppError::coordination("control connection closed before done"))?;

    // Dropping the sender lets the writer drain its queue and exit.
    drop(tx);
    let _ = writer.await;

    info!(%worker_id, requests = snapshot.total_requests(), "worker run complete");
    Ok(snapshot)
}
