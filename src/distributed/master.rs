//! Master role: admit workers, synchronize the start, union their reports

use crate::{
    distributed::protocol::{self, ControlMessage},
    error::{drain_grace, AppError, Result},
    models::Config,
    stats::StatsSnapshot,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Master-side options beyond the shared run configuration
#[derive(Debug, Clone)]
pub struct MasterOptions {
    /// `host:port` to bind the control endpoint on
    pub bind_addr: String,
    /// Number of workers required before the run starts
    pub expect_workers: usize,
    /// How long to wait for the worker quorum before aborting
    pub attach_timeout: Duration,
}

/// Master's view of one attached worker
struct WorkerEntry {
    tx: mpsc::UnboundedSender<ControlMessage>,
    snapshot: Option<StatsSnapshot>,
    done: bool,
    connected: bool,
}

/// Membership and run state shared with connection handlers
///
/// The worker map grows as workers attach and never shrinks during a
/// run; a disconnect only clears the `connected` flag, keeping the
/// worker's last-known snapshot for the final union.
#[derive(Default)]
struct MembershipState {
    workers: HashMap<Uuid, WorkerEntry>,
    run_config: Option<Config>,
}

type Membership = Arc<Mutex<MembershipState>>;

/// Coordinates one distributed run across attached worker processes
pub struct Master {
    config: Config,
    options: MasterOptions,
    listener: TcpListener,
    membership: Membership,
}

impl Master {
    /// Bind the control endpoint; failure here is fatal
    pub async fn bind(config: Config, options: MasterOptions) -> Result<Self> {
        let listener = TcpListener::bind(&options.bind_addr).await.map_err(|e| {
            AppError::coordination(format!(
                "Failed to bind control endpoint {}: {}",
                options.bind_addr, e
            ))
        })?;

        info!(bind_addr = %options.bind_addr, expect_workers = options.expect_workers, "master control endpoint bound");

        Ok(Self {
            config,
            options,
            listener,
            membership: Arc::new(Mutex::new(MembershipState::default())),
        })
    }

    /// Actual bound address (useful when binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait for the worker quorum, run the distributed test, return the
    /// union of all worker contributions
    pub async fn run(self) -> Result<StatsSnapshot> {
        let membership = Arc::clone(&self.membership);
        let accept_handle = tokio::spawn(accept_loop(self.listener, Arc::clone(&membership)));

        // Block the run until the configured worker count has attached.
        let attach_deadline = tokio::time::Instant::now() + self.options.attach_timeout;
        loop {
            let attached = membership.lock().expect("membership lock poisoned").workers.len();
            if attached >= self.options.expect_workers {
                break;
            }
            if tokio::time::Instant::now() >= attach_deadline {
                accept_handle.abort();
                return Err(AppError::coordination(format!(
                    "only {}/{} workers attached within {:.0}s",
                    attached,
                    self.options.expect_workers,
                    self.options.attach_timeout.as_secs_f64()
                )));
            }
            info!(
                attached,
                expected = self.options.expect_workers,
                "waiting for workers to attach"
            );
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        info!(
            workers = self.options.expect_workers,
            "worker quorum reached, broadcasting start"
        );
        {
            let mut state = membership.lock().expect("membership lock poisoned");
            state.run_config = Some(self.config.clone());
            for entry in state.workers.values() {
                let _ = entry.tx.send(ControlMessage::Start {
                    config: self.config.clone(),
                });
            }
        }

        // Wait until every known worker is done or gone. Disconnected
        // workers do not block reporting; their last snapshot stands.
        let grace = drain_grace(
            self.config.op_timeout(),
            self.config.retry_count,
            self.config.retry_wait(),
            self.config.wait_bounds().1,
        );
        let run_deadline = tokio::time::Instant::now() + self.config.duration() + grace;
        loop {
            {
                let state = membership.lock().expect("membership lock poisoned");
                if state
                    .workers
                    .values()
                    .all(|worker| worker.done || !worker.connected)
                {
                    break;
                }
            }
            if tokio::time::Instant::now() >= run_deadline {
                warn!("run deadline passed with workers still active, reporting last-known state");
                break;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        accept_handle.abort();

        let state = membership.lock().expect("membership lock poisoned");
        let snapshots: Vec<&StatsSnapshot> = state
            .workers
            .values()
            .filter_map(|worker| worker.snapshot.as_ref())
            .collect();
        let union = StatsSnapshot::union(snapshots);

        info!(
            workers = state.workers.len(),
            requests = union.total_requests(),
            failures = union.total_failures(),
            "distributed run complete"
        );
        Ok(union)
    }
}

/// Accept incoming worker connections for the lifetime of the run
async fn accept_loop(listener: TcpListener, membership: Membership) {
    loop {
        match listener.accept().await {
            Ok((socket, addr)) => {
                tokio::spawn(handle_worker(socket, addr, Arc::clone(&membership)));
            }
            Err(e) => {
                warn!(error = %e, "failed to accept worker connection");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

/// Per-connection handler: attach handshake, then report/done stream
async fn handle_worker(socket: TcpStream, addr: SocketAddr, membership: Membership) {
    let (read_half, mut write_half) = socket.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let worker_id = match protocol::read_message(&mut lines).await {
        Ok(Some(ControlMessage::Attach { worker_id })) => worker_id,
        Ok(other) => {
            warn!(%addr, ?other, "connection did not open with an attach message");
            return;
        }
        Err(e) => {
            warn!(%addr, error = %e, "failed to read attach message");
            return;
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<ControlMessage>();
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if protocol::send_message(&mut write_half, &message).await.is_err() {
                break;
            }
        }
    });

    {
        let mut state = membership.lock().expect("membership lock poisoned");
        // Workers attaching after the start broadcast join the running test.
        if let Some(config) = state.run_config.clone() {
            let _ = tx.send(ControlMessage::Start { config });
        }
        state.workers.insert(
            worker_id,
            WorkerEntry {
                tx,
                snapshot: None,
                done: false,
                connected: true,
            },
        );
    }
    info!(%worker_id, %addr, "worker attached");

    loop {
        match protocol::read_message(&mut lines).await {
            Ok(Some(ControlMessage::Report { worker_id: id, snapshot })) => {
                let mut state = membership.lock().expect("membership lock poisoned");
                if let Some(entry) = state.workers.get_mut(&id) {
                    entry.snapshot = Some(snapshot);
                }
            }
            Ok(Some(ControlMessage::Done { worker_id: id })) => {
                let mut state = membership.lock().expect("membership lock poisoned");
                if let Some(entry) = state.workers.get_mut(&id) {
                    entry.done = true;
                }
                info!(worker_id = %id, "worker reported done");
            }
            Ok(Some(other)) => {
                warn!(%worker_id, ?other, "unexpected message from worker");
            }
            Ok(None) => break,
            Err(e) => {
                warn!(%worker_id, error = %e, "failed to read worker message");
                break;
            }
        }
    }

    let mut state = membership.lock().expect("membership lock poisoned");
    if let Some(entry) = state.workers.get_mut(&worker_id) {
        entry.connected = false;
    }
    info!(%worker_id, "worker disconnected");
}
