//! Master/worker coordination tests with scripted workers
//!
//! These drive the master's control endpoint directly over TCP; no cache
//! backend is involved because the master never touches one.

use cache_load_tester::{
    distributed::{protocol, ControlMessage, Master, MasterOptions},
    models::{OpCategory, OperationOutcome},
    stats::StatsAggregator,
    Config,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use uuid::Uuid;

fn run_config() -> Config {
    let mut config = Config::default();
    config.duration_secs = 1;
    config.retry_wait_secs = 0.0;
    config.wait_min_secs = 0.0;
    config.wait_max_secs = 0.0;
    config.op_timeout_secs = 1;
    config
}

fn master_options(expect_workers: usize, attach_timeout: Duration) -> MasterOptions {
    MasterOptions {
        bind_addr: "127.0.0.1:0".to_string(),
        expect_workers,
        attach_timeout,
    }
}

/// Scripted worker: attach, wait for start, report `requests` outcomes, done
async fn scripted_worker(addr: std::net::SocketAddr, requests: u64) -> Config {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let worker_id = Uuid::new_v4();
    protocol::send_message(&mut write_half, &ControlMessage::Attach { worker_id })
        .await
        .unwrap();

    let config = loop {
        match protocol::read_message(&mut lines).await.unwrap() {
            Some(ControlMessage::Start { config }) => break config,
            Some(_) => continue,
            None => panic!("master closed the connection before start"),
        }
    };

    let stats = StatsAggregator::new();
    for _ in 0..requests {
        stats.record(&OperationOutcome::success(
            OpCategory::GetHit,
            Duration::from_millis(2),
        ));
    }

    protocol::send_message(
        &mut write_half,
        &ControlMessage::Report {
            worker_id,
            snapshot: stats.snapshot(),
        },
    )
    .await
    .unwrap();
    protocol::send_message(&mut write_half, &ControlMessage::Done { worker_id })
        .await
        .unwrap();

    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn master_waits_for_quorum_and_unions_reports() {
    let master = Master::bind(run_config(), master_options(2, Duration::from_secs(5)))
        .await
        .unwrap();
    let addr = master.local_addr().unwrap();

    let master_handle = tokio::spawn(master.run());
    let worker_a = tokio::spawn(scripted_worker(addr, 100));
    let worker_b = tokio::spawn(scripted_worker(addr, 250));

    let config_a = worker_a.await.unwrap();
    let config_b = worker_b.await.unwrap();
    let union = master_handle.await.unwrap().unwrap();

    // Both workers received the same run configuration.
    assert_eq!(config_a, run_config());
    assert_eq!(config_b, run_config());

    let get_hit = union.get("get_hit").expect("union contains reports");
    assert_eq!(get_hit.count, 350);
    assert_eq!(union.total_failures(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn master_aborts_when_quorum_is_never_reached() {
    let master = Master::bind(run_config(), master_options(3, Duration::from_secs(1)))
        .await
        .unwrap();

    let error = master.run().await.unwrap_err();
    assert_eq!(error.category(), "COORDINATION");
    assert!(error.to_string().contains("0/3"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn disconnected_worker_keeps_last_known_contribution() {
    let master = Master::bind(run_config(), master_options(1, Duration::from_secs(5)))
        .await
        .unwrap();
    let addr = master.local_addr().unwrap();
    let master_handle = tokio::spawn(master.run());

    // Worker reports once, then vanishes without a done message.
    {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        let worker_id = Uuid::new_v4();
        protocol::send_message(&mut write_half, &ControlMessage::Attach { worker_id })
            .await
            .unwrap();

        loop {
            match protocol::read_message(&mut lines).await.unwrap() {
                Some(ControlMessage::Start { .. }) => break,
                Some(_) => continue,
                None => panic!("master closed the connection before start"),
            }
        }

        let stats = StatsAggregator::new();
        stats.record(&OperationOutcome::success(
            OpCategory::SetMiss,
            Duration::from_millis(5),
        ));
        protocol::send_message(
            &mut write_half,
            &ControlMessage::Report {
                worker_id,
                snapshot: stats.snapshot(),
            },
        )
        .await
        .unwrap();
        // Dropping both halves closes the connection abruptly.
    }

    let union = master_handle.await.unwrap().unwrap();
    assert_eq!(union.get("set_miss").unwrap().count, 1);
}
