//! Cache Load Tester - Main CLI Application
//!
//! Drives GET/SET traffic against a clustered key-value cache with a
//! target hit ratio, and reports latency/throughput statistics.

use cache_load_tester::{
    cli::{Cli, Command, InitArgs, LoadtestArgs, MasterArgs, WorkerArgs},
    client::RedisClusterCache,
    config::{load_config, load_init_config},
    distributed::{worker, Master, MasterOptions},
    error::{AppError, Result},
    logging,
    output::{self, ReportFormatter},
    stats::{StatsAggregator, StatsSnapshot},
    warmup::warm_cache,
    workload::LoadController,
    PKG_NAME, VERSION,
};
use clap::Parser;
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    // Parse command line arguments
    let cli = Cli::parse();
    let use_color = cli.use_colors();

    if !use_color {
        colored::control::set_override(false);
    }

    logging::init(cli.debug);

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        println!("{} v{}", PKG_NAME, VERSION);
        println!("Debug mode enabled");
        println!();
    }

    match cli.command.clone() {
        Command::Loadtest(args) => run_loadtest(&cli, args).await,
        Command::Master(args) => run_master(&cli, args).await,
        Command::Worker(args) => run_worker(&cli, args).await,
        Command::Init(args) => run_init(&cli, args).await,
    }
}

/// Local load test: one process runs the whole engine
async fn run_loadtest(cli: &Cli, args: LoadtestArgs) -> Result<()> {
    let config = load_config(&args)?;

    if cli.debug {
        println!("Configuration loaded successfully:");
        println!("  Target: {}", config.endpoint());
        println!("  Hit rate: {}", config.hit_rate);
        println!("  Users: {} (spawn rate {}/s)", config.users, config.spawn_rate);
        println!("  Duration: {}s", config.duration_secs);
        println!("  Value size: {} KB, TTL: {}s", config.value_size_kb, config.ttl_secs);
        println!("  Retries: {} attempts, {}s apart", config.retry_count, config.retry_wait_secs);
        println!();
    }

    let client = Arc::new(RedisClusterCache::connect(&config).await?);
    let stats = Arc::new(StatsAggregator::new());
    let controller = LoadController::new(config, client, stats);

    let snapshot = controller.run().await?;
    present_results(cli, &snapshot, args.csv.as_deref())
}

/// Distributed master: coordinate workers, report the union
async fn run_master(cli: &Cli, args: MasterArgs) -> Result<()> {
    if args.expect_workers == 0 {
        return Err(AppError::validation("--expect-workers must be at least 1"));
    }

    let config = load_config(&args.loadtest)?;
    let options = MasterOptions {
        bind_addr: format!("{}:{}", args.bind_host, args.bind_port),
        expect_workers: args.expect_workers,
        attach_timeout: Duration::from_secs(args.attach_timeout),
    };

    let master = Master::bind(config, options).await?;
    let snapshot = master.run().await?;
    present_results(cli, &snapshot, args.loadtest.csv.as_deref())
}

/// Distributed worker: execute the configuration the master hands out
async fn run_worker(cli: &Cli, args: WorkerArgs) -> Result<()> {
    let master_addr = format!("{}:{}", args.master_host, args.master_port);
    let snapshot = worker::run(&master_addr).await?;

    if cli.verbose {
        let formatter = ReportFormatter::new(cli.use_colors());
        println!();
        println!("Local contribution (the master owns the combined report):");
        println!("{}", formatter.format_report(&snapshot));
    }

    Ok(())
}

/// Pre-populate mode: idempotent warm-up of the hot keyspace
async fn run_init(cli: &Cli, args: InitArgs) -> Result<()> {
    let config = load_init_config(&args)?;
    let client = RedisClusterCache::connect(&config).await?;

    let summary = warm_cache(&client, args.keys, config.value_size_kb, config.ttl()).await?;

    println!(
        "Pre-populated {} keys: {} written, {} already present",
        args.keys, summary.written, summary.skipped
    );

    if cli.verbose {
        println!(
            "Value size: {} KB, TTL: {}s, target: {}",
            config.value_size_kb,
            config.ttl_secs,
            config.endpoint()
        );
    }

    Ok(())
}

/// Print the final report and optionally export it as CSV
fn present_results(cli: &Cli, snapshot: &StatsSnapshot, csv: Option<&std::path::Path>) -> Result<()> {
    let formatter = ReportFormatter::new(cli.use_colors());
    println!();
    println!("{}", formatter.format_report(snapshot));

    if cli.verbose {
        let overall_rate: f64 = snapshot.entries.iter().map(|entry| entry.rate).sum();
        println!("Categories: {}", snapshot.entries.len());
        println!("Overall throughput: {:.2} req/s", overall_rate);
    }

    if let Some(path) = csv {
        output::write_csv(snapshot, path)?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Hit rate must be between 0.0 and 1.0");
            eprintln!("  - Duration, users and spawn rate must be positive");
            eprintln!("  - Check your .env file for overriding values");
        }
        AppError::Connection(_) => {
            eprintln!();
            eprintln!("Connection troubleshooting:");
            eprintln!("  - Verify the cluster is reachable at the configured host/port");
            eprintln!("  - Check the --tls flag matches the server configuration");
            eprintln!("  - Increase --query-timeout for slow networks");
        }
        AppError::Coordination(_) => {
            eprintln!();
            eprintln!("Distributed mode troubleshooting:");
            eprintln!("  - Ensure the master is running and reachable from every worker");
            eprintln!("  - Check --expect-workers matches the number of started workers");
            eprintln!("  - Raise --attach-timeout if workers start slowly");
        }
        _ => {}
    }
}
