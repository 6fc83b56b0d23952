mod args;

use anyhow::{Context, Result};
use args::{Cli, Commands};
use clap::Parser;
use rasteer_api::ApiServer;
use rasteer_core::{Config, Interface};
use rasteer_engine::{BroadcastScheduler, DataLinkSink, RaEngine};
use rasteer_neigh::LinuxNeighborTable;
use rasteer_store::Db;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Interfaces) = &cli.command {
        // No config needed just to enumerate interfaces
        for iface in Interface::list_all()? {
            println!("{iface}");
        }
        return Ok(());
    }

    let mut config = Config::from_file(&cli.config)?;
    if let Some(interface) = cli.interface {
        config.engine.interface = interface;
    }

    init_logging(&config.logging);

    let interface = Interface::by_name(&config.engine.interface)
        .with_context(|| format!("interface {} unusable", config.engine.interface))?;
    let sink = DataLinkSink::open(&interface)
        .context("opening transmit channel (raw sockets need CAP_NET_RAW)")?;

    let db = Db::open(&config.database.path)
        .with_context(|| format!("opening database {}", config.database.path.display()))?;
    info!(path = %config.database.path.display(), "topology store opened");

    let neighbors = Arc::new(LinuxNeighborTable::new(&config.engine.interface));

    let engine = Arc::new(RaEngine::new(
        config.engine.clone(),
        interface.mac_address,
        Arc::new(db.clone()),
        neighbors.clone(),
        Arc::new(sink),
    ));

    if let Some(Commands::Once) = &cli.command {
        let report = engine.run_cycle().await?;
        info!(
            sent = report.sent(),
            skipped = report.skipped(),
            failed = report.failed(),
            "single cycle finished"
        );
        return Ok(());
    }

    info!(
        interface = %config.engine.interface,
        prefix = %config.engine.prefix,
        interval_secs = config.engine.interval_secs,
        "starting rasteer"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = Vec::new();

    // Broadcast scheduler; fires once immediately, then on the interval
    let scheduler = BroadcastScheduler::new(
        engine,
        Duration::from_secs(config.engine.interval_secs),
        Duration::from_secs(config.engine.misfire_grace_secs),
    );
    let (scheduler_handle, scheduler_task) = scheduler.start(shutdown_rx.clone());
    tasks.push(scheduler_task);

    // Control API
    let listen_addr: SocketAddr = config
        .api
        .listen
        .parse()
        .with_context(|| format!("invalid api.listen address {}", config.api.listen))?;
    let api = ApiServer::new(listen_addr, db, scheduler_handle, neighbors);
    let rx = shutdown_rx.clone();
    tasks.push(tokio::spawn(async move {
        if let Err(e) = api.run(rx).await {
            error!("control API error: {e}");
        }
    }));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping services...");
    let _ = shutdown_tx.send(true);

    for task in tasks {
        let _ = task.await;
    }

    info!("rasteer stopped");
    Ok(())
}

fn init_logging(config: &rasteer_core::config::LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .init();
        }
    }
}
