//! CropShield node binary
//!
//! Reads JSON-lines transactions from a file or stdin, applies them through
//! the sequencer and prints one JSON receipt per line.

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cropshield_common::VERSION;
use cropshield_ledger::{feed, sequencer, Ledger, NodeConfig, SnapshotFile};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; receipts go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting CropShield node v{}", VERSION);

    let config = NodeConfig::load()?;
    info!(
        admin = %config.genesis.admin,
        tick = config.ledger.tick,
        queue_depth = config.ledger.queue_depth,
        "configuration loaded"
    );

    let ledger = match config.storage.snapshot_path.as_deref() {
        Some(path) if path.exists() => {
            let file = SnapshotFile::load(path)?;
            info!(path = %path.display(), state_root = %file.state_root, "restoring from snapshot");
            Ledger::restore(file.snapshot)?
        }
        _ => Ledger::from_genesis(&config.genesis, config.ledger.genesis_time)?,
    }
    .with_tick(config.ledger.tick);

    let (handle, task) = sequencer::spawn(ledger, config.ledger.queue_depth);
    let shared = handle.ledger();
    let mut stdout = tokio::io::stdout();

    let processed = match config.input.transactions_path.as_deref() {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            feed(BufReader::new(file), &mut stdout, handle, shutdown_signal()).await
        }
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            feed(stdin, &mut stdout, handle, shutdown_signal()).await
        }
    };

    task.await.context("sequencer task failed")?;

    let ledger = shared.read().clone();
    info!(
        processed,
        height = ledger.height(),
        clock = ledger.clock(),
        state_root = %ledger.state_root()?,
        "CropShield node stopped"
    );

    if let Some(path) = config.storage.snapshot_path.as_deref() {
        SnapshotFile::new(ledger.snapshot())?
            .save(path)
            .with_context(|| format!("saving snapshot to {}", path.display()))?;
    }
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await
        }
    }
}
