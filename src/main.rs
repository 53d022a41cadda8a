use anyhow::Result;
use snapflow::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(
        "{} {} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    // Startup failures (config, connect, schema) are fatal before the first cycle.
    let app_config = config::AppConfig::load()?;
    let pool = db::connect(&app_config.database).await?;

    let packet_repo = Arc::new(packet_repo::PacketRepo::new(
        pool.clone(),
        &app_config.source,
    ));
    if app_config.source.init_schema {
        packet_repo.init().await?;
    }
    let snapshot_repo = Arc::new(snapshot_repo::SnapshotRepo::new(pool.clone()));
    snapshot_repo.init().await?;
    tracing::info!("sink tables ready");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = snapshot_worker::spawn(
        packet_repo,
        snapshot_repo,
        snapshot_worker::SnapshotWorkerConfig::from(&app_config.snapshot),
        shutdown_rx,
    );
    tracing::info!(
        interval_secs = app_config.snapshot.interval_secs,
        window_secs = app_config.snapshot.window_secs,
        "snapshot collection started"
    );

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;
    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
