// Background worker: one aggregate-and-write cycle per tick (every interval_secs).
// Cycles never overlap: each cycle runs inside the ticker loop and ticks missed meanwhile
// are skipped, not queued. Shutdown cancels an in-flight cycle; rows it already wrote stay.

use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{self, Collected, Dimensions};
use crate::config::SnapshotConfig;
use crate::error::WriteError;
use crate::models::{Snapshot, Window};
use crate::packet_repo::PacketRepo;
use crate::snapshot_repo::{SavedSnapshot, SnapshotRepo};
use tokio::sync::oneshot;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

/// Config for the snapshot worker.
#[derive(Debug, Clone)]
pub struct SnapshotWorkerConfig {
    pub interval_secs: u64,
    pub window_secs: u64,
    pub dimensions: Dimensions,
    /// Log each snapshot as indented JSON after it is saved.
    pub verbose: bool,
    pub cycle_timeout_secs: Option<u64>,
    /// How often to log cycle counters at INFO level.
    pub stats_log_interval_secs: u64,
}

impl From<&SnapshotConfig> for SnapshotWorkerConfig {
    fn from(config: &SnapshotConfig) -> Self {
        Self {
            interval_secs: config.interval_secs,
            window_secs: config.window_secs,
            dimensions: Dimensions {
                applications: config.collect_applications,
                mac: config.collect_mac,
            },
            verbose: config.verbose,
            cycle_timeout_secs: config.cycle_timeout_secs,
            stats_log_interval_secs: config.stats_log_interval_secs,
        }
    }
}

/// Result of one completed cycle.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub saved: SavedSnapshot,
    pub fill_failures: usize,
    pub total_packets: u64,
    pub total_bytes: u64,
}

/// Spawns the snapshot worker. The first cycle runs immediately.
pub fn spawn(
    packets: Arc<PacketRepo>,
    snapshots: Arc<SnapshotRepo>,
    config: SnapshotWorkerConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(packets, snapshots, config, shutdown_rx).await;
    })
}

#[instrument(skip_all, fields(interval_secs = config.interval_secs))]
async fn run(
    packets: Arc<PacketRepo>,
    snapshots: Arc<SnapshotRepo>,
    config: SnapshotWorkerConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut tick = interval(Duration::from_secs(config.interval_secs));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
    stats_log_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut cycles_total: u64 = 0;
    let mut cycles_failed: u64 = 0;
    let mut fill_failures_total: u64 = 0;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                cycles_total += 1;
                tokio::select! {
                    result = run_cycle(&packets, &snapshots, &config) => match result {
                        Ok(outcome) => fill_failures_total += outcome.fill_failures as u64,
                        Err(e) => {
                            cycles_failed += 1;
                            warn!(error = %e, "snapshot cycle failed");
                        }
                    },
                    _ = &mut shutdown_rx => {
                        warn!("Snapshot worker shutting down mid-cycle; in-flight snapshot abandoned");
                        break;
                    }
                }
            }
            _ = stats_log_tick.tick() => {
                info!(
                    cycles_total,
                    cycles_failed,
                    fill_failures_total,
                    "app stats"
                );
            }
            _ = &mut shutdown_rx => {
                debug!("Snapshot worker shutting down");
                break;
            }
        }
    }
}

async fn run_cycle(
    packets: &PacketRepo,
    snapshots: &SnapshotRepo,
    config: &SnapshotWorkerConfig,
) -> anyhow::Result<TickOutcome> {
    let Some(secs) = config.cycle_timeout_secs else {
        return Ok(run_one_tick(packets, snapshots, config).await?);
    };
    match tokio::time::timeout(
        Duration::from_secs(secs),
        run_one_tick(packets, snapshots, config),
    )
    .await
    {
        Ok(result) => Ok(result?),
        Err(_) => Err(anyhow::anyhow!("cycle exceeded {}s timeout", secs)),
    }
}

/// Runs one cycle: fill a snapshot over the trailing window, then write it.
/// Fill failures are tolerated and counted; a write failure aborts the cycle.
pub async fn run_one_tick(
    packets: &PacketRepo,
    snapshots: &SnapshotRepo,
    config: &SnapshotWorkerConfig,
) -> Result<TickOutcome, WriteError> {
    let window = Window::ending_now(config.window_secs);
    let Collected { snapshot, failures } =
        aggregator::collect_snapshot(packets, window, config.dimensions).await;

    let saved = snapshots.save_snapshot(&snapshot).await?;
    info!(
        snapshot_id = %saved.stamp.id,
        total_packets = snapshot.basic.total_packets,
        total_bytes = snapshot.basic.total_bytes,
        rows_written = saved.rows_written,
        fill_failures = failures.len(),
        "snapshot saved"
    );

    if config.verbose {
        log_snapshot_json(&snapshot);
    }

    Ok(TickOutcome {
        saved,
        fill_failures: failures.len(),
        total_packets: snapshot.basic.total_packets,
        total_bytes: snapshot.basic.total_bytes,
    })
}

/// Serialization failures are logged only; persisted data is unaffected.
fn log_snapshot_json(snapshot: &Snapshot) {
    match serde_json::to_string_pretty(snapshot) {
        Ok(json) => info!("snapshot:\n{}", json),
        Err(e) => warn!(error = %e, "snapshot JSON dump failed"),
    }
}
