// Snapshot aggregator: fills one Snapshot from independent per-dimension queries.
// A failed fill leaves its dimension at the zero-value default and the rest still run.

use crate::error::{Dimension, FillError};
use crate::models::{ApplicationStats, MacStats, Snapshot, Window};
use crate::packet_repo::PacketRepo;
use tracing::{debug, warn};

/// Optional dimensions; the five core dimensions are always filled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dimensions {
    pub applications: bool,
    pub mac: bool,
}

/// A filled snapshot plus the fills that failed.
#[derive(Debug)]
pub struct Collected {
    pub snapshot: Snapshot,
    pub failures: Vec<FillError>,
}

/// Runs every fill sequentially against the same `window`.
pub async fn collect_snapshot(repo: &PacketRepo, window: Window, dims: Dimensions) -> Collected {
    let mut snapshot = Snapshot::new(window);
    let mut failures = Vec::new();

    if let Some(basic) = settle(
        repo.basic_stats(window).await,
        Dimension::Basic,
        &mut failures,
    ) {
        snapshot.basic = basic;
    }

    if let Some(ip) = settle(
        repo.source_address_stats(window).await,
        Dimension::SourceAddress,
        &mut failures,
    ) {
        snapshot.ip = ip;
    }

    if let Some(port) = settle(
        repo.destination_port_stats(window).await,
        Dimension::DestinationPort,
        &mut failures,
    ) {
        snapshot.port = port;
    }

    if let Some(protocol) = settle(
        repo.protocol_distribution(window).await,
        Dimension::Protocol,
        &mut failures,
    ) {
        snapshot.protocol = protocol;
    }

    if let Some(tcp_flags) = settle(
        repo.tcp_flag_distribution(window).await,
        Dimension::TcpFlags,
        &mut failures,
    ) {
        snapshot.tcp_flags = tcp_flags;
    }

    if dims.applications {
        let application = settle(
            repo.application_distribution(window).await,
            Dimension::Application,
            &mut failures,
        );
        snapshot.application = Some(application.unwrap_or_else(ApplicationStats::default));
    }

    if dims.mac {
        let mac = settle(repo.mac_stats(window).await, Dimension::Mac, &mut failures);
        snapshot.mac = Some(mac.unwrap_or_else(MacStats::default));
    }

    Collected { snapshot, failures }
}

fn settle<T>(
    result: Result<T, sqlx::Error>,
    dimension: Dimension,
    failures: &mut Vec<FillError>,
) -> Option<T> {
    match result {
        Ok(value) => {
            debug!(dimension = %dimension, "fill complete");
            Some(value)
        }
        Err(source) => {
            warn!(
                dimension = %dimension,
                error = %source,
                "fill failed; dimension left empty"
            );
            failures.push(FillError { dimension, source });
            None
        }
    }
}
