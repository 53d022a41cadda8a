// Snapshot: one cycle's statistics, one sub-record per dimension.

use serde::Serialize;

use super::top_n::{Ranked, TopN};

const MS_PER_SECOND: i64 = 1000;

/// Observation window in epoch milliseconds, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Window {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Window {
    /// The `window_secs` ending at `end_ms`.
    pub fn trailing(end_ms: i64, window_secs: u64) -> Self {
        Self {
            start_ms: end_ms.saturating_sub(
                i64::try_from(window_secs)
                    .unwrap_or(i64::MAX)
                    .saturating_mul(MS_PER_SECOND),
            ),
            end_ms,
        }
    }

    pub fn ending_now(window_secs: u64) -> Self {
        Self::trailing(chrono::Utc::now().timestamp_millis(), window_secs)
    }

    pub fn size_seconds(&self) -> i64 {
        (self.end_ms - self.start_ms) / MS_PER_SECOND
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BasicStats {
    pub window: Window,
    pub total_packets: u64,
    pub total_bytes: u64,
}

impl BasicStats {
    /// Zero counts over `window`; used when no rollup row exists yet.
    pub fn empty(window: Window) -> Self {
        Self {
            window,
            total_packets: 0,
            total_bytes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SourceAddressCount {
    pub address: String,
    pub count: u64,
}

impl Ranked for SourceAddressCount {
    fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IpStats {
    pub unique_source_count: u64,
    pub top_sources: TopN<SourceAddressCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DestinationPortCount {
    pub port: u16,
    pub count: u64,
}

impl Ranked for DestinationPortCount {
    fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PortStats {
    pub unique_dest_count: u64,
    pub top_ports: TopN<DestinationPortCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MacAddressCount {
    pub address: String,
    pub count: u64,
}

impl Ranked for MacAddressCount {
    fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MacStats {
    pub unique_source_count: u64,
    pub top_sources: TopN<MacAddressCount>,
}

/// One protocol in the distribution; `percentage` is against the window total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolCount {
    pub protocol: u8,
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProtocolStats {
    pub protocols: Vec<ProtocolCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TcpFlagCount {
    pub flags: u8,
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TcpFlagStats {
    pub flags: Vec<TcpFlagCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationCount {
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ApplicationStats {
    pub apps: Vec<ApplicationCount>,
}

/// Created empty at tick start, filled per dimension, written once, dropped.
/// Optional dimensions are `None` when not collected this cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub created_at: i64,
    pub window: Window,
    pub basic: BasicStats,
    pub ip: IpStats,
    pub port: PortStats,
    pub protocol: ProtocolStats,
    pub tcp_flags: TcpFlagStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<MacStats>,
}

impl Snapshot {
    pub fn new(window: Window) -> Self {
        Self {
            created_at: chrono::Utc::now().timestamp_millis(),
            window,
            basic: BasicStats::empty(window),
            ip: IpStats::default(),
            port: PortStats::default(),
            protocol: ProtocolStats::default(),
            tcp_flags: TcpFlagStats::default(),
            application: None,
            mac: None,
        }
    }
}
