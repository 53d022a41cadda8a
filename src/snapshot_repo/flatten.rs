// Pure projections of a snapshot into the fixed-column pie-chart rows.
// DB access (create, insert) stays in snapshot_repo::mod.

use crate::classify::{FlagBucket, ProtocolBucket, ServiceBucket, port_service_name};
use crate::models::{
    DestinationPortCount, FlagBucketRow, ProtocolBucketRow, ProtocolStats, ServiceBucketRow,
    TcpFlagStats, TopN,
};

/// Sums the full protocol distribution into protocol buckets.
pub fn protocol_buckets(stats: &ProtocolStats) -> ProtocolBucketRow {
    let mut row = ProtocolBucketRow::default();
    for p in &stats.protocols {
        row.add(ProtocolBucket::from_label(&p.name), p.count);
    }
    row
}

/// Sums the full TCP-flag distribution into flag buckets.
pub fn flag_buckets(stats: &TcpFlagStats) -> FlagBucketRow {
    let mut row = FlagBucketRow::default();
    for f in &stats.flags {
        row.add(FlagBucket::from_label(&f.name), f.count);
    }
    row
}

/// Buckets only the Top-N destination ports, not the full port distribution, so the
/// total here is the Top-N sample size rather than the window's packet count.
pub fn service_buckets(top_ports: &TopN<DestinationPortCount>) -> ServiceBucketRow {
    let mut row = ServiceBucketRow::default();
    for (_, p) in top_ports.occupied() {
        row.add(ServiceBucket::from_label(port_service_name(p.port)), p.count);
    }
    row
}
