// Domain models: snapshot dimensions, Top-N slots, flattened bucket rows, source rows

mod buckets;
mod packet;
mod snapshot;
mod top_n;

pub use buckets::{FlagBucketRow, ProtocolBucketRow, ServiceBucketRow};
pub use packet::{PacketRecord, RollupRecord};
pub use snapshot::{
    ApplicationCount, ApplicationStats, BasicStats, DestinationPortCount, IpStats,
    MacAddressCount, MacStats, PortStats, ProtocolCount, ProtocolStats, Snapshot,
    SourceAddressCount, TcpFlagCount, TcpFlagStats, Window,
};
pub use top_n::{Ranked, TOP_N, TopN};
