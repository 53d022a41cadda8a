// Upstream source rows: raw per-packet events and the pre-aggregated rollup.

/// One captured packet; `ts` is epoch ms here and stored per the source `TimeFormat`.
#[derive(Debug, Clone, Default)]
pub struct PacketRecord {
    pub ts: i64,
    pub packet_size: u16,
    pub ether_type: u16,
    pub src_mac: String,
    pub dst_mac: String,
    pub protocol: u8,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub tcp_flags: u8,
    pub packet_type: String,
    pub application: Option<String>,
}

/// One rollup row maintained by the capture side.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollupRecord {
    pub packets_sum: u64,
    pub packet_size_sum: u64,
    pub time_window: i64,
    pub update_at: i64,
}
