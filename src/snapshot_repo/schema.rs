// Sink table names and DDL. Append-only; every row carries (snapshot_id, ts).

pub const BASIC_STATS: &str = "network_basic_stats";
pub const IP_STATS: &str = "network_ip_stats";
pub const TOP_SOURCE_IPS: &str = "network_top_source_ips";
pub const PORT_STATS: &str = "network_port_stats";
pub const TOP_DESTINATION_PORTS: &str = "network_top_destination_ports";
pub const PROTOCOL_STATS: &str = "network_protocol_stats";
pub const TCP_FLAG_STATS: &str = "network_tcp_flag_stats";
pub const PROTOCOL_BUCKETS: &str = "network_protocol_buckets";
pub const TCP_FLAG_BUCKETS: &str = "network_tcp_flag_buckets";
pub const SERVICE_BUCKETS: &str = "network_service_buckets";
pub const APPLICATION_STATS: &str = "network_application_stats";
pub const MAC_STATS: &str = "network_mac_stats";
pub const TOP_SOURCE_MACS: &str = "network_top_source_macs";

pub(super) const TABLES: &[(&str, &str)] = &[
    (
        BASIC_STATS,
        "total_packets BIGINT NOT NULL,
         total_bytes BIGINT NOT NULL,
         window_start BIGINT NOT NULL,
         window_end BIGINT NOT NULL,
         window_size_seconds INTEGER NOT NULL",
    ),
    (IP_STATS, "unique_source_count BIGINT NOT NULL"),
    (
        TOP_SOURCE_IPS,
        "source_ip VARCHAR(64) NOT NULL,
         pos_rank INTEGER NOT NULL,
         packet_count BIGINT NOT NULL",
    ),
    (PORT_STATS, "unique_dest_count BIGINT NOT NULL"),
    (
        TOP_DESTINATION_PORTS,
        "port INTEGER NOT NULL,
         service_name VARCHAR(32) NOT NULL,
         pos_rank INTEGER NOT NULL,
         packet_count BIGINT NOT NULL",
    ),
    (
        PROTOCOL_STATS,
        "protocol INTEGER NOT NULL,
         protocol_name VARCHAR(32) NOT NULL,
         packet_count BIGINT NOT NULL,
         percentage DOUBLE NOT NULL",
    ),
    (
        TCP_FLAG_STATS,
        "flag INTEGER NOT NULL,
         flag_name VARCHAR(32) NOT NULL,
         packet_count BIGINT NOT NULL,
         percentage DOUBLE NOT NULL",
    ),
    (
        PROTOCOL_BUCKETS,
        "tcp_count BIGINT NOT NULL,
         udp_count BIGINT NOT NULL,
         icmp_count BIGINT NOT NULL,
         igmp_count BIGINT NOT NULL,
         other_count BIGINT NOT NULL,
         total_packet_count BIGINT NOT NULL",
    ),
    (
        TCP_FLAG_BUCKETS,
        "syn_count BIGINT NOT NULL,
         syn_ack_count BIGINT NOT NULL,
         ack_count BIGINT NOT NULL,
         psh_ack_count BIGINT NOT NULL,
         fin_count BIGINT NOT NULL,
         rst_count BIGINT NOT NULL,
         other_count BIGINT NOT NULL,
         total_packet_count BIGINT NOT NULL",
    ),
    (
        SERVICE_BUCKETS,
        "http_count BIGINT NOT NULL,
         https_count BIGINT NOT NULL,
         ssh_count BIGINT NOT NULL,
         dns_count BIGINT NOT NULL,
         smtp_count BIGINT NOT NULL,
         ftp_count BIGINT NOT NULL,
         mysql_count BIGINT NOT NULL,
         ntp_count BIGINT NOT NULL,
         telnet_count BIGINT NOT NULL,
         rdp_count BIGINT NOT NULL,
         unknown_count BIGINT NOT NULL,
         other_count BIGINT NOT NULL,
         total_packet_count BIGINT NOT NULL",
    ),
    (
        APPLICATION_STATS,
        "application VARCHAR(64) NOT NULL,
         packet_count BIGINT NOT NULL,
         percentage DOUBLE NOT NULL",
    ),
    (MAC_STATS, "unique_source_count BIGINT NOT NULL"),
    (
        TOP_SOURCE_MACS,
        "source_mac VARCHAR(32) NOT NULL,
         pos_rank INTEGER NOT NULL,
         packet_count BIGINT NOT NULL",
    ),
];

pub(super) fn create_table_sql(table: &str, columns: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
            snapshot_id VARCHAR(64) NOT NULL,
            ts BIGINT NOT NULL,
            {}
        )",
        table, columns
    )
}
