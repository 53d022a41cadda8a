// Source table DDL. Portable between MySQL and SQLite; time columns follow the TimeFormat.

pub(super) fn packet_table_ddl(table: &str, time_type: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            ts {time_type} NOT NULL,
            packet_size INTEGER NOT NULL,
            ether_type INTEGER NOT NULL,
            src_mac VARCHAR(32),
            dst_mac VARCHAR(32),
            protocol INTEGER NOT NULL,
            src_ip VARCHAR(64),
            dst_ip VARCHAR(64),
            src_port INTEGER,
            dst_port INTEGER,
            tcp_flags INTEGER,
            packet_type VARCHAR(32),
            application VARCHAR(64)
        )
        "#
    )
}

pub(super) fn rollup_table_ddl(table: &str, time_type: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            packets_sum BIGINT NOT NULL,
            packet_size_sum BIGINT NOT NULL,
            time_window {time_type} NOT NULL,
            update_at {time_type} NOT NULL
        )
        "#
    )
}
