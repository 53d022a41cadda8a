// Snapshot sink: projects one Snapshot into append-only time-series tables.
//
// Consistency contract: best-effort partial persistence. Sub-tables are written one after
// another with no cross-table transaction. The first failed insert aborts the rest of the
// flush; rows already written for that snapshot_id stay. Readers join on snapshot_id and
// must tolerate missing sub-tables (a failed fill leaves a dimension empty anyway).

pub mod flatten;
pub mod schema;

use crate::classify::port_service_name;
use crate::error::WriteError;
use crate::models::Snapshot;
use schema::*;
use sqlx::any::AnyArguments;
use sqlx::query::Query;
use sqlx::{Any, AnyPool};
use tracing::{debug, instrument};

/// Identity shared by every row written for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStamp {
    /// `snap_<unix nanos>` at write time.
    pub id: String,
    /// Write time, epoch ms.
    pub ts: i64,
}

impl SnapshotStamp {
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        let nanos = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1000));
        Self {
            id: format!("snap_{}", nanos),
            ts: now.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavedSnapshot {
    pub stamp: SnapshotStamp,
    pub rows_written: usize,
}

pub struct SnapshotRepo {
    pool: AnyPool,
}

impl SnapshotRepo {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    /// Create every sink table if it doesn't exist.
    pub async fn init(&self) -> Result<(), WriteError> {
        for &(table, columns) in TABLES {
            sqlx::query(&create_table_sql(table, columns))
                .execute(&self.pool)
                .await
                .map_err(|source| WriteError::Schema { table, source })?;
        }
        Ok(())
    }

    /// Assigns a fresh identity and write time, then writes every sub-table.
    pub async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<SavedSnapshot, WriteError> {
        self.save_snapshot_as(snapshot, SnapshotStamp::now()).await
    }

    /// Writes in a fixed order: basic, ip, port, protocol, tcp flags, protocol buckets,
    /// flag buckets, service buckets, then the optional application and mac dimensions.
    #[instrument(skip(self, snapshot, stamp), fields(snapshot_id = %stamp.id))]
    pub async fn save_snapshot_as(
        &self,
        snapshot: &Snapshot,
        stamp: SnapshotStamp,
    ) -> Result<SavedSnapshot, WriteError> {
        let mut w = FlushWriter {
            pool: &self.pool,
            stamp: &stamp,
            rows_written: 0,
        };

        let basic = &snapshot.basic;
        w.insert(
            BASIC_STATS,
            "total_packets, total_bytes, window_start, window_end, window_size_seconds",
            "?, ?, ?, ?, ?",
            |q| {
                q.bind(basic.total_packets as i64)
                    .bind(basic.total_bytes as i64)
                    .bind(basic.window.start_ms)
                    .bind(basic.window.end_ms)
                    .bind(basic.window.size_seconds())
            },
        )
        .await?;

        w.insert(IP_STATS, "unique_source_count", "?", |q| {
            q.bind(snapshot.ip.unique_source_count as i64)
        })
        .await?;
        for (rank, slot) in snapshot.ip.top_sources.occupied() {
            w.insert(
                TOP_SOURCE_IPS,
                "source_ip, pos_rank, packet_count",
                "?, ?, ?",
                |q| {
                    q.bind(address_or_unknown(&slot.address))
                        .bind(rank as i64)
                        .bind(slot.count as i64)
                },
            )
            .await?;
        }

        w.insert(PORT_STATS, "unique_dest_count", "?", |q| {
            q.bind(snapshot.port.unique_dest_count as i64)
        })
        .await?;
        for (rank, slot) in snapshot.port.top_ports.occupied() {
            w.insert(
                TOP_DESTINATION_PORTS,
                "port, service_name, pos_rank, packet_count",
                "?, ?, ?, ?",
                |q| {
                    q.bind(slot.port as i64)
                        .bind(port_service_name(slot.port).to_string())
                        .bind(rank as i64)
                        .bind(slot.count as i64)
                },
            )
            .await?;
        }

        for p in &snapshot.protocol.protocols {
            w.insert(
                PROTOCOL_STATS,
                "protocol, protocol_name, packet_count, percentage",
                "?, ?, ?, ?",
                |q| {
                    q.bind(p.protocol as i64)
                        .bind(p.name.clone())
                        .bind(p.count as i64)
                        .bind(p.percentage)
                },
            )
            .await?;
        }

        for f in &snapshot.tcp_flags.flags {
            w.insert(
                TCP_FLAG_STATS,
                "flag, flag_name, packet_count, percentage",
                "?, ?, ?, ?",
                |q| {
                    q.bind(f.flags as i64)
                        .bind(f.name.clone())
                        .bind(f.count as i64)
                        .bind(f.percentage)
                },
            )
            .await?;
        }

        let pb = flatten::protocol_buckets(&snapshot.protocol);
        w.insert(
            PROTOCOL_BUCKETS,
            "tcp_count, udp_count, icmp_count, igmp_count, other_count, total_packet_count",
            "?, ?, ?, ?, ?, ?",
            |q| {
                q.bind(pb.tcp_count as i64)
                    .bind(pb.udp_count as i64)
                    .bind(pb.icmp_count as i64)
                    .bind(pb.igmp_count as i64)
                    .bind(pb.other_count as i64)
                    .bind(pb.total_packet_count as i64)
            },
        )
        .await?;

        let fb = flatten::flag_buckets(&snapshot.tcp_flags);
        w.insert(
            TCP_FLAG_BUCKETS,
            "syn_count, syn_ack_count, ack_count, psh_ack_count, fin_count, rst_count, other_count, total_packet_count",
            "?, ?, ?, ?, ?, ?, ?, ?",
            |q| {
                q.bind(fb.syn_count as i64)
                    .bind(fb.syn_ack_count as i64)
                    .bind(fb.ack_count as i64)
                    .bind(fb.psh_ack_count as i64)
                    .bind(fb.fin_count as i64)
                    .bind(fb.rst_count as i64)
                    .bind(fb.other_count as i64)
                    .bind(fb.total_packet_count as i64)
            },
        )
        .await?;

        let sb = flatten::service_buckets(&snapshot.port.top_ports);
        w.insert(
            SERVICE_BUCKETS,
            "http_count, https_count, ssh_count, dns_count, smtp_count, ftp_count, mysql_count, ntp_count, telnet_count, rdp_count, unknown_count, other_count, total_packet_count",
            "?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?",
            |q| {
                q.bind(sb.http_count as i64)
                    .bind(sb.https_count as i64)
                    .bind(sb.ssh_count as i64)
                    .bind(sb.dns_count as i64)
                    .bind(sb.smtp_count as i64)
                    .bind(sb.ftp_count as i64)
                    .bind(sb.mysql_count as i64)
                    .bind(sb.ntp_count as i64)
                    .bind(sb.telnet_count as i64)
                    .bind(sb.rdp_count as i64)
                    .bind(sb.unknown_count as i64)
                    .bind(sb.other_count as i64)
                    .bind(sb.total_packet_count as i64)
            },
        )
        .await?;

        if let Some(application) = &snapshot.application {
            for a in &application.apps {
                w.insert(
                    APPLICATION_STATS,
                    "application, packet_count, percentage",
                    "?, ?, ?",
                    |q| {
                        q.bind(a.name.clone())
                            .bind(a.count as i64)
                            .bind(a.percentage)
                    },
                )
                .await?;
            }
        }

        if let Some(mac) = &snapshot.mac {
            w.insert(MAC_STATS, "unique_source_count", "?", |q| {
                q.bind(mac.unique_source_count as i64)
            })
            .await?;
            for (rank, slot) in mac.top_sources.occupied() {
                w.insert(
                    TOP_SOURCE_MACS,
                    "source_mac, pos_rank, packet_count",
                    "?, ?, ?",
                    |q| {
                        q.bind(address_or_unknown(&slot.address))
                            .bind(rank as i64)
                            .bind(slot.count as i64)
                    },
                )
                .await?;
            }
        }

        let rows_written = w.rows_written;
        debug!(rows_written, "snapshot written");
        Ok(SavedSnapshot {
            stamp,
            rows_written,
        })
    }
}

/// One flush: every insert is prefixed with the shared (snapshot_id, ts).
struct FlushWriter<'a> {
    pool: &'a AnyPool,
    stamp: &'a SnapshotStamp,
    rows_written: usize,
}

impl FlushWriter<'_> {
    async fn insert<F>(
        &mut self,
        table: &'static str,
        columns: &str,
        placeholders: &str,
        bind: F,
    ) -> Result<(), WriteError>
    where
        F: for<'q> FnOnce(Query<'q, Any, AnyArguments<'q>>) -> Query<'q, Any, AnyArguments<'q>>,
    {
        let sql = format!(
            "INSERT INTO {} (snapshot_id, ts, {}) VALUES (?, ?, {})",
            table, columns, placeholders
        );
        let query = sqlx::query(&sql)
            .bind(self.stamp.id.clone())
            .bind(self.stamp.ts);
        bind(query)
            .execute(self.pool)
            .await
            .map_err(|source| WriteError::Insert { table, source })?;
        self.rows_written += 1;
        Ok(())
    }
}

/// Occupied slots whose key was NULL upstream.
fn address_or_unknown(address: &str) -> String {
    if address.is_empty() {
        "unknown".to_string()
    } else {
        address.to_string()
    }
}
