// Source store reads: one query set per snapshot dimension over the raw packet table,
// plus the latest row of the capture side's rollup table.
// Every window predicate is bound (`ts >= ? AND ts <= ?`), so all dimensions of a snapshot
// see the same interval. Time columns are read and bound per the configured TimeFormat.

mod schema;
pub mod time;

use crate::classify::{protocol_name, tcp_flag_name};
use crate::config::{SourceConfig, TimeFormat};
use crate::models::{
    ApplicationCount, ApplicationStats, BasicStats, DestinationPortCount, IpStats,
    MacAddressCount, MacStats, PacketRecord, PortStats, ProtocolCount, ProtocolStats,
    RollupRecord, SourceAddressCount, TOP_N, TcpFlagCount, TcpFlagStats, TopN, Window,
};
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};
use tracing::{debug, instrument};

pub struct PacketRepo {
    pool: AnyPool,
    packet_table: String,
    rollup_table: String,
    time_format: TimeFormat,
}

impl PacketRepo {
    pub fn new(pool: AnyPool, config: &SourceConfig) -> Self {
        Self {
            pool,
            packet_table: config.packet_table.clone(),
            rollup_table: config.rollup_table.clone(),
            time_format: config.time_format,
        }
    }

    /// Create the packet and rollup tables if they don't exist.
    pub async fn init(&self) -> anyhow::Result<()> {
        let time_type = time::column_type(self.time_format);
        sqlx::query(&schema::packet_table_ddl(&self.packet_table, time_type))
            .execute(&self.pool)
            .await?;
        sqlx::query(&schema::rollup_table_ddl(&self.rollup_table, time_type))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_packets(&self, packets: &[PacketRecord]) -> anyhow::Result<()> {
        if packets.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "INSERT INTO {} (ts, packet_size, ether_type, src_mac, dst_mac, protocol, src_ip, dst_ip, src_port, dst_port, tcp_flags, packet_type, application)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULLIF(?, ''))",
            self.packet_table
        );
        let mut tx = self.pool.begin().await?;
        for p in packets {
            time::bind(sqlx::query(&sql), self.time_format, p.ts)
                .bind(p.packet_size as i64)
                .bind(p.ether_type as i64)
                .bind(p.src_mac.as_str())
                .bind(p.dst_mac.as_str())
                .bind(p.protocol as i64)
                .bind(p.src_ip.as_str())
                .bind(p.dst_ip.as_str())
                .bind(p.src_port as i64)
                .bind(p.dst_port as i64)
                .bind(p.tcp_flags as i64)
                .bind(p.packet_type.as_str())
                .bind(p.application.as_deref().unwrap_or(""))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn insert_rollup(&self, rollup: &RollupRecord) -> anyhow::Result<()> {
        let sql = format!(
            "INSERT INTO {} (packets_sum, packet_size_sum, time_window, update_at) VALUES (?, ?, ?, ?)",
            self.rollup_table
        );
        let query = sqlx::query(&sql)
            .bind(rollup.packets_sum as i64)
            .bind(rollup.packet_size_sum as i64);
        let query = time::bind(query, self.time_format, rollup.time_window);
        time::bind(query, self.time_format, rollup.update_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Latest rollup row (by window, then update time). No row yet → zero counts over `window`.
    #[instrument(skip(self))]
    pub async fn basic_stats(&self, window: Window) -> Result<BasicStats, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT packets_sum, packet_size_sum, {} AS window_start_at, {} AS window_end_at
             FROM {} ORDER BY time_window DESC, update_at DESC LIMIT 1",
            time::select_expr(self.time_format, "time_window"),
            time::select_expr(self.time_format, "update_at"),
            self.rollup_table
        ))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!("no rollup row yet; using empty basic stats");
            return Ok(BasicStats::empty(window));
        };
        Ok(BasicStats {
            window: Window {
                start_ms: time::read_ms(&row, self.time_format, "window_start_at")?,
                end_ms: time::read_ms(&row, self.time_format, "window_end_at")?,
            },
            total_packets: column_int(&row, "packets_sum")?,
            total_bytes: column_int(&row, "packet_size_sum")?,
        })
    }

    #[instrument(skip(self))]
    pub async fn source_address_stats(&self, window: Window) -> Result<IpStats, sqlx::Error> {
        let unique_source_count = self.count_distinct("src_ip", window).await?;
        let rows = self.top_rows("src_ip", "''", window).await?;
        let top_sources = TopN::select(
            rows.iter()
                .map(|row| {
                    Ok(SourceAddressCount {
                        address: row.try_get("category")?,
                        count: column_int(row, "packet_count")?,
                    })
                })
                .collect::<Result<Vec<_>, sqlx::Error>>()?,
        );
        Ok(IpStats {
            unique_source_count,
            top_sources,
        })
    }

    #[instrument(skip(self))]
    pub async fn destination_port_stats(&self, window: Window) -> Result<PortStats, sqlx::Error> {
        let unique_dest_count = self.count_distinct("dst_port", window).await?;
        let rows = self.top_rows("dst_port", "0", window).await?;
        let top_ports = TopN::select(
            rows.iter()
                .map(|row| {
                    Ok(DestinationPortCount {
                        port: column_int(row, "category")?,
                        count: column_int(row, "packet_count")?,
                    })
                })
                .collect::<Result<Vec<_>, sqlx::Error>>()?,
        );
        Ok(PortStats {
            unique_dest_count,
            top_ports,
        })
    }

    #[instrument(skip(self))]
    pub async fn mac_stats(&self, window: Window) -> Result<MacStats, sqlx::Error> {
        let unique_source_count = self.count_distinct("src_mac", window).await?;
        let rows = self.top_rows("src_mac", "''", window).await?;
        let top_sources = TopN::select(
            rows.iter()
                .map(|row| {
                    Ok(MacAddressCount {
                        address: row.try_get("category")?,
                        count: column_int(row, "packet_count")?,
                    })
                })
                .collect::<Result<Vec<_>, sqlx::Error>>()?,
        );
        Ok(MacStats {
            unique_source_count,
            top_sources,
        })
    }

    #[instrument(skip(self))]
    pub async fn protocol_distribution(
        &self,
        window: Window,
    ) -> Result<ProtocolStats, sqlx::Error> {
        let rows = self.distribution_rows("protocol", "0", window).await?;
        let mut protocols = Vec::with_capacity(rows.len());
        for row in &rows {
            let protocol: u8 = column_int(row, "category")?;
            protocols.push(ProtocolCount {
                protocol,
                name: protocol_name(protocol),
                count: column_int(row, "packet_count")?,
                percentage: row.try_get("percentage")?,
            });
        }
        Ok(ProtocolStats { protocols })
    }

    #[instrument(skip(self))]
    pub async fn tcp_flag_distribution(
        &self,
        window: Window,
    ) -> Result<TcpFlagStats, sqlx::Error> {
        let rows = self.distribution_rows("tcp_flags", "0", window).await?;
        let mut flags = Vec::with_capacity(rows.len());
        for row in &rows {
            let value: u8 = column_int(row, "category")?;
            flags.push(TcpFlagCount {
                flags: value,
                name: tcp_flag_name(value).to_string(),
                count: column_int(row, "packet_count")?,
                percentage: row.try_get("percentage")?,
            });
        }
        Ok(TcpFlagStats { flags })
    }

    /// Application labels; NULL labels are reported as `unknown`.
    #[instrument(skip(self))]
    pub async fn application_distribution(
        &self,
        window: Window,
    ) -> Result<ApplicationStats, sqlx::Error> {
        let rows = self
            .distribution_rows("application", "'unknown'", window)
            .await?;
        let mut apps = Vec::with_capacity(rows.len());
        for row in &rows {
            apps.push(ApplicationCount {
                name: row.try_get("category")?,
                count: column_int(row, "packet_count")?,
                percentage: row.try_get("percentage")?,
            });
        }
        Ok(ApplicationStats { apps })
    }

    async fn count_distinct(&self, column: &str, window: Window) -> Result<u64, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(DISTINCT {}) AS unique_count FROM {} WHERE ts >= ? AND ts <= ?",
            column, self.packet_table
        );
        let row = time::bind_window(sqlx::query(&sql), self.time_format, window)
            .fetch_one(&self.pool)
            .await?;
        column_int(&row, "unique_count")
    }

    /// `GROUP BY column ORDER BY count DESC LIMIT 5`; NULL keys read back as `null_as`.
    async fn top_rows(
        &self,
        column: &str,
        null_as: &str,
        window: Window,
    ) -> Result<Vec<AnyRow>, sqlx::Error> {
        let sql = format!(
            "SELECT IFNULL({col}, {null_as}) AS category, COUNT(*) AS packet_count
             FROM {table}
             WHERE ts >= ? AND ts <= ?
             GROUP BY {col}
             ORDER BY packet_count DESC
             LIMIT ?",
            col = column,
            null_as = null_as,
            table = self.packet_table
        );
        time::bind_window(sqlx::query(&sql), self.time_format, window)
            .bind(TOP_N as i64)
            .fetch_all(&self.pool)
            .await
    }

    /// Per-category count and percentage of the window total, all categories, count descending.
    async fn distribution_rows(
        &self,
        column: &str,
        null_as: &str,
        window: Window,
    ) -> Result<Vec<AnyRow>, sqlx::Error> {
        let sql = format!(
            "SELECT IFNULL({col}, {null_as}) AS category,
                    COUNT(*) AS packet_count,
                    CAST(COUNT(*) * 100.0 / (
                        SELECT COUNT(*) FROM {table} WHERE ts >= ? AND ts <= ?
                    ) AS DOUBLE) AS percentage
             FROM {table}
             WHERE ts >= ? AND ts <= ?
             GROUP BY {col}
             ORDER BY packet_count DESC",
            col = column,
            null_as = null_as,
            table = self.packet_table
        );
        let query = time::bind_window(sqlx::query(&sql), self.time_format, window);
        time::bind_window(query, self.time_format, window)
            .fetch_all(&self.pool)
            .await
    }
}

/// Reads an integer column and narrows it, reporting out-of-range values as decode errors.
fn column_int<T>(row: &AnyRow, column: &str) -> Result<T, sqlx::Error>
where
    T: TryFrom<i64>,
    <T as TryFrom<i64>>::Error: std::error::Error + Send + Sync + 'static,
{
    let raw: i64 = row.try_get(column)?;
    T::try_from(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
