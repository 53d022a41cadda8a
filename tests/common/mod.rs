// Shared test helpers: temp SQLite store behind the Any pool, packet builders
#![allow(dead_code)]

use snapflow::config::SourceConfig;
use snapflow::models::PacketRecord;
use snapflow::packet_repo::PacketRepo;
use snapflow::snapshot_repo::SnapshotRepo;
use sqlx::AnyPool;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestStore {
    /// Keeps the database file alive for the test.
    pub dir: TempDir,
    pub pool: AnyPool,
    pub packets: PacketRepo,
    pub snapshots: SnapshotRepo,
}

pub async fn test_store() -> TestStore {
    test_store_with(SourceConfig::default()).await
}

pub async fn test_store_with(source: SourceConfig) -> TestStore {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapflow.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let pool = snapflow::db::connect_url(&url, 2, Duration::from_secs(300), Duration::from_secs(60))
        .await
        .unwrap();
    let packets = PacketRepo::new(pool.clone(), &source);
    packets.init().await.unwrap();
    let snapshots = SnapshotRepo::new(pool.clone());
    snapshots.init().await.unwrap();
    TestStore {
        dir,
        pool,
        packets,
        snapshots,
    }
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn packet(ts: i64, src_ip: &str, dst_port: u16, protocol: u8, tcp_flags: u8) -> PacketRecord {
    PacketRecord {
        ts,
        packet_size: 100,
        ether_type: 0x0800,
        src_mac: "aa:bb:cc:dd:ee:01".into(),
        dst_mac: "aa:bb:cc:dd:ee:02".into(),
        protocol,
        src_ip: src_ip.into(),
        dst_ip: "10.0.0.1".into(),
        src_port: 40000,
        dst_port,
        tcp_flags,
        packet_type: "IPv4".into(),
        application: None,
    }
}

/// `n` copies of the same packet.
pub fn repeat(n: usize, p: PacketRecord) -> Vec<PacketRecord> {
    vec![p; n]
}

pub async fn count_rows(pool: &AnyPool, table: &str, snapshot_id: &str) -> i64 {
    sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE snapshot_id = ?",
        table
    ))
    .bind(snapshot_id.to_string())
    .fetch_one(pool)
    .await
    .unwrap()
}
