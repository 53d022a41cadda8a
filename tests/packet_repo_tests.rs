// Source query tests against a temp SQLite store

mod common;

use common::{now_ms, packet, repeat, test_store, test_store_with};
use snapflow::config::{SourceConfig, TimeFormat};
use snapflow::models::{RollupRecord, TOP_N, Window};
use snapflow::packet_repo::time::{datetime_text, parse_datetime_ms};

#[tokio::test]
async fn basic_stats_without_rollup_is_zero_over_window() {
    let store = test_store().await;
    let window = Window::trailing(now_ms(), 60);
    let basic = store.packets.basic_stats(window).await.unwrap();
    assert_eq!(basic.total_packets, 0);
    assert_eq!(basic.total_bytes, 0);
    assert_eq!(basic.window, window);
}

#[tokio::test]
async fn basic_stats_reads_latest_rollup_row() {
    let store = test_store().await;
    let rows = [
        RollupRecord {
            packets_sum: 10,
            packet_size_sum: 1000,
            time_window: 1_000,
            update_at: 2_000,
        },
        RollupRecord {
            packets_sum: 30,
            packet_size_sum: 3000,
            time_window: 5_000,
            update_at: 6_000,
        },
        RollupRecord {
            packets_sum: 42,
            packet_size_sum: 4200,
            time_window: 5_000,
            update_at: 7_000,
        },
    ];
    for r in &rows {
        store.packets.insert_rollup(r).await.unwrap();
    }
    let basic = store
        .packets
        .basic_stats(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    assert_eq!(basic.total_packets, 42);
    assert_eq!(basic.total_bytes, 4200);
    assert_eq!(basic.window.start_ms, 5_000);
    assert_eq!(basic.window.end_ms, 7_000);
}

#[tokio::test]
async fn source_address_top_n_is_ordered_and_padded() {
    let store = test_store().await;
    let ts = now_ms() - 1_000;
    let mut batch = repeat(50, packet(ts, "192.168.1.10", 443, 6, 0x10));
    batch.extend(repeat(30, packet(ts, "192.168.1.11", 443, 6, 0x10)));
    batch.extend(repeat(10, packet(ts, "192.168.1.12", 443, 6, 0x10)));
    store.packets.insert_packets(&batch).await.unwrap();

    let ip = store
        .packets
        .source_address_stats(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    assert_eq!(ip.unique_source_count, 3);
    let slots = ip.top_sources.slots();
    assert_eq!(slots.len(), TOP_N);
    assert_eq!((slots[0].address.as_str(), slots[0].count), ("192.168.1.10", 50));
    assert_eq!((slots[1].address.as_str(), slots[1].count), ("192.168.1.11", 30));
    assert_eq!((slots[2].address.as_str(), slots[2].count), ("192.168.1.12", 10));
    assert_eq!(slots[3].count, 0);
    assert_eq!(slots[4].count, 0);
}

#[tokio::test]
async fn destination_port_stats_counts_distinct_ports() {
    let store = test_store().await;
    let ts = now_ms() - 1_000;
    let mut batch = Vec::new();
    for (i, port) in [22u16, 80, 443, 53, 123, 3306, 8080].iter().enumerate() {
        batch.extend(repeat(10 + i, packet(ts, "10.1.1.1", *port, 6, 0x10)));
    }
    store.packets.insert_packets(&batch).await.unwrap();

    let ports = store
        .packets
        .destination_port_stats(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    assert_eq!(ports.unique_dest_count, 7);
    assert_eq!(ports.top_ports.occupied_count(), TOP_N);
    let top: Vec<u16> = ports.top_ports.slots().iter().map(|p| p.port).collect();
    assert_eq!(top, vec![8080, 3306, 123, 53, 443]);
}

#[tokio::test]
async fn packets_outside_window_are_excluded() {
    let store = test_store().await;
    let now = now_ms();
    let mut batch = repeat(5, packet(now - 1_000, "10.0.0.5", 80, 6, 0x02));
    batch.extend(repeat(7, packet(now - 120_000, "10.0.0.6", 80, 6, 0x02)));
    batch.extend(repeat(3, packet(now + 60_000, "10.0.0.7", 80, 6, 0x02)));
    store.packets.insert_packets(&batch).await.unwrap();

    let window = Window::trailing(now, 60);
    let ip = store.packets.source_address_stats(window).await.unwrap();
    assert_eq!(ip.unique_source_count, 1);
    assert_eq!(ip.top_sources.slots()[0].address, "10.0.0.5");
    assert_eq!(ip.top_sources.slots()[0].count, 5);

    let protocols = store.packets.protocol_distribution(window).await.unwrap();
    assert_eq!(protocols.protocols.len(), 1);
    assert_eq!(protocols.protocols[0].count, 5);
}

#[tokio::test]
async fn window_bounds_are_inclusive() {
    let store = test_store().await;
    let window = Window::trailing(now_ms(), 60);
    let mut batch = vec![packet(window.start_ms, "10.0.0.1", 80, 6, 0x10)];
    batch.push(packet(window.end_ms, "10.0.0.2", 80, 6, 0x10));
    store.packets.insert_packets(&batch).await.unwrap();

    let ip = store.packets.source_address_stats(window).await.unwrap();
    assert_eq!(ip.unique_source_count, 2);
}

#[tokio::test]
async fn protocol_distribution_names_and_percentages() {
    let store = test_store().await;
    let ts = now_ms() - 1_000;
    let mut batch = repeat(60, packet(ts, "10.0.0.1", 443, 6, 0x10));
    batch.extend(repeat(30, packet(ts, "10.0.0.1", 53, 17, 0)));
    batch.extend(repeat(10, packet(ts, "10.0.0.1", 0, 1, 0)));
    store.packets.insert_packets(&batch).await.unwrap();

    let stats = store
        .packets
        .protocol_distribution(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    let names: Vec<&str> = stats.protocols.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["TCP", "UDP", "ICMP"]);
    assert!((stats.protocols[0].percentage - 60.0).abs() < 0.01);
    assert!((stats.protocols[1].percentage - 30.0).abs() < 0.01);
    let total: f64 = stats.protocols.iter().map(|p| p.percentage).sum();
    assert!((total - 100.0).abs() < 0.01);
}

#[tokio::test]
async fn tcp_flag_distribution_labels_composites() {
    let store = test_store().await;
    let ts = now_ms() - 1_000;
    let mut batch = repeat(6, packet(ts, "10.0.0.1", 443, 6, 0x10));
    batch.extend(repeat(3, packet(ts, "10.0.0.1", 443, 6, 0x12)));
    batch.extend(repeat(2, packet(ts, "10.0.0.1", 443, 6, 0x29)));
    store.packets.insert_packets(&batch).await.unwrap();

    let stats = store
        .packets
        .tcp_flag_distribution(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    let entries: Vec<(u8, &str, u64)> = stats
        .flags
        .iter()
        .map(|f| (f.flags, f.name.as_str(), f.count))
        .collect();
    assert_eq!(
        entries,
        vec![(0x10, "ACK", 6), (0x12, "SYN+ACK", 3), (0x29, "composite flags", 2)]
    );
    let total: f64 = stats.flags.iter().map(|f| f.percentage).sum();
    assert!((total - 100.0).abs() < 0.01);
}

#[tokio::test]
async fn distributions_over_empty_window_are_empty() {
    let store = test_store().await;
    let window = Window::trailing(now_ms(), 60);
    assert!(store.packets.protocol_distribution(window).await.unwrap().protocols.is_empty());
    assert!(store.packets.tcp_flag_distribution(window).await.unwrap().flags.is_empty());
    let ip = store.packets.source_address_stats(window).await.unwrap();
    assert_eq!(ip.unique_source_count, 0);
    assert_eq!(ip.top_sources.occupied_count(), 0);
    assert_eq!(ip.top_sources.slots().len(), TOP_N);
}

#[tokio::test]
async fn application_distribution_reports_null_as_unknown() {
    let store = test_store().await;
    let ts = now_ms() - 1_000;
    let mut tagged = packet(ts, "10.0.0.1", 443, 6, 0x10);
    tagged.application = Some("https".into());
    let mut batch = repeat(3, tagged);
    batch.extend(repeat(1, packet(ts, "10.0.0.1", 9999, 6, 0x10)));
    store.packets.insert_packets(&batch).await.unwrap();

    let apps = store
        .packets
        .application_distribution(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    let entries: Vec<(&str, u64)> = apps.apps.iter().map(|a| (a.name.as_str(), a.count)).collect();
    assert_eq!(entries, vec![("https", 3), ("unknown", 1)]);
    assert!((apps.apps[0].percentage - 75.0).abs() < 0.01);
}

#[tokio::test]
async fn mac_stats_top_sources() {
    let store = test_store().await;
    let ts = now_ms() - 1_000;
    let mut other = packet(ts, "10.0.0.2", 80, 6, 0x10);
    other.src_mac = "aa:bb:cc:dd:ee:09".into();
    let mut batch = repeat(4, packet(ts, "10.0.0.1", 80, 6, 0x10));
    batch.extend(repeat(2, other));
    store.packets.insert_packets(&batch).await.unwrap();

    let mac = store
        .packets
        .mac_stats(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    assert_eq!(mac.unique_source_count, 2);
    assert_eq!(mac.top_sources.slots()[0].address, "aa:bb:cc:dd:ee:01");
    assert_eq!(mac.top_sources.slots()[0].count, 4);
    assert_eq!(mac.top_sources.slots()[1].count, 2);
    assert_eq!(mac.top_sources.occupied_count(), 2);
}

#[tokio::test]
async fn equal_counts_share_leading_slots() {
    let store = test_store().await;
    let ts = now_ms() - 1_000;
    let mut batch = repeat(20, packet(ts, "10.0.0.21", 80, 6, 0x10));
    batch.extend(repeat(20, packet(ts, "10.0.0.22", 80, 6, 0x10)));
    batch.extend(repeat(5, packet(ts, "10.0.0.23", 80, 6, 0x10)));
    store.packets.insert_packets(&batch).await.unwrap();

    let ip = store
        .packets
        .source_address_stats(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    let slots = ip.top_sources.slots();
    // Order among equal counts is whatever the store returns; only membership is stable.
    let mut leaders: Vec<&str> = slots[..2].iter().map(|s| s.address.as_str()).collect();
    leaders.sort();
    assert_eq!(leaders, vec!["10.0.0.21", "10.0.0.22"]);
    assert!(slots[..2].iter().all(|s| s.count == 20));
    assert_eq!((slots[2].address.as_str(), slots[2].count), ("10.0.0.23", 5));
}

#[test]
fn datetime_text_is_utc_with_millis() {
    assert_eq!(datetime_text(1_700_000_000_123), "2023-11-14 22:13:20.123");
    assert_eq!(parse_datetime_ms("2023-11-14 22:13:20.123"), Some(1_700_000_000_123));
    assert_eq!(parse_datetime_ms("2023-11-14 22:13:20"), Some(1_700_000_000_000));
    assert_eq!(parse_datetime_ms("2023-11-14T22:13:20.5"), Some(1_700_000_000_500));
    assert_eq!(parse_datetime_ms("yesterday"), None);
}

#[tokio::test]
async fn basic_stats_reads_datetime_rollup_columns() {
    let store = test_store().await;
    // Rows as the capture side writes them: whole-second datetimes, no fraction.
    sqlx::query(
        "INSERT INTO packets_statistics (packets_sum, packet_size_sum, time_window, update_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(12i64)
    .bind(1200i64)
    .bind("2023-11-14 22:13:00")
    .bind("2023-11-14 22:13:20")
    .execute(&store.pool)
    .await
    .unwrap();

    let basic = store
        .packets
        .basic_stats(Window::trailing(now_ms(), 60))
        .await
        .unwrap();
    assert_eq!(basic.total_packets, 12);
    assert_eq!(basic.window.start_ms, 1_699_999_980_000);
    assert_eq!(basic.window.end_ms, 1_700_000_000_000);
}

#[tokio::test]
async fn datetime_window_filters_text_timestamps() {
    let store = test_store().await;
    let now = now_ms();
    let mut batch = repeat(4, packet(now - 2_000, "10.0.0.31", 80, 6, 0x10));
    batch.extend(repeat(9, packet(now - 3_600_000, "10.0.0.32", 80, 6, 0x10)));
    store.packets.insert_packets(&batch).await.unwrap();

    let stored: String = sqlx::query_scalar("SELECT CAST(ts AS CHAR) FROM packet_data LIMIT 1")
        .fetch_one(&store.pool)
        .await
        .unwrap();
    assert!(parse_datetime_ms(&stored).is_some());

    let ip = store
        .packets
        .source_address_stats(Window::trailing(now, 60))
        .await
        .unwrap();
    assert_eq!(ip.unique_source_count, 1);
    assert_eq!(ip.top_sources.slots()[0].address, "10.0.0.31");
}

#[tokio::test]
async fn epoch_ms_source_tables_are_supported() {
    let store = test_store_with(SourceConfig {
        time_format: TimeFormat::EpochMs,
        ..SourceConfig::default()
    })
    .await;
    let now = now_ms();
    let mut batch = repeat(3, packet(now - 1_000, "10.0.0.41", 22, 6, 0x02));
    batch.extend(repeat(2, packet(now - 120_000, "10.0.0.42", 22, 6, 0x02)));
    store.packets.insert_packets(&batch).await.unwrap();
    store
        .packets
        .insert_rollup(&RollupRecord {
            packets_sum: 3,
            packet_size_sum: 300,
            time_window: now - 5_000,
            update_at: now - 1_000,
        })
        .await
        .unwrap();

    let stored: i64 = sqlx::query_scalar("SELECT ts FROM packet_data LIMIT 1")
        .fetch_one(&store.pool)
        .await
        .unwrap();
    assert!(stored == now - 1_000 || stored == now - 120_000);

    let window = Window::trailing(now, 60);
    let basic = store.packets.basic_stats(window).await.unwrap();
    assert_eq!(basic.window.start_ms, now - 5_000);
    assert_eq!(basic.window.end_ms, now - 1_000);
    let ports = store.packets.destination_port_stats(window).await.unwrap();
    assert_eq!(ports.unique_dest_count, 1);
    assert_eq!(ports.top_ports.slots()[0].count, 3);
}
