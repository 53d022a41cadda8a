// Shared connection pool. One pool serves both the source reads and the snapshot writes.
// sqlx's Any driver picks MySQL or SQLite from the URL scheme.

use std::time::Duration;

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use tracing::info;

use crate::config::DatabaseConfig;

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<AnyPool> {
    connect_url(
        &config.connection_url(),
        config.max_pool_size,
        Duration::from_secs(config.max_lifetime_secs),
        Duration::from_secs(config.idle_timeout_secs),
    )
    .await
}

/// Opens the pool and checks out one connection so an unreachable store fails at startup.
pub async fn connect_url(
    url: &str,
    max_connections: u32,
    max_lifetime: Duration,
    idle_timeout: Duration,
) -> anyhow::Result<AnyPool> {
    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .max_lifetime(max_lifetime)
        .idle_timeout(idle_timeout)
        .connect(url)
        .await?;
    let backend = pool.acquire().await?.backend_name().to_string();
    info!(backend = %backend, max_connections, "connected to store");
    Ok(pool)
}
