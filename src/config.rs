use serde::Deserialize;
use sqlx::ConnectOptions;
use sqlx::mysql::MySqlConnectOptions;

/// Longest trailing window accepted: one day.
pub const MAX_WINDOW_SECS: u64 = 86_400;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub source: SourceConfig,
    pub snapshot: SnapshotConfig,
}

/// Shared store connection. `url` wins when set; otherwise a MySQL URL is built from the parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub max_pool_size: u32,
    pub max_lifetime_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: "greptime_user".into(),
            password: "greptime_pwd".into(),
            host: "localhost".into(),
            port: 4002,
            name: "test".into(),
            max_pool_size: 10,
            max_lifetime_secs: 300,
            idle_timeout_secs: 60,
        }
    }
}

impl DatabaseConfig {
    /// Credentials are percent-encoded into the URL, so reserved characters in a password
    /// stay in the password.
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => MySqlConnectOptions::new()
                .username(&self.user)
                .password(&self.password)
                .host(&self.host)
                .port(self.port)
                .database(&self.name)
                .to_url_lossy()
                .to_string(),
        }
    }
}

/// How the source tables store time (`ts`, `time_window`, `update_at`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// DATETIME / TIMESTAMP columns, read and compared in UTC.
    #[default]
    Datetime,
    /// BIGINT epoch milliseconds.
    EpochMs,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub packet_table: String,
    pub rollup_table: String,
    pub time_format: TimeFormat,
    /// Create the source tables at startup (local runs; production tables belong to the capture side).
    pub init_schema: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            packet_table: "packet_data".into(),
            rollup_table: "packets_statistics".into(),
            time_format: TimeFormat::Datetime,
            init_schema: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub interval_secs: u64,
    /// Trailing window every dimension is aggregated over.
    pub window_secs: u64,
    /// Log each snapshot as indented JSON.
    pub verbose: bool,
    pub collect_applications: bool,
    pub collect_mac: bool,
    /// Upper bound on one cycle; unset means a stalled store can block a cycle indefinitely.
    pub cycle_timeout_secs: Option<u64>,
    pub stats_log_interval_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            window_secs: 60,
            verbose: false,
            collect_applications: false,
            collect_mac: false,
            cycle_timeout_secs: None,
            stats_log_interval_secs: 60,
        }
    }
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`; missing file = defaults), then applies env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let mut config: AppConfig = match std::fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(anyhow::anyhow!("reading {}: {}", path, e)),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides from `DATABASE_URL`, `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT`, `DB_NAME`, `VERBOSE_OUTPUT`.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.database.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("DB_PORT {:?}: {}", port, e))?;
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }
        if let Some(verbose) = lookup("VERBOSE_OUTPUT") {
            self.snapshot.verbose = verbose == "true";
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(url) = &self.database.url {
            anyhow::ensure!(!url.is_empty(), "database.url must be non-empty when set");
        } else {
            anyhow::ensure!(
                !self.database.host.is_empty(),
                "database.host must be non-empty"
            );
            anyhow::ensure!(
                self.database.port > 0,
                "database.port must be between 1 and 65535, got {}",
                self.database.port
            );
        }
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            is_sql_identifier(&self.source.packet_table),
            "source.packet_table must be a plain SQL identifier, got {:?}",
            self.source.packet_table
        );
        anyhow::ensure!(
            is_sql_identifier(&self.source.rollup_table),
            "source.rollup_table must be a plain SQL identifier, got {:?}",
            self.source.rollup_table
        );
        anyhow::ensure!(
            self.snapshot.interval_secs > 0,
            "snapshot.interval_secs must be > 0, got {}",
            self.snapshot.interval_secs
        );
        anyhow::ensure!(
            self.snapshot.window_secs > 0 && self.snapshot.window_secs <= MAX_WINDOW_SECS,
            "snapshot.window_secs must be between 1 and {}, got {}",
            MAX_WINDOW_SECS,
            self.snapshot.window_secs
        );
        anyhow::ensure!(
            self.snapshot.cycle_timeout_secs != Some(0),
            "snapshot.cycle_timeout_secs must be > 0 when set"
        );
        anyhow::ensure!(
            self.snapshot.stats_log_interval_secs > 0,
            "snapshot.stats_log_interval_secs must be > 0, got {}",
            self.snapshot.stats_log_interval_secs
        );
        Ok(())
    }
}

/// Table names are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
