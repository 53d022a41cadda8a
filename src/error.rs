// Error taxonomy for the snapshot pipeline: per-dimension fill failures and per-table write failures.

use std::fmt;

use thiserror::Error;

/// Statistical dimension filled from the source store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Basic,
    SourceAddress,
    DestinationPort,
    Protocol,
    TcpFlags,
    Application,
    Mac,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Basic => "basic",
            Dimension::SourceAddress => "source_address",
            Dimension::DestinationPort => "destination_port",
            Dimension::Protocol => "protocol",
            Dimension::TcpFlags => "tcp_flags",
            Dimension::Application => "application",
            Dimension::Mac => "mac",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dimension's query failed; the dimension keeps its zero-value default.
#[derive(Error, Debug)]
#[error("{dimension} fill failed: {source}")]
pub struct FillError {
    pub dimension: Dimension,
    #[source]
    pub source: sqlx::Error,
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("creating {table} failed: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("insert into {table} failed: {source}")]
    Insert {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl WriteError {
    pub fn table(&self) -> &'static str {
        match self {
            WriteError::Schema { table, .. } | WriteError::Insert { table, .. } => table,
        }
    }
}
