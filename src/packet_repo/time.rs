// Source time columns: window bounds and rollup times in the configured TimeFormat.
// Datetime text is UTC `YYYY-MM-DD HH:MM:SS.fff`; the MySQL driver pins the session to UTC.

use chrono::{DateTime, NaiveDateTime};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Row};

use crate::config::TimeFormat;
use crate::models::Window;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const ACCEPTED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub(super) type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

pub(super) fn column_type(format: TimeFormat) -> &'static str {
    match format {
        TimeFormat::Datetime => "DATETIME(3)",
        TimeFormat::EpochMs => "BIGINT",
    }
}

pub(super) fn bind(query: AnyQuery<'_>, format: TimeFormat, ms: i64) -> AnyQuery<'_> {
    match format {
        TimeFormat::Datetime => query.bind(datetime_text(ms)),
        TimeFormat::EpochMs => query.bind(ms),
    }
}

/// Binds `start`, then `end`, for a `ts >= ? AND ts <= ?` predicate.
pub(super) fn bind_window(query: AnyQuery<'_>, format: TimeFormat, window: Window) -> AnyQuery<'_> {
    let query = bind(query, format, window.start_ms);
    bind(query, format, window.end_ms)
}

/// Select expression for a time column that [`read_ms`] can decode on any backend.
pub(super) fn select_expr(format: TimeFormat, column: &str) -> String {
    match format {
        TimeFormat::Datetime => format!("CAST({} AS CHAR)", column),
        TimeFormat::EpochMs => column.to_string(),
    }
}

pub(super) fn read_ms(row: &AnyRow, format: TimeFormat, column: &str) -> Result<i64, sqlx::Error> {
    match format {
        TimeFormat::EpochMs => row.try_get(column),
        TimeFormat::Datetime => {
            let text: String = row.try_get(column)?;
            parse_datetime_ms(&text).ok_or_else(|| sqlx::Error::ColumnDecode {
                index: column.to_string(),
                source: format!("unrecognized datetime {:?}", text).into(),
            })
        }
    }
}

/// Epoch ms as UTC datetime text. Out-of-range values clamp to the epoch.
pub fn datetime_text(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .unwrap_or_default()
        .format(DATETIME_FORMAT)
        .to_string()
}

/// Parses `YYYY-MM-DD HH:MM:SS[.fff]` (or with a `T` separator) as UTC epoch ms.
pub fn parse_datetime_ms(text: &str) -> Option<i64> {
    ACCEPTED_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text.trim(), f).ok())
        .map(|t| t.and_utc().timestamp_millis())
}
