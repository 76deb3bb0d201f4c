use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::db::models::WaitBucket;

/// Fixed-width RFC 3339 so that TEXT ordering in SQLite matches time ordering.
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_wait_bucket(value: &str) -> Result<WaitBucket> {
    value
        .parse::<WaitBucket>()
        .with_context(|| "failed to parse wait_bucket")
}
