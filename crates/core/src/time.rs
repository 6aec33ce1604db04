use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{LogsinkError, Result};

/// Layout of `received_at`. Fixed width so string order is time order.
pub const RECEIVED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub fn format_received_at(ts: DateTime<Utc>) -> String {
    ts.format(RECEIVED_AT_FORMAT).to_string()
}

pub fn received_at_now() -> String {
    format_received_at(Utc::now())
}

pub fn parse_time_or_relative(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Ok(duration) = humantime::parse_duration(input) {
        return Ok(Utc::now()
            - chrono::Duration::from_std(duration).map_err(|e| {
                LogsinkError::Parse(format!("failed to parse duration to chrono: {e}"))
            })?);
    }

    Err(LogsinkError::Parse(format!(
        "expected RFC3339 time or duration, got {input}"
    )))
}

pub fn parse_duration_str(input: &str) -> Result<Duration> {
    humantime::parse_duration(input)
        .map_err(|e| LogsinkError::Parse(format!("invalid duration {input}: {e}")))
}
