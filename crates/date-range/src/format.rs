//! Timestamp parsing and `strict_date_time` rendering.

use crate::error::{DateRangeError, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Name of the date format the rendered ranges conform to
pub const STRICT_DATE_TIME: &str = "strict_date_time";

/// Render a timestamp as `yyyy-MM-dd'T'HH:mm:ss.SSSZ`.
#[must_use]
pub fn format_strict_date_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp or an epoch-milliseconds integer.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(millis) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| DateRangeError::invalid_date(format!("'{raw}' is out of range")));
    }
    Err(DateRangeError::invalid_date(format!(
        "'{raw}' is neither RFC 3339 nor epoch milliseconds"
    )))
}

pub(crate) mod strict_date_time {
    use super::{format_strict_date_time, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_strict_date_time(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(de::Error::custom)
    }
}
