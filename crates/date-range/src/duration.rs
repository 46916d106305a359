use crate::error::{DateRangeError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit suffix of a relative duration such as `5m`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "d")]
    Days,
    #[serde(rename = "w")]
    Weeks,
}

impl TimeUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
            Self::Days => "d",
            Self::Weeks => "w",
        }
    }

    /// Length of one unit in milliseconds
    #[must_use]
    pub const fn millis(self) -> i64 {
        match self {
            Self::Milliseconds => 1,
            Self::Seconds => 1_000,
            Self::Minutes => 60 * 1_000,
            Self::Hours => 3_600 * 1_000,
            Self::Days => 86_400 * 1_000,
            Self::Weeks => 604_800 * 1_000,
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = DateRangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            "m" => Ok(Self::Minutes),
            "h" => Ok(Self::Hours),
            "d" => Ok(Self::Days),
            "w" => Ok(Self::Weeks),
            other => Err(DateRangeError::UnknownUnit(other.to_string())),
        }
    }
}

/// A unit-qualified length of time (`size` × `unit`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    pub size: i64,
    pub unit: TimeUnit,
}

impl TimeSpan {
    #[must_use]
    pub const fn new(size: i64, unit: TimeUnit) -> Self {
        Self { size, unit }
    }

    /// Span as a chrono duration, or `None` on overflow
    #[must_use]
    pub fn to_duration(self) -> Option<Duration> {
        self.size
            .checked_mul(self.unit.millis())
            .and_then(Duration::try_milliseconds)
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.size > 0
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.size, self.unit)
    }
}

impl FromStr for TimeSpan {
    type Err = DateRangeError;

    /// Parses `<digits><unit>`, e.g. `30s`, `5m`, `1d`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| DateRangeError::UnknownUnit(s.to_string()))?;
        let (num_str, unit_str) = s.split_at(split);
        if num_str.is_empty() {
            return Err(DateRangeError::invalid_interval(format!(
                "missing size in '{s}'"
            )));
        }
        let size: i64 = num_str
            .parse()
            .map_err(|_| DateRangeError::invalid_interval(format!("invalid number in '{s}'")))?;
        let unit = unit_str.parse()?;
        Ok(Self::new(size, unit))
    }
}

/// Parse a relative duration such as `5m` into a chrono duration.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let span: TimeSpan = s.parse()?;
    span.to_duration()
        .ok_or_else(|| DateRangeError::invalid_interval(format!("'{s}' is out of range")))
}
