use crate::duration::{TimeSpan, TimeUnit};
use crate::error::{DateRangeError, Result};
use crate::format::{format_strict_date_time, parse_timestamp, strict_date_time};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of sub-ranges a single window may produce
pub const MAX_INTERVALS: usize = 1000;

/// Window parameters as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    /// Absolute window start; defaults to `end - window`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,

    /// Absolute window end; defaults to now
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<String>,

    pub window_size: i64,

    pub window_unit: String,

    /// Optional bucket length used to subdivide the window (e.g. `1m`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

impl DateRangeParams {
    /// Parameters for a trailing window ending now
    pub fn trailing(window_size: i64, window_unit: impl Into<String>) -> Self {
        Self {
            date_start: None,
            date_end: None,
            window_size,
            window_unit: window_unit.into(),
            interval: None,
        }
    }

    #[must_use]
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.date_start = Some(start.into());
        self
    }

    #[must_use]
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.date_end = Some(end.into());
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    /// Validate the window and return it as a span
    pub fn window(&self) -> Result<TimeSpan> {
        let unit: TimeUnit = self.window_unit.parse().map_err(|_| {
            DateRangeError::invalid_window(format!("unrecognized unit '{}'", self.window_unit))
        })?;
        let span = TimeSpan::new(self.window_size, unit);
        if !span.is_positive() {
            return Err(DateRangeError::invalid_window(format!(
                "size must be positive, got {span}"
            )));
        }
        Ok(span)
    }

    fn interval_duration(&self) -> Result<Option<Duration>> {
        let Some(raw) = self.interval.as_deref() else {
            return Ok(None);
        };
        let span: TimeSpan = raw
            .parse()
            .map_err(|e: DateRangeError| DateRangeError::invalid_interval(format!("'{raw}': {e}")))?;
        if !span.is_positive() {
            return Err(DateRangeError::invalid_interval(format!(
                "'{raw}' must be positive"
            )));
        }
        span.to_duration()
            .map(Some)
            .ok_or_else(|| DateRangeError::invalid_interval(format!("'{raw}' is out of range")))
    }
}

/// One half-open bucket `[from, to)` of the resolved window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(rename = "from", with = "strict_date_time")]
    pub start: DateTime<Utc>,

    #[serde(rename = "to", with = "strict_date_time")]
    pub end: DateTime<Utc>,
}

impl DateRange {
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Absolute window plus its ordered, contiguous sub-ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeInfo {
    #[serde(with = "strict_date_time")]
    pub date_start: DateTime<Utc>,

    #[serde(with = "strict_date_time")]
    pub date_end: DateTime<Utc>,

    pub date_ranges: Vec<DateRange>,
}

/// Resolve `params` against the current wall clock.
pub fn resolve(params: &DateRangeParams) -> Result<DateRangeInfo> {
    resolve_at(params, Utc::now())
}

/// Resolve `params`, using `now` as the default window end.
pub fn resolve_at(params: &DateRangeParams, now: DateTime<Utc>) -> Result<DateRangeInfo> {
    let window = params.window()?;
    let window_len = window
        .to_duration()
        .ok_or_else(|| DateRangeError::invalid_window(format!("{window} is out of range")))?;
    let interval = params.interval_duration()?;

    let date_end = match params.date_end.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => now,
    };
    let date_start = match params.date_start.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => date_end
            .checked_sub_signed(window_len)
            .ok_or_else(|| DateRangeError::invalid_window(format!("{window} is out of range")))?,
    };

    if date_start >= date_end {
        return Err(DateRangeError::StartNotBeforeEnd {
            start: format_strict_date_time(&date_start),
            end: format_strict_date_time(&date_end),
        });
    }

    let date_ranges = match interval {
        Some(step) => subdivide(date_start, date_end, step)?,
        None => vec![DateRange {
            start: date_start,
            end: date_end,
        }],
    };

    log::debug!(
        "Resolved window {} into {} range(s): {} .. {}",
        window,
        date_ranges.len(),
        format_strict_date_time(&date_start),
        format_strict_date_time(&date_end)
    );

    Ok(DateRangeInfo {
        date_start,
        date_end,
        date_ranges,
    })
}

fn subdivide(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Result<Vec<DateRange>> {
    let mut ranges = Vec::new();
    let mut cursor = start;
    while cursor < end {
        if ranges.len() == MAX_INTERVALS {
            return Err(DateRangeError::TooManyIntervals { max: MAX_INTERVALS });
        }
        let next = cursor
            .checked_add_signed(step)
            .map_or(end, |next| next.min(end));
        ranges.push(DateRange {
            start: cursor,
            end: next,
        });
        cursor = next;
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn trailing_window_ends_now() {
        let info = resolve_at(&DateRangeParams::trailing(5, "m"), at(10, 0, 0)).unwrap();
        assert_eq!(info.date_start, at(9, 55, 0));
        assert_eq!(info.date_end, at(10, 0, 0));
        assert_eq!(
            info.date_ranges,
            vec![DateRange {
                start: at(9, 55, 0),
                end: at(10, 0, 0)
            }]
        );
    }

    #[test]
    fn explicit_end_overrides_clock() {
        let params = DateRangeParams::trailing(1, "h").with_end("2024-01-01T06:00:00Z");
        let info = resolve_at(&params, at(23, 0, 0)).unwrap();
        assert_eq!(info.date_start, at(5, 0, 0));
        assert_eq!(info.date_end, at(6, 0, 0));
    }

    #[test]
    fn explicit_start_and_end_ignore_window_length() {
        let params = DateRangeParams::trailing(1, "m")
            .with_start("2024-01-01T01:00:00Z")
            .with_end("2024-01-01T03:00:00Z");
        let info = resolve_at(&params, at(12, 0, 0)).unwrap();
        assert_eq!(info.date_ranges.len(), 1);
        assert_eq!(info.date_ranges[0].duration(), Duration::hours(2));
    }

    #[test]
    fn interval_subdivides_and_clips_last_range() {
        let params = DateRangeParams::trailing(5, "m").with_interval("2m");
        let info = resolve_at(&params, at(10, 0, 0)).unwrap();
        assert_eq!(
            info.date_ranges,
            vec![
                DateRange { start: at(9, 55, 0), end: at(9, 57, 0) },
                DateRange { start: at(9, 57, 0), end: at(9, 59, 0) },
                DateRange { start: at(9, 59, 0), end: at(10, 0, 0) },
            ]
        );
    }

    #[test]
    fn interval_longer_than_window_yields_single_range() {
        let params = DateRangeParams::trailing(5, "m").with_interval("1h");
        let info = resolve_at(&params, at(10, 0, 0)).unwrap();
        assert_eq!(info.date_ranges.len(), 1);
        assert_eq!(info.date_ranges[0].start, at(9, 55, 0));
        assert_eq!(info.date_ranges[0].end, at(10, 0, 0));
    }

    #[test]
    fn rejects_non_positive_window() {
        let err = resolve_at(&DateRangeParams::trailing(0, "m"), at(10, 0, 0)).unwrap_err();
        assert!(matches!(err, DateRangeError::InvalidWindow(_)));

        let err = resolve_at(&DateRangeParams::trailing(-3, "h"), at(10, 0, 0)).unwrap_err();
        assert!(matches!(err, DateRangeError::InvalidWindow(_)));
    }

    #[test]
    fn rejects_unknown_window_unit() {
        let err = resolve_at(&DateRangeParams::trailing(5, "fortnight"), at(10, 0, 0)).unwrap_err();
        assert!(matches!(err, DateRangeError::InvalidWindow(_)));
    }

    #[test]
    fn rejects_bad_interval() {
        for interval in ["0m", "soon", "5q"] {
            let params = DateRangeParams::trailing(5, "m").with_interval(interval);
            let err = resolve_at(&params, at(10, 0, 0)).unwrap_err();
            assert!(
                matches!(err, DateRangeError::InvalidInterval(_)),
                "interval {interval} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_start_after_end() {
        let params = DateRangeParams::trailing(5, "m")
            .with_start("2024-01-01T10:00:00Z")
            .with_end("2024-01-01T09:00:00Z");
        let err = resolve_at(&params, at(12, 0, 0)).unwrap_err();
        assert!(matches!(err, DateRangeError::StartNotBeforeEnd { .. }));
    }

    #[test]
    fn caps_interval_count() {
        let params = DateRangeParams::trailing(1, "d").with_interval("1s");
        let err = resolve_at(&params, at(10, 0, 0)).unwrap_err();
        assert_eq!(err, DateRangeError::TooManyIntervals { max: MAX_INTERVALS });
    }

    #[test]
    fn exactly_max_intervals_is_allowed() {
        let params = DateRangeParams::trailing(1000, "s").with_interval("1s");
        let info = resolve_at(&params, at(10, 0, 0)).unwrap();
        assert_eq!(info.date_ranges.len(), MAX_INTERVALS);
    }

    #[test]
    fn serializes_as_from_to_strict_date_time() {
        let info = resolve_at(&DateRangeParams::trailing(5, "m"), at(10, 0, 0)).unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "dateStart": "2024-01-01T09:55:00.000Z",
                "dateEnd": "2024-01-01T10:00:00.000Z",
                "dateRanges": [
                    { "from": "2024-01-01T09:55:00.000Z", "to": "2024-01-01T10:00:00.000Z" }
                ]
            })
        );
    }
}
