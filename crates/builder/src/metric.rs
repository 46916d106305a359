use crate::error::{BuildError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Statistical function applied to a field within a bucket.
///
/// Accepted tags: `count`, `avg` (or `average`), `sum`, `min`, `max`,
/// `median`, `cardinality`, and percentiles written as `p95` / `p99.9`.
/// A bare `percentile` means `p50`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetricKind {
    #[default]
    Count,
    Avg,
    Sum,
    Min,
    Max,
    Median,
    Percentile(f64),
    Cardinality,
}

impl MetricKind {
    #[must_use]
    pub const fn is_count(self) -> bool {
        matches!(self, Self::Count)
    }

    /// Group ordering direction when sorting buckets by this metric
    #[must_use]
    pub const fn sort_order(self) -> &'static str {
        match self {
            Self::Min => "asc",
            _ => "desc",
        }
    }

    /// Rank for the `percentiles` family, `None` for single-value metrics
    #[must_use]
    pub const fn percent(self) -> Option<f64> {
        match self {
            Self::Median => Some(50.0),
            Self::Percentile(p) => Some(p),
            _ => None,
        }
    }

    /// Protocol operator name, `None` for `count`
    #[must_use]
    pub const fn operator(self) -> Option<&'static str> {
        match self {
            Self::Count => None,
            Self::Avg => Some("avg"),
            Self::Sum => Some("sum"),
            Self::Min => Some("min"),
            Self::Max => Some("max"),
            Self::Cardinality => Some("cardinality"),
            Self::Median | Self::Percentile(_) => Some("percentiles"),
        }
    }

    /// Aggregation body, e.g. `{ "max": { "field": "cpu" } }`.
    ///
    /// Returns `None` for `count`, which is implied by bucket doc counts.
    #[must_use]
    pub fn body(self, field: Option<&str>) -> Option<Value> {
        let operator = self.operator()?;
        let mut params = Map::new();
        if let Some(field) = field {
            params.insert("field".to_string(), json!(field));
        }
        if let Some(percent) = self.percent() {
            params.insert("percents".to_string(), json!([percent]));
        }
        let mut body = Map::new();
        body.insert(operator.to_string(), Value::Object(params));
        Some(Value::Object(body))
    }

    /// Path other aggregations use to reference this metric's value.
    ///
    /// Multi-value `percentiles` results are addressed as `name[rank]`.
    #[must_use]
    pub fn value_path(self, agg_name: &str) -> String {
        match self.percent() {
            Some(percent) => format!("{agg_name}[{percent:?}]"),
            None => agg_name.to_string(),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => f.write_str("count"),
            Self::Avg => f.write_str("avg"),
            Self::Sum => f.write_str("sum"),
            Self::Min => f.write_str("min"),
            Self::Max => f.write_str("max"),
            Self::Median => f.write_str("median"),
            Self::Percentile(p) => write!(f, "p{p}"),
            Self::Cardinality => f.write_str("cardinality"),
        }
    }
}

impl FromStr for MetricKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase();
        let kind = match tag.as_str() {
            "count" => Self::Count,
            "avg" | "average" => Self::Avg,
            "sum" => Self::Sum,
            "min" => Self::Min,
            "max" => Self::Max,
            "median" => Self::Median,
            "percentile" => Self::Percentile(50.0),
            "cardinality" => Self::Cardinality,
            other => {
                let percent = other
                    .strip_prefix('p')
                    .and_then(|rank| rank.parse::<f64>().ok())
                    .filter(|rank| *rank > 0.0 && *rank < 100.0)
                    .ok_or_else(|| BuildError::InvalidMetric(s.to_string()))?;
                Self::Percentile(percent)
            }
        };
        Ok(kind)
    }
}

impl TryFrom<String> for MetricKind {
    type Error = BuildError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MetricKind> for String {
    fn from(kind: MetricKind) -> Self {
        kind.to_string()
    }
}
