use crate::metric::MetricKind;
use agg_date_range::DateRangeParams;
use serde::{Deserialize, Serialize};

/// Declarative description of the aggregation a threshold rule runs.
///
/// Field names follow the camelCase wire shape rule definitions are stored in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AggregationOptions {
    /// Time window to bucket documents over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series: Option<TimeSeriesOptions>,

    pub agg_type: MetricKind,

    /// Field the metric is computed over (ignored for `count`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agg_field: Option<String>,

    /// Maximum number of groups to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_size: Option<u64>,

    /// Field(s) to group by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_field: Option<TermField>,

    /// Extra fields whose values are sampled per group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_fields_params: Vec<SourceField>,

    /// Number of raw documents to return per group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_hits_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimeSeriesOptions {
    pub time_field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    pub time_window_size: i64,

    pub time_window_unit: String,
}

impl TimeSeriesOptions {
    /// Trailing window of `size` × `unit` over `time_field`
    pub fn trailing(time_field: impl Into<String>, size: i64, unit: impl Into<String>) -> Self {
        Self {
            time_field: time_field.into(),
            date_start: None,
            date_end: None,
            interval: None,
            time_window_size: size,
            time_window_unit: unit.into(),
        }
    }

    #[must_use]
    pub fn date_range_params(&self) -> DateRangeParams {
        DateRangeParams {
            date_start: self.date_start.clone(),
            date_end: self.date_end.clone(),
            window_size: self.time_window_size,
            window_unit: self.time_window_unit.clone(),
            interval: self.interval.clone(),
        }
    }
}

/// One grouping field, or an ordered list for multi-field grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermField {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for TermField {
    fn from(field: &str) -> Self {
        Self::Single(field.to_string())
    }
}

impl From<Vec<&str>> for TermField {
    fn from(fields: Vec<&str>) -> Self {
        Self::Multiple(fields.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceField {
    /// Aggregation name the sampled values are reported under
    pub label: String,
    /// Document field path to sample
    pub search_path: String,
}

impl SourceField {
    pub fn new(label: impl Into<String>, search_path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            search_path: search_path.into(),
        }
    }
}

/// Threshold condition evaluated inside the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConditionOptions {
    /// Maximum number of matching groups the caller will report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_limit: Option<u64>,

    /// Painless predicate over `params.compareValue`
    pub condition_script: String,
}

/// How a rule groups its alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    All,
    Top,
    Row,
}

impl GroupBy {
    #[must_use]
    pub const fn is_per_row(self) -> bool {
        matches!(self, Self::Row)
    }
}
