//! Typed form of [`AggregationOptions`].
//!
//! The wire options carry many optional fields whose combinations interact;
//! the plan collapses each axis into an enum so the builder never has to
//! re-derive which combination it is looking at.

use crate::metric::MetricKind;
use crate::options::{AggregationOptions, SourceField, TermField};
use agg_date_range::DateRangeParams;

/// Number of groups returned when the caller does not ask for a size
pub const DEFAULT_GROUPS: u64 = 100;

/// Name of the value aggregation when no time window is present
pub const METRIC_AGG_NAME: &str = "metricAgg";

/// Name of the per-group ordering aggregation when a time window is present
pub const SORT_VALUE_AGG_NAME: &str = "sortValueAgg";

#[must_use]
pub fn is_count_aggregation(kind: MetricKind) -> bool {
    kind.is_count()
}

#[must_use]
pub fn is_group_aggregation(term_field: Option<&TermField>) -> bool {
    match term_field {
        Some(TermField::Single(field)) => !field.is_empty(),
        Some(TermField::Multiple(fields)) => !fields.is_empty(),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    /// Document count only; implied by bucket sizes
    Count,
    Value { kind: MetricKind, field: Option<String> },
}

impl Metric {
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        match self {
            Self::Count => MetricKind::Count,
            Self::Value { kind, .. } => *kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouping {
    None,
    Terms(String),
    MultiTerms(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub time_field: String,
    pub range: DateRangeParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub result_limit: Option<u64>,
    pub script: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationPlan {
    pub metric: Metric,
    pub grouping: Grouping,
    pub time_window: Option<TimeWindow>,
    pub term_size: Option<u64>,
    pub source_fields: Vec<SourceField>,
    pub top_hits_size: Option<u64>,
    pub condition: Option<Condition>,
}

impl AggregationPlan {
    #[must_use]
    pub fn is_group(&self) -> bool {
        !matches!(self.grouping, Grouping::None)
    }

    #[must_use]
    pub fn is_date_windowed(&self) -> bool {
        self.time_window.is_some()
    }

    /// Group count sent to the store.
    ///
    /// With a result limit `L`, asking for more than `L` groups is cut to
    /// `L + 1` so the caller can tell that more groups matched than it
    /// reports.
    #[must_use]
    pub fn effective_term_size(&self) -> u64 {
        let terms = self.term_size.unwrap_or(DEFAULT_GROUPS);
        match self.condition.as_ref().and_then(|c| c.result_limit) {
            Some(limit) if terms > limit => limit.saturating_add(1),
            _ => terms,
        }
    }

    /// Name of the value aggregation emitted at the group level
    #[must_use]
    pub fn value_agg_name(&self) -> &'static str {
        if self.is_date_windowed() {
            SORT_VALUE_AGG_NAME
        } else {
            METRIC_AGG_NAME
        }
    }
}

impl From<&AggregationOptions> for AggregationPlan {
    fn from(options: &AggregationOptions) -> Self {
        let metric = if is_count_aggregation(options.agg_type) {
            Metric::Count
        } else {
            Metric::Value {
                kind: options.agg_type,
                field: options.agg_field.clone(),
            }
        };

        let grouping = match &options.term_field {
            Some(term_field) if is_group_aggregation(Some(term_field)) => match term_field {
                TermField::Single(field) => Grouping::Terms(field.clone()),
                TermField::Multiple(fields) => Grouping::MultiTerms(fields.clone()),
            },
            _ => Grouping::None,
        };

        let time_window = options.time_series.as_ref().map(|series| TimeWindow {
            time_field: series.time_field.clone(),
            range: series.date_range_params(),
        });

        Self {
            metric,
            grouping,
            time_window,
            // zero sizes mean "unset"
            term_size: options.term_size.filter(|size| *size > 0),
            source_fields: options.source_fields_params.clone(),
            top_hits_size: options.top_hits_size.filter(|size| *size > 0),
            condition: options.condition.as_ref().map(|condition| Condition {
                result_limit: condition.result_limit.filter(|limit| *limit > 0),
                script: condition.condition_script.clone(),
            }),
        }
    }
}
