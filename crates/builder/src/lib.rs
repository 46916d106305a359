//! # Aggregation Builder
//!
//! Assembles the aggregation section of a threshold rule's search request
//! from declarative [`AggregationOptions`].
//!
//! ## Shape
//!
//! ```text
//! groupAgg (terms | multi_terms, ordered by the value agg)
//!  ├─ conditionSelector   (count: bucket_selector on _count)
//!  ├─ <label>…            (terms, size 10, one per source field)
//!  ├─ dateAgg             (date_range over the time field)
//!  │    └─ metricAgg      (per-range metric)
//!  ├─ topHitsAgg          (top_hits, size ≤ 100)
//!  ├─ sortValueAgg | metricAgg
//!  └─ conditionSelector   (metric: bucket_selector on the value agg)
//! groupAggCount           (stats_bucket over groupAgg._count)
//! ```
//!
//! Without grouping, the children of `groupAgg` move to the top level.
//!
//! ## Example
//!
//! ```rust
//! use agg_builder::{build_aggregation, AggregationOptions, MetricKind};
//! use serde_json::json;
//!
//! let options = AggregationOptions {
//!     agg_type: MetricKind::Avg,
//!     agg_field: Some("latency".to_string()),
//!     ..Default::default()
//! };
//! let spec = build_aggregation(&options).unwrap();
//! assert_eq!(
//!     serde_json::Value::Object(spec),
//!     json!({ "metricAgg": { "avg": { "field": "latency" } } })
//! );
//! ```

mod builder;
mod error;
mod metric;
mod options;
mod plan;

pub use builder::{
    build_aggregation, AggregationBuilder, AggregationSpec, BUCKET_SELECTOR_FIELD,
    BUCKET_SELECTOR_PATH_NAME, CONDITION_SELECTOR_NAME, DATE_AGG_NAME, GROUP_AGG_COUNT_NAME,
    GROUP_AGG_NAME, MAX_SOURCE_FIELDS_TO_COPY, MAX_TOP_HITS_SIZE, TOP_HITS_AGG_NAME,
};
pub use error::{BuildError, Result};
pub use metric::MetricKind;
pub use options::{
    AggregationOptions, ConditionOptions, GroupBy, SourceField, TermField, TimeSeriesOptions,
};
pub use plan::{
    is_count_aggregation, is_group_aggregation, AggregationPlan, Condition, Grouping, Metric,
    TimeWindow, DEFAULT_GROUPS, METRIC_AGG_NAME, SORT_VALUE_AGG_NAME,
};

pub use agg_date_range::{DateRange, DateRangeError, DateRangeInfo, DateRangeParams};
