use crate::error::Result;
use crate::options::AggregationOptions;
use crate::plan::{AggregationPlan, Condition, Grouping, Metric, METRIC_AGG_NAME};
use agg_date_range::{resolve, resolve_at, DateRangeInfo, STRICT_DATE_TIME};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

/// Aggregation name → aggregation body, as sent in a search request's `aggs`
pub type AggregationSpec = Map<String, Value>;

/// Largest `top_hits` size the builder will emit
pub const MAX_TOP_HITS_SIZE: u64 = 100;

/// Terms size used for every sampled source field
pub const MAX_SOURCE_FIELDS_TO_COPY: u64 = 10;

/// `buckets_path` variable the condition script compares against
pub const BUCKET_SELECTOR_PATH_NAME: &str = "compareValue";

/// How condition scripts refer to the compared value
pub const BUCKET_SELECTOR_FIELD: &str = "params.compareValue";

pub const GROUP_AGG_NAME: &str = "groupAgg";
pub const GROUP_AGG_COUNT_NAME: &str = "groupAggCount";
pub const CONDITION_SELECTOR_NAME: &str = "conditionSelector";
pub const DATE_AGG_NAME: &str = "dateAgg";
pub const TOP_HITS_AGG_NAME: &str = "topHitsAgg";

/// Builds aggregation specs from options.
///
/// Each invocation assembles a fresh tree from the innermost level outwards;
/// nothing is shared between calls.
#[derive(Default)]
pub struct AggregationBuilder<'a> {
    now: Option<DateTime<Utc>>,
    on_warning: Option<Box<dyn Fn(&str) + 'a>>,
}

impl<'a> AggregationBuilder<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative time windows against `now` instead of the wall clock
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Receive non-fatal warnings (e.g. clamped sizes).
    ///
    /// Without a callback warnings go to the log.
    #[must_use]
    pub fn on_warning(mut self, callback: impl Fn(&str) + 'a) -> Self {
        self.on_warning = Some(Box::new(callback));
        self
    }

    pub fn build(&self, options: &AggregationOptions) -> Result<AggregationSpec> {
        self.build_plan(&AggregationPlan::from(options))
    }

    pub fn build_plan(&self, plan: &AggregationPlan) -> Result<AggregationSpec> {
        let date_info = match &plan.time_window {
            Some(window) => Some(match self.now {
                Some(now) => resolve_at(&window.range, now)?,
                None => resolve(&window.range)?,
            }),
            None => None,
        };

        let bucket_level = self.bucket_level(plan, date_info.as_ref());
        let spec = match group_source(&plan.grouping, plan.effective_term_size()) {
            Some((source_key, source)) => group_level(plan, source_key, source, bucket_level),
            None => bucket_level,
        };

        log::debug!(
            "Built {} aggregation: group={}, date_windowed={}, condition={}, top-level keys={:?}",
            plan.metric.kind(),
            plan.is_group(),
            plan.is_date_windowed(),
            plan.condition.is_some(),
            spec.keys().collect::<Vec<_>>()
        );
        Ok(spec)
    }

    /// Aggregations evaluated per group, or at the top level when ungrouped.
    fn bucket_level(&self, plan: &AggregationPlan, date_info: Option<&DateRangeInfo>) -> Map<String, Value> {
        let mut level = Map::new();

        for field in &plan.source_fields {
            level.insert(
                field.label.clone(),
                json!({ "terms": { "field": field.search_path, "size": MAX_SOURCE_FIELDS_TO_COPY } }),
            );
        }

        if let (Some(window), Some(info)) = (&plan.time_window, date_info) {
            let mut date_agg = Map::new();
            date_agg.insert(
                "date_range".to_string(),
                json!({
                    "field": window.time_field,
                    "format": STRICT_DATE_TIME,
                    "ranges": info.date_ranges,
                }),
            );
            // per-bucket metric is always `metricAgg`, independent of the group-level name
            if let Metric::Value { kind, field } = &plan.metric {
                if let Some(body) = kind.body(field.as_deref()) {
                    date_agg.insert("aggs".to_string(), json!({ METRIC_AGG_NAME: body }));
                }
            }
            level.insert(DATE_AGG_NAME.to_string(), Value::Object(date_agg));
        }

        if plan.is_group() {
            if let Some(requested) = plan.top_hits_size {
                let size = self.clamp_top_hits(requested);
                level.insert(TOP_HITS_AGG_NAME.to_string(), json!({ "top_hits": { "size": size } }));
            }
        }

        if let Metric::Value { kind, field } = &plan.metric {
            let name = plan.value_agg_name();
            if let Some(body) = kind.body(field.as_deref()) {
                level.insert(name.to_string(), body);
            }
            if let Some(condition) = plan.condition.as_ref().filter(|_| plan.is_group()) {
                level.insert(
                    CONDITION_SELECTOR_NAME.to_string(),
                    bucket_selector(&kind.value_path(name), condition),
                );
            }
        }

        level
    }

    fn clamp_top_hits(&self, requested: u64) -> u64 {
        if requested <= MAX_TOP_HITS_SIZE {
            return requested;
        }
        self.warn(&format!("Top hits size is capped at {MAX_TOP_HITS_SIZE}"));
        MAX_TOP_HITS_SIZE
    }

    fn warn(&self, message: &str) {
        match &self.on_warning {
            Some(callback) => callback(message),
            None => log::warn!("{message}"),
        }
    }
}

/// Terms source for the group aggregation, keyed by its protocol name
fn group_source(grouping: &Grouping, size: u64) -> Option<(&'static str, Value)> {
    match grouping {
        Grouping::None => None,
        Grouping::Terms(field) => Some(("terms", json!({ "field": field, "size": size }))),
        Grouping::MultiTerms(fields) => {
            let terms: Vec<Value> = fields.iter().map(|field| json!({ "field": field })).collect();
            Some(("multi_terms", json!({ "terms": terms, "size": size })))
        }
    }
}

/// Wraps `bucket_level` in the group aggregation and adds its siblings.
fn group_level(
    plan: &AggregationPlan,
    source_key: &str,
    mut source: Value,
    bucket_level: Map<String, Value>,
) -> AggregationSpec {
    let mut nested = Map::new();
    match (&plan.metric, &plan.condition) {
        (Metric::Value { kind, .. }, _) => {
            let order_key = kind.value_path(plan.value_agg_name());
            source["order"] = json!({ order_key: kind.sort_order() });
        }
        (Metric::Count, Some(condition)) => {
            nested.insert(CONDITION_SELECTOR_NAME.to_string(), bucket_selector("_count", condition));
        }
        (Metric::Count, None) => {}
    }
    // later entries win on name collisions
    nested.extend(bucket_level);

    let mut group_agg = Map::new();
    group_agg.insert(source_key.to_string(), source);
    if !nested.is_empty() {
        group_agg.insert("aggs".to_string(), Value::Object(nested));
    }

    let mut spec = Map::new();
    spec.insert(GROUP_AGG_NAME.to_string(), Value::Object(group_agg));
    if plan.condition.is_some() {
        spec.insert(
            GROUP_AGG_COUNT_NAME.to_string(),
            json!({ "stats_bucket": { "buckets_path": format!("{GROUP_AGG_NAME}._count") } }),
        );
    }
    spec
}

fn bucket_selector(buckets_path: &str, condition: &Condition) -> Value {
    json!({
        "bucket_selector": {
            "buckets_path": { BUCKET_SELECTOR_PATH_NAME: buckets_path },
            "script": condition.script,
        }
    })
}

/// Build with the wall clock and log-only warnings.
pub fn build_aggregation(options: &AggregationOptions) -> Result<AggregationSpec> {
    AggregationBuilder::new().build(options)
}
