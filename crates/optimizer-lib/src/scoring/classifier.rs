//! Metric name classification

use crate::models::MetricCategory;
use crate::rules::CLASSIFICATION_RULES;

/// Map a free-text metric name to its utilization category
///
/// Matching is case-insensitive and ordered, so "cpu_memory_ratio" is CPU.
/// Unrecognized names return `None` and must be left out of aggregation.
pub fn classify_metric(metric_name: &str) -> Option<MetricCategory> {
    let name = metric_name.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| name.contains(n)))
        .map(|(category, _)| *category)
}
