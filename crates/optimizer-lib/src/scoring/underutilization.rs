//! Weighted underutilization score

use crate::models::UsageProfile;
use crate::rules::CATEGORY_WEIGHTS;

use super::thresholds::UnderutilizationThresholds;

/// How far `avg_value` sits below `threshold`, as a percent of the threshold
pub fn shortfall_percent(avg_value: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 0.0;
    }
    ((threshold - avg_value) / threshold * 100.0).max(0.0)
}

/// Combine per-category shortfalls into a 0-100 score
///
/// Absent categories are left out of both the sum and the weight total.
pub fn underutilization_score(usage: &UsageProfile, thresholds: &UnderutilizationThresholds) -> u8 {
    let mut score = 0.0;
    let mut weight_total = 0.0;

    for (category, weight) in CATEGORY_WEIGHTS {
        let (Some(metric), Some(threshold)) = (usage.get(*category), thresholds.for_category(*category)) else {
            continue;
        };
        if threshold <= 0.0 {
            continue;
        }
        score += shortfall_percent(metric.avg_value, threshold) * weight;
        weight_total += weight;
    }

    if weight_total > 0.0 {
        (score / weight_total).min(100.0).round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}
