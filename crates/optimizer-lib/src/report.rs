//! Underutilized resource reports
//!
//! Joins resource, metric and cost rows fetched by the caller and runs the
//! scorers over each resource.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cost::month_to_date_cost;
use crate::models::{CostRow, MetricCategory, MetricSample, MetricUsage, ResourceRow, UsageProfile};
use crate::rules::FALLBACK_SAVINGS_PERCENT;
use crate::scoring::{
    classify_metric, generate_recommendations, max_savings, underutilization_score,
    RightsizingRecommendation, ThresholdAnalysis, UnderutilizationThresholds,
};

/// Where `potential_savings` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsBasis {
    /// Largest savings among the generated recommendations
    Recommendation,
    /// Flat share of monthly cost, used when no recommendation fired
    CostHeuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderutilizedResourceReport {
    pub resource_id: String,
    pub name: String,
    pub resource_type: String,
    pub resource_group: Option<String>,
    pub location: Option<String>,
    pub sku: Option<String>,
    pub usage: UsageProfile,
    pub analysis: ThresholdAnalysis,
    pub recommendations: Vec<RightsizingRecommendation>,
    pub underutilization_score: u8,
    pub monthly_cost: f64,
    pub potential_savings: f64,
    pub savings_basis: SavingsBasis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub resource_count: usize,
    pub total_monthly_cost: f64,
    pub total_potential_savings: f64,
    pub average_score: f64,
}

#[derive(Default)]
struct CategoryAccumulator {
    sum: f64,
    count: usize,
    max: f64,
    unit: String,
}

/// Average and peak per category for one resource's samples
///
/// Samples whose metric name is not recognized, or that carry no average,
/// are skipped.
pub fn aggregate_usage<'a>(samples: impl IntoIterator<Item = &'a MetricSample>) -> UsageProfile {
    let mut accumulators: BTreeMap<MetricCategory, CategoryAccumulator> = BTreeMap::new();

    for sample in samples {
        let Some(category) = classify_metric(&sample.metric_name) else {
            continue;
        };
        let Some(average) = sample.average else {
            continue;
        };
        let average = average.max(0.0);
        let peak = sample.maximum.unwrap_or(average).max(0.0);

        let acc = accumulators.entry(category).or_default();
        acc.sum += average;
        acc.count += 1;
        acc.max = acc.max.max(peak);
        if acc.unit.is_empty() {
            if let Some(unit) = sample.unit.as_deref() {
                acc.unit = unit.to_string();
            }
        }
    }

    let mut usage = UsageProfile::default();
    for (category, acc) in accumulators {
        usage.set(MetricUsage::new(category, acc.sum / acc.count as f64, acc.max, acc.unit));
    }
    usage
}

/// Score one resource without any cost or threshold filtering
pub fn evaluate_resource(
    resource: &ResourceRow,
    usage: UsageProfile,
    thresholds: &UnderutilizationThresholds,
    monthly_cost: f64,
) -> UnderutilizedResourceReport {
    let monthly_cost = monthly_cost.max(0.0);
    let analysis = ThresholdAnalysis::analyze(&usage, thresholds);
    let recommendations = generate_recommendations(resource, &usage, thresholds, monthly_cost);
    let score = underutilization_score(&usage, thresholds);

    let (potential_savings, savings_basis) = match max_savings(&recommendations) {
        Some(savings) => (savings, SavingsBasis::Recommendation),
        None => (monthly_cost * FALLBACK_SAVINGS_PERCENT / 100.0, SavingsBasis::CostHeuristic),
    };

    UnderutilizedResourceReport {
        resource_id: resource.id.clone(),
        name: resource.name.clone(),
        resource_type: resource.resource_type.clone(),
        resource_group: resource.resource_group.clone(),
        location: resource.location.clone(),
        sku: resource.sku.clone(),
        usage,
        analysis,
        recommendations,
        underutilization_score: score,
        monthly_cost,
        potential_savings,
        savings_basis,
    }
}

/// Build reports for every resource that is both costly and underused
///
/// Metric rows older than the lookback window are ignored; cost is the sum
/// of the current billing month up to `now`.
pub fn build_underutilized_reports(
    resources: &[ResourceRow],
    metrics: &[MetricSample],
    costs: &[CostRow],
    thresholds: &UnderutilizationThresholds,
    now: DateTime<Utc>,
) -> Vec<UnderutilizedResourceReport> {
    let cutoff = now - Duration::days(thresholds.lookback_days as i64);

    let mut samples_by_resource: HashMap<&str, Vec<&MetricSample>> = HashMap::new();
    for sample in metrics.iter().filter(|m| m.timestamp >= cutoff && m.timestamp <= now) {
        samples_by_resource
            .entry(sample.resource_id.as_str())
            .or_default()
            .push(sample);
    }

    let mut costs_by_resource: HashMap<&str, Vec<CostRow>> = HashMap::new();
    for row in costs {
        costs_by_resource
            .entry(row.resource_id.as_str())
            .or_default()
            .push(row.clone());
    }

    let today = now.date_naive();
    let mut reports: Vec<UnderutilizedResourceReport> = resources
        .iter()
        .filter_map(|resource| {
            let monthly_cost = costs_by_resource
                .get(resource.id.as_str())
                .map(|rows| month_to_date_cost(rows, today))
                .unwrap_or(0.0)
                .max(0.0);
            if monthly_cost < thresholds.min_monthly_cost {
                debug!(resource_id = %resource.id, monthly_cost, "Skipping resource below cost floor");
                return None;
            }

            let usage = samples_by_resource
                .get(resource.id.as_str())
                .map(|samples| aggregate_usage(samples.iter().copied()))
                .unwrap_or_default();
            if usage.is_empty() {
                debug!(resource_id = %resource.id, "Skipping resource without classified metrics");
                return None;
            }

            let report = evaluate_resource(resource, usage, thresholds, monthly_cost);
            if !report.analysis.any_underutilized() {
                return None;
            }
            Some(report)
        })
        .collect();

    reports.sort_by(|a, b| {
        b.potential_savings
            .partial_cmp(&a.potential_savings)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    reports
}

pub fn summarize_reports(reports: &[UnderutilizedResourceReport]) -> ReportSummary {
    if reports.is_empty() {
        return ReportSummary::default();
    }
    ReportSummary {
        resource_count: reports.len(),
        total_monthly_cost: reports.iter().map(|r| r.monthly_cost).sum(),
        total_potential_savings: reports.iter().map(|r| r.potential_savings).sum(),
        average_score: reports.iter().map(|r| r.underutilization_score as f64).sum::<f64>()
            / reports.len() as f64,
    }
}
