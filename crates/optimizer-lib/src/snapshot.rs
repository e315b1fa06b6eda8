//! Input snapshots and their evaluated responses
//!
//! A snapshot bundles the rows one evaluation needs. The HTTP service takes
//! them as request bodies and the CLI reads them from JSON files.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cost::{daily_cost_series, CostSpike, CostSpikeDetector, CostTrend, DailyCost};
use crate::error::{Result, ScoringError};
use crate::models::{
    CostRow, MetricSample, ReplicationLinkRow, ResourceRow, SqlPerformanceRow, UsageProfile,
    WaitStatRow,
};
use crate::report::{
    build_underutilized_reports, evaluate_resource, summarize_reports, ReportSummary,
    UnderutilizedResourceReport,
};
use crate::scoring::{score_sql_health, SqlHealthScore, UnderutilizationThresholds};
use crate::storage::{project_storage_growth, StorageProjection, StorageSample};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnderutilizedSnapshot {
    #[serde(default)]
    pub resources: Vec<ResourceRow>,
    #[serde(default)]
    pub metrics: Vec<MetricSample>,
    #[serde(default)]
    pub costs: Vec<CostRow>,
    /// Overrides the evaluator's default thresholds
    #[serde(default)]
    pub thresholds: Option<UnderutilizationThresholds>,
    /// Evaluation time; the current time when absent
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnderutilizedResponse {
    pub thresholds: UnderutilizationThresholds,
    pub summary: ReportSummary,
    pub reports: Vec<UnderutilizedResourceReport>,
}

impl UnderutilizedSnapshot {
    pub fn evaluate(&self, defaults: &UnderutilizationThresholds) -> Result<UnderutilizedResponse> {
        let thresholds = self.thresholds.unwrap_or(*defaults);
        thresholds.validate()?;

        let reports = build_underutilized_reports(
            &self.resources,
            &self.metrics,
            &self.costs,
            &thresholds,
            self.now.unwrap_or_else(Utc::now),
        );
        Ok(UnderutilizedResponse {
            thresholds,
            summary: summarize_reports(&reports),
            reports,
        })
    }
}

/// A single resource with pre-aggregated usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub resource: ResourceRow,
    #[serde(default)]
    pub usage: UsageProfile,
    pub monthly_cost: f64,
    #[serde(default)]
    pub thresholds: Option<UnderutilizationThresholds>,
}

impl ResourceSnapshot {
    pub fn evaluate(&self, defaults: &UnderutilizationThresholds) -> Result<UnderutilizedResourceReport> {
        let thresholds = self.thresholds.unwrap_or(*defaults);
        thresholds.validate()?;
        self.usage.validate()?;
        if !self.monthly_cost.is_finite() || self.monthly_cost < 0.0 {
            return Err(ScoringError::InvalidParameter {
                field: "monthly_cost",
                value: self.monthly_cost,
            });
        }
        Ok(evaluate_resource(&self.resource, self.usage.clone(), &thresholds, self.monthly_cost))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlHealthSnapshot {
    #[serde(default)]
    pub performance: Vec<SqlPerformanceRow>,
    #[serde(default)]
    pub wait_stats: Vec<WaitStatRow>,
    #[serde(default)]
    pub replication_links: Vec<ReplicationLinkRow>,
}

impl SqlHealthSnapshot {
    pub fn evaluate(&self) -> SqlHealthScore {
        score_sql_health(&self.performance, &self.wait_stats, &self.replication_links)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostSnapshot {
    #[serde(default)]
    pub costs: Vec<CostRow>,
    /// Day the projection is made on; the last day in the series when absent
    #[serde(default)]
    pub today: Option<NaiveDate>,
    #[serde(default)]
    pub detector: Option<CostSpikeDetector>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTrendResponse {
    pub series: Vec<DailyCost>,
    pub trend: Option<CostTrend>,
    pub spikes: Vec<CostSpike>,
}

impl CostSnapshot {
    pub fn evaluate(&self) -> CostTrendResponse {
        let series = daily_cost_series(&self.costs);
        let today = self
            .today
            .or_else(|| series.last().map(|d| d.date))
            .unwrap_or_else(|| Utc::now().date_naive());
        let trend = CostTrend::from_series(&series, today);
        let spikes = self.detector.unwrap_or_default().detect(&series);
        CostTrendResponse { series, trend, spikes }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSnapshot {
    #[serde(default)]
    pub samples: Vec<StorageSample>,
    #[serde(default)]
    pub capacity: Option<f64>,
}

impl StorageSnapshot {
    /// Project growth; `capacity` overrides the snapshot's own capacity
    pub fn evaluate(&self, capacity: Option<f64>) -> Option<StorageProjection> {
        project_storage_growth(&self.samples, capacity.or(self.capacity)?)
    }
}
