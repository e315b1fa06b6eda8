//! Observability infrastructure for the optimizer
//!
//! Provides:
//! - Prometheus metrics (scoring latency, reports, recommendations, spikes)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::cost::{CostSpike, SpikeSeverity};
use crate::report::UnderutilizedResourceReport;
use crate::scoring::SqlHealthScore;
use crate::storage::{StorageProjection, StorageStatus};

/// Histogram buckets for scoring latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<OptimizerMetricsInner> = OnceLock::new();

struct OptimizerMetricsInner {
    scoring_latency_seconds: Histogram,
    reports_generated: IntCounter,
    recommendations_emitted: IntCounterVec,
    sql_health_evaluations: IntCounter,
    cost_spikes_detected: IntCounterVec,
    invalid_requests: IntCounter,
}

impl OptimizerMetricsInner {
    fn new() -> Self {
        Self {
            scoring_latency_seconds: register_histogram!(
                "optimizer_scoring_latency_seconds",
                "Time spent evaluating one snapshot",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register scoring_latency_seconds"),

            reports_generated: register_int_counter!(
                "optimizer_underutilized_reports_total",
                "Underutilized resource reports produced"
            )
            .expect("Failed to register underutilized_reports_total"),

            recommendations_emitted: register_int_counter_vec!(
                "optimizer_recommendations_total",
                "Rightsizing recommendations produced, by type",
                &["type"]
            )
            .expect("Failed to register recommendations_total"),

            sql_health_evaluations: register_int_counter!(
                "optimizer_sql_health_evaluations_total",
                "SQL health scores computed"
            )
            .expect("Failed to register sql_health_evaluations_total"),

            cost_spikes_detected: register_int_counter_vec!(
                "optimizer_cost_spikes_total",
                "Cost spikes detected, by severity",
                &["severity"]
            )
            .expect("Failed to register cost_spikes_total"),

            invalid_requests: register_int_counter!(
                "optimizer_invalid_requests_total",
                "Snapshots rejected because of invalid configuration"
            )
            .expect("Failed to register invalid_requests_total"),
        }
    }
}

/// Handle to the process-wide optimizer metrics
///
/// Clones share the same underlying Prometheus collectors.
#[derive(Clone)]
pub struct OptimizerMetrics {
    _private: (),
}

impl Default for OptimizerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(OptimizerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &OptimizerMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_scoring_latency(&self, duration_secs: f64) {
        self.inner().scoring_latency_seconds.observe(duration_secs);
    }

    /// Count reports and the recommendations they carry
    pub fn record_reports(&self, reports: &[UnderutilizedResourceReport]) {
        let inner = self.inner();
        inner.reports_generated.inc_by(reports.len() as u64);
        for rec in reports.iter().flat_map(|r| &r.recommendations) {
            inner
                .recommendations_emitted
                .with_label_values(&[rec.recommendation_type.as_str()])
                .inc();
        }
    }

    pub fn inc_sql_health_evaluations(&self) {
        self.inner().sql_health_evaluations.inc();
    }

    pub fn record_cost_spikes(&self, spikes: &[CostSpike]) {
        for spike in spikes {
            self.inner()
                .cost_spikes_detected
                .with_label_values(&[spike.severity.as_str()])
                .inc();
        }
    }

    pub fn inc_invalid_requests(&self) {
        self.inner().invalid_requests.inc();
    }
}

/// Structured logger for optimizer events
#[derive(Clone)]
pub struct StructuredLogger {
    source: String,
}

impl StructuredLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn log_underutilized_reports(&self, reports: &[UnderutilizedResourceReport], total_savings: f64) {
        info!(
            event = "underutilized_reports_generated",
            source = %self.source,
            resource_count = reports.len(),
            total_potential_savings = total_savings,
            "Generated underutilized resource reports"
        );
    }

    pub fn log_sql_health(&self, score: &SqlHealthScore) {
        if score.critical_count > 0 {
            warn!(
                event = "sql_health_scored",
                source = %self.source,
                overall_score = score.overall_score,
                database_count = score.database_count,
                critical_count = score.critical_count,
                "SQL health scored with critical databases"
            );
        } else {
            info!(
                event = "sql_health_scored",
                source = %self.source,
                overall_score = score.overall_score,
                database_count = score.database_count,
                "SQL health scored"
            );
        }
    }

    pub fn log_cost_spike(&self, spike: &CostSpike) {
        match spike.severity {
            SpikeSeverity::Critical => warn!(
                event = "cost_spike_detected",
                source = %self.source,
                date = %spike.date,
                amount = spike.amount,
                previous_amount = spike.previous_amount,
                change_percent = ?spike.change_percent,
                severity = spike.severity.as_str(),
                "Critical cost spike detected"
            ),
            _ => info!(
                event = "cost_spike_detected",
                source = %self.source,
                date = %spike.date,
                amount = spike.amount,
                previous_amount = spike.previous_amount,
                change_percent = ?spike.change_percent,
                severity = spike.severity.as_str(),
                "Cost spike detected"
            ),
        }
    }

    pub fn log_storage_projection(&self, projection: &StorageProjection) {
        if projection.status == StorageStatus::Healthy {
            info!(
                event = "storage_projected",
                source = %self.source,
                percent_used = projection.percent_used,
                growth_per_day = projection.growth_per_day,
                "Storage growth projected"
            );
        } else {
            warn!(
                event = "storage_projected",
                source = %self.source,
                percent_used = projection.percent_used,
                growth_per_day = projection.growth_per_day,
                days_until_full = ?projection.days_until_full,
                "Storage is approaching capacity"
            );
        }
    }

    pub fn log_rejected(&self, operation: &str, reason: &str) {
        warn!(
            event = "request_rejected",
            source = %self.source,
            operation = %operation,
            reason = %reason,
            "Rejected optimizer request"
        );
    }

    pub fn log_startup(&self, version: &str, port: u16) {
        info!(
            event = "optimizer_started",
            source = %self.source,
            version = %version,
            port = port,
            "Optimizer service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "optimizer_shutdown",
            source = %self.source,
            reason = %reason,
            "Optimizer service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handles_share_registry() {
        let metrics = OptimizerMetrics::new();
        let clone = metrics.clone();

        metrics.observe_scoring_latency(0.0002);
        clone.inc_sql_health_evaluations();
        clone.record_reports(&[]);
        clone.record_cost_spikes(&[]);
        metrics.inc_invalid_requests();
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("optimizer-api");
        assert_eq!(logger.source, "optimizer-api");
    }
}
