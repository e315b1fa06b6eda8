//! Azure resource optimization library
//!
//! This crate provides the scoring core behind the cost dashboard:
//! - Metric classification and underutilization scoring
//! - Rightsizing recommendations
//! - SQL health scoring
//! - Cost trends, spike detection and storage growth projection
//! - Observability helpers shared by the service and CLI

pub mod cost;
pub mod error;
pub mod models;
pub mod observability;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod snapshot;
pub mod stats;
pub mod storage;

pub use error::ScoringError;
pub use models::*;
pub use observability::{OptimizerMetrics, StructuredLogger};
pub use report::{
    build_underutilized_reports, evaluate_resource, summarize_reports, ReportSummary,
    SavingsBasis, UnderutilizedResourceReport,
};
pub use scoring::{
    classify_metric, generate_recommendations, score_sql_health, underutilization_score,
    Confidence, RecommendationType, RightsizingRecommendation, SqlHealthScore, ThresholdAnalysis,
    UnderutilizationThresholds,
};
