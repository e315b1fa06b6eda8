//! Resource health and optimization scoring
//!
//! All functions here are pure: identical inputs give identical outputs,
//! and nothing is logged or stored.

mod classifier;
mod recommendations;
mod sql_health;
mod thresholds;
mod underutilization;

pub use classifier::classify_metric;
pub use recommendations::{
    generate_recommendations, max_savings, Confidence, RecommendationType,
    RightsizingRecommendation,
};
pub use sql_health::{
    latest_per_resource, overall_score, performance_score, performance_score_for,
    replication_score, score_sql_health, wait_stats_score, DatabaseStatus, SqlHealthFactors,
    SqlHealthScore,
};
pub use thresholds::{
    ThresholdAnalysis, UnderutilizationThresholds, DEFAULT_CPU_THRESHOLD, DEFAULT_DTU_THRESHOLD,
    DEFAULT_LOOKBACK_DAYS, DEFAULT_MEMORY_THRESHOLD, DEFAULT_MIN_MONTHLY_COST,
    DEFAULT_STORAGE_THRESHOLD,
};
pub use underutilization::{shortfall_percent, underutilization_score};
