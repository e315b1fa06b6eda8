//! Error types for configuration validation

use thiserror::Error;

use crate::models::MetricCategory;

/// Errors raised when caller-supplied configuration or input cannot be scored
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("{category} threshold must be a positive percentage, got {value}")]
    InvalidThreshold { category: MetricCategory, value: f64 },

    #[error("minimum monthly cost must be non-negative, got {0}")]
    InvalidCostFloor(f64),

    #[error("lookback window must be at least one day")]
    InvalidLookback,

    #[error("{field} must be a finite non-negative number, got {value}")]
    InvalidParameter { field: &'static str, value: f64 },

    #[error("usage under `{slot}` is labelled `{category}`")]
    UsageCategoryMismatch {
        slot: MetricCategory,
        category: MetricCategory,
    },
}

pub type Result<T> = std::result::Result<T, ScoringError>;
