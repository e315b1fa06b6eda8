//! Underutilization thresholds and per-category analysis

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};
use crate::models::{MetricCategory, UsageProfile};

pub const DEFAULT_CPU_THRESHOLD: f64 = 20.0;
pub const DEFAULT_MEMORY_THRESHOLD: f64 = 30.0;
pub const DEFAULT_DTU_THRESHOLD: f64 = 20.0;
pub const DEFAULT_STORAGE_THRESHOLD: f64 = 40.0;
pub const DEFAULT_MIN_MONTHLY_COST: f64 = 50.0;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Percentage cut points below which a category is underutilized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnderutilizationThresholds {
    pub cpu: f64,
    pub memory: f64,
    pub dtu: f64,
    pub storage: f64,
    /// Resources cheaper than this are not reported
    pub min_monthly_cost: f64,
    /// Metric window, in days
    pub lookback_days: u32,
}

impl Default for UnderutilizationThresholds {
    fn default() -> Self {
        Self {
            cpu: DEFAULT_CPU_THRESHOLD,
            memory: DEFAULT_MEMORY_THRESHOLD,
            dtu: DEFAULT_DTU_THRESHOLD,
            storage: DEFAULT_STORAGE_THRESHOLD,
            min_monthly_cost: DEFAULT_MIN_MONTHLY_COST,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl UnderutilizationThresholds {
    /// Threshold for a category; network has none
    pub fn for_category(&self, category: MetricCategory) -> Option<f64> {
        match category {
            MetricCategory::Cpu => Some(self.cpu),
            MetricCategory::Memory => Some(self.memory),
            MetricCategory::Dtu => Some(self.dtu),
            MetricCategory::Storage => Some(self.storage),
            MetricCategory::Network => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (category, value) in [
            (MetricCategory::Cpu, self.cpu),
            (MetricCategory::Memory, self.memory),
            (MetricCategory::Dtu, self.dtu),
            (MetricCategory::Storage, self.storage),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScoringError::InvalidThreshold { category, value });
            }
        }
        if !self.min_monthly_cost.is_finite() || self.min_monthly_cost < 0.0 {
            return Err(ScoringError::InvalidCostFloor(self.min_monthly_cost));
        }
        if self.lookback_days == 0 {
            return Err(ScoringError::InvalidLookback);
        }
        Ok(())
    }
}

/// Which measured categories sit below their threshold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdAnalysis {
    pub cpu_underutilized: bool,
    pub memory_underutilized: bool,
    pub dtu_underutilized: bool,
    pub storage_underutilized: bool,
    /// Measured categories, network included
    pub metrics_analyzed: u32,
    pub metrics_below_threshold: u32,
}

impl ThresholdAnalysis {
    pub fn analyze(usage: &UsageProfile, thresholds: &UnderutilizationThresholds) -> Self {
        let below = |category: MetricCategory| match (usage.get(category), thresholds.for_category(category)) {
            (Some(u), Some(t)) => u.avg_value < t,
            _ => false,
        };

        let mut analysis = Self {
            cpu_underutilized: below(MetricCategory::Cpu),
            memory_underutilized: below(MetricCategory::Memory),
            dtu_underutilized: below(MetricCategory::Dtu),
            storage_underutilized: below(MetricCategory::Storage),
            metrics_analyzed: usage.present().count() as u32,
            metrics_below_threshold: 0,
        };
        analysis.metrics_below_threshold = [
            analysis.cpu_underutilized,
            analysis.memory_underutilized,
            analysis.dtu_underutilized,
            analysis.storage_underutilized,
        ]
        .iter()
        .filter(|flag| **flag)
        .count() as u32;

        analysis
    }

    pub fn any_underutilized(&self) -> bool {
        self.metrics_below_threshold > 0
    }
}
