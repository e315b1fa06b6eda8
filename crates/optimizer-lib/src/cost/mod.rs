//! Cost trend analysis
//!
//! This module provides:
//! - Daily cost series and month-end projection
//! - Day-over-day and z-score spike detection

mod spike_detector;
mod trend;

pub use spike_detector::{
    CostSpike, CostSpikeDetector, SpikeSeverity, BASELINE_WINDOW_DAYS, MIN_HISTORY_DAYS,
};
pub use trend::{daily_cost_series, days_in_month, month_to_date_cost, CostTrend, DailyCost};
