//! Cost spike detection
//!
//! Flags days whose spend jumps against the previous day, or sits several
//! standard deviations above the preceding days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trend::DailyCost;
use crate::stats::{mean, std_dev};

/// Prior days needed before the z-score check applies
pub const MIN_HISTORY_DAYS: usize = 7;

/// Preceding days considered for the z-score baseline
pub const BASELINE_WINDOW_DAYS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostSpikeDetector {
    /// Day-over-day increase, in percent, that counts as a spike
    pub min_change_percent: f64,
    /// Absolute increase required alongside the percent change
    pub min_absolute_increase: f64,
    /// Number of standard deviations above the baseline mean
    pub std_dev_threshold: f64,
}

impl Default for CostSpikeDetector {
    fn default() -> Self {
        Self {
            min_change_percent: 50.0,
            min_absolute_increase: 10.0,
            std_dev_threshold: 3.0,
        }
    }
}

impl CostSpikeDetector {
    pub fn new(min_change_percent: f64, min_absolute_increase: f64, std_dev_threshold: f64) -> Self {
        Self {
            min_change_percent,
            min_absolute_increase,
            std_dev_threshold,
        }
    }

    /// Scan a daily series (oldest first) and return every spike found
    pub fn detect(&self, series: &[DailyCost]) -> Vec<CostSpike> {
        let amounts: Vec<f64> = series.iter().map(|d| d.amount).collect();

        series
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(i, day)| self.check_day(day, &amounts[..i]))
            .collect()
    }

    /// Check one day against the days before it
    pub fn check_day(&self, day: &DailyCost, history: &[f64]) -> Option<CostSpike> {
        let previous = *history.last()?;
        let increase = day.amount - previous;

        let change_percent = if previous.abs() > f64::EPSILON {
            Some(increase / previous * 100.0)
        } else {
            None
        };
        let change_triggered = change_percent
            .map(|pct| pct >= self.min_change_percent && increase >= self.min_absolute_increase)
            .unwrap_or(false);

        let z_score = if history.len() >= MIN_HISTORY_DAYS {
            let baseline = &history[history.len().saturating_sub(BASELINE_WINDOW_DAYS)..];
            let sd = std_dev(baseline);
            match mean(baseline) {
                Some(m) if sd > f64::EPSILON => Some((day.amount - m) / sd),
                _ => None,
            }
        } else {
            None
        };
        let z_triggered = z_score.map(|z| z > self.std_dev_threshold).unwrap_or(false);

        if !change_triggered && !z_triggered {
            return None;
        }

        Some(CostSpike {
            date: day.date,
            amount: day.amount,
            previous_amount: previous,
            change_percent,
            z_score,
            severity: SpikeSeverity::classify(change_percent, z_score),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSpike {
    pub date: NaiveDate,
    pub amount: f64,
    pub previous_amount: f64,
    pub change_percent: Option<f64>,
    pub z_score: Option<f64>,
    pub severity: SpikeSeverity,
}

impl CostSpike {
    pub fn increase(&self) -> f64 {
        self.amount - self.previous_amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpikeSeverity {
    Warning,
    High,
    Critical,
}

impl SpikeSeverity {
    fn classify(change_percent: Option<f64>, z_score: Option<f64>) -> Self {
        let pct = change_percent.unwrap_or(0.0);
        let z = z_score.unwrap_or(0.0);
        if pct >= 200.0 || z >= 5.0 {
            SpikeSeverity::Critical
        } else if pct >= 100.0 || z >= 4.0 {
            SpikeSeverity::High
        } else {
            SpikeSeverity::Warning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpikeSeverity::Warning => "warning",
            SpikeSeverity::High => "high",
            SpikeSeverity::Critical => "critical",
        }
    }
}
