//! Storage growth projection
//!
//! Fits a least-squares line through used-storage samples and projects when
//! the allocated capacity runs out.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::least_squares_slope;

const SECS_PER_DAY: f64 = 86_400.0;

pub const CRITICAL_DAYS_UNTIL_FULL: f64 = 7.0;
pub const WARNING_DAYS_UNTIL_FULL: f64 = 30.0;
pub const CRITICAL_PERCENT_USED: f64 = 90.0;
pub const WARNING_PERCENT_USED: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSample {
    pub timestamp: DateTime<Utc>,
    pub used: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageProjection {
    pub current_used: f64,
    pub capacity: f64,
    pub percent_used: f64,
    /// Growth in storage units per day; negative when shrinking
    pub growth_per_day: f64,
    pub projected_used_30d: f64,
    pub days_until_full: Option<f64>,
    pub projected_full_at: Option<DateTime<Utc>>,
    pub status: StorageStatus,
}

/// Project storage growth from at least two samples
///
/// Returns `None` with fewer than two samples or a non-positive capacity.
pub fn project_storage_growth(samples: &[StorageSample], capacity: f64) -> Option<StorageProjection> {
    if samples.len() < 2 || capacity.is_nan() || capacity <= 0.0 {
        return None;
    }

    let mut ordered = samples.to_vec();
    ordered.sort_by_key(|s| s.timestamp);
    let first = ordered.first()?.timestamp;
    let latest = *ordered.last()?;

    let points: Vec<(f64, f64)> = ordered
        .iter()
        .map(|s| ((s.timestamp - first).num_seconds() as f64 / SECS_PER_DAY, s.used))
        .collect();
    let growth_per_day = least_squares_slope(&points);

    let current_used = latest.used.max(0.0);
    let percent_used = (current_used / capacity * 100.0).clamp(0.0, 100.0);
    let remaining = (capacity - current_used).max(0.0);

    let days_until_full = if growth_per_day > f64::EPSILON {
        Some(remaining / growth_per_day)
    } else {
        None
    };
    // Out-of-range offsets leave the date unset
    let projected_full_at = days_until_full
        .and_then(|days| Duration::try_seconds((days * SECS_PER_DAY) as i64))
        .and_then(|offset| latest.timestamp.checked_add_signed(offset));

    let status = if percent_used >= CRITICAL_PERCENT_USED
        || days_until_full.map(|d| d < CRITICAL_DAYS_UNTIL_FULL).unwrap_or(false)
    {
        StorageStatus::Critical
    } else if percent_used >= WARNING_PERCENT_USED
        || days_until_full.map(|d| d < WARNING_DAYS_UNTIL_FULL).unwrap_or(false)
    {
        StorageStatus::Warning
    } else {
        StorageStatus::Healthy
    };

    Some(StorageProjection {
        current_used,
        capacity,
        percent_used,
        growth_per_day,
        projected_used_30d: (current_used + growth_per_day * 30.0).max(0.0),
        days_until_full,
        projected_full_at,
        status,
    })
}
