//! Daily cost series and month-end projection

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::CostRow;
use crate::stats::least_squares_slope;

/// Total spend for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Sum cost rows per usage day, oldest first
pub fn daily_cost_series(rows: &[CostRow]) -> Vec<DailyCost> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        *days.entry(row.usage_date).or_insert(0.0) += row.cost_amount;
    }
    days.into_iter()
        .map(|(date, amount)| DailyCost { date, amount })
        .collect()
}

/// Sum of rows whose usage date falls in the same calendar month as `day`
pub fn month_to_date_cost(rows: &[CostRow], day: NaiveDate) -> f64 {
    rows.iter()
        .filter(|r| r.usage_date.year() == day.year() && r.usage_date.month() == day.month() && r.usage_date <= day)
        .map(|r| r.cost_amount)
        .sum()
}

pub fn days_in_month(day: NaiveDate) -> u32 {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostTrend {
    pub total_cost: f64,
    pub daily_average: f64,
    /// Change of the last day against the day before it
    pub day_over_day_change_percent: Option<f64>,
    /// Least-squares slope, in cost units per day
    pub slope_per_day: f64,
    pub month_to_date: f64,
    pub projected_month_end: f64,
}

impl CostTrend {
    /// Summarize a daily series as seen on `today`
    ///
    /// Returns `None` for an empty series.
    pub fn from_series(series: &[DailyCost], today: NaiveDate) -> Option<Self> {
        let first = series.first()?;
        let total_cost: f64 = series.iter().map(|d| d.amount).sum();
        let daily_average = total_cost / series.len() as f64;

        let day_over_day_change_percent = match series {
            [.., previous, last] if previous.amount.abs() > f64::EPSILON => {
                Some((last.amount - previous.amount) / previous.amount * 100.0)
            }
            _ => None,
        };

        let points: Vec<(f64, f64)> = series
            .iter()
            .map(|d| ((d.date - first.date).num_days() as f64, d.amount))
            .collect();

        let month_to_date: f64 = series
            .iter()
            .filter(|d| d.date.year() == today.year() && d.date.month() == today.month() && d.date <= today)
            .map(|d| d.amount)
            .sum();
        let remaining_days = days_in_month(today).saturating_sub(today.day());

        Some(Self {
            total_cost,
            daily_average,
            day_over_day_change_percent,
            slope_per_day: least_squares_slope(&points),
            month_to_date,
            projected_month_end: (month_to_date + daily_average.max(0.0) * remaining_days as f64).max(0.0),
        })
    }
}
