//! Composite SQL health score
//!
//! Sub-scores start at 100 and lose points from the penalty tables in
//! [`crate::rules`]. Penalties add up; they never compound.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{ReplicationLinkRow, SqlPerformanceRow, WaitStatRow};
use crate::rules::*;

/// Contributing measurements behind a [`SqlHealthScore`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlHealthFactors {
    pub avg_dtu_percent: Option<f64>,
    pub avg_cpu_percent: Option<f64>,
    pub high_dtu_count: u32,
    pub deadlock_count: u64,
    pub blocked_count: u64,
    pub top_wait_type: Option<String>,
    pub top_wait_time_ms: Option<f64>,
    pub replication_issues: u32,
    pub avg_replication_lag: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlHealthScore {
    pub overall_score: u8,
    pub performance_score: u8,
    pub wait_stats_score: u8,
    pub replication_score: u8,
    pub database_count: u32,
    pub healthy_count: u32,
    pub warning_count: u32,
    pub critical_count: u32,
    pub factors: SqlHealthFactors,
}

/// Health bucket of a single database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Healthy,
    Warning,
    Critical,
}

impl DatabaseStatus {
    pub fn from_score(score: u8) -> Self {
        if score >= SQL_HEALTHY_MIN_SCORE {
            DatabaseStatus::Healthy
        } else if score >= SQL_WARNING_MIN_SCORE {
            DatabaseStatus::Warning
        } else {
            DatabaseStatus::Critical
        }
    }
}

fn deduct(penalties: u32) -> u8 {
    100u32.saturating_sub(penalties).min(100) as u8
}

pub fn performance_score(
    avg_dtu_percent: Option<f64>,
    avg_cpu_percent: Option<f64>,
    deadlocks: u64,
    blocked: u64,
) -> u8 {
    let utilization = avg_dtu_percent.or(avg_cpu_percent).unwrap_or(0.0);
    deduct(
        UTILIZATION_PENALTIES.penalty(utilization)
            + DEADLOCK_PENALTIES.penalty(deadlocks as f64)
            + BLOCKED_PENALTIES.penalty(blocked as f64),
    )
}

pub fn wait_stats_score(top_wait_time_ms: Option<f64>) -> u8 {
    let seconds = top_wait_time_ms.unwrap_or(0.0) / 1000.0;
    deduct(WAIT_TIME_PENALTIES.penalty(seconds))
}

pub fn replication_score(issues: u32, avg_lag_secs: Option<f64>) -> u8 {
    if issues == 0 {
        return 100;
    }
    deduct(
        REPLICATION_ISSUE_PENALTIES.penalty(issues as f64)
            + REPLICATION_LAG_PENALTIES.penalty(avg_lag_secs.unwrap_or(0.0)),
    )
}

pub fn overall_score(performance: u8, wait_stats: u8, replication: u8) -> u8 {
    let blended = performance as f64 * SQL_PERFORMANCE_WEIGHT
        + wait_stats as f64 * SQL_WAIT_STATS_WEIGHT
        + replication as f64 * SQL_REPLICATION_WEIGHT;
    blended.round().clamp(0.0, 100.0) as u8
}

/// Keep only the newest performance row per database
pub fn latest_per_resource(rows: &[SqlPerformanceRow]) -> Vec<SqlPerformanceRow> {
    let mut latest: BTreeMap<&str, &SqlPerformanceRow> = BTreeMap::new();
    for row in rows {
        latest
            .entry(row.resource_id.as_str())
            .and_modify(|current| {
                if row.timestamp > current.timestamp {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    latest.into_values().cloned().collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn is_replication_issue(link: &ReplicationLinkRow) -> bool {
    let state = link.replication_state.to_lowercase();
    let healthy_state = HEALTHY_REPLICATION_STATES.contains(&state.as_str());
    let lagging = link
        .replication_lag_seconds
        .map(|lag| lag > REPLICATION_LAG_ISSUE_SECS)
        .unwrap_or(false);
    !healthy_state || lagging
}

/// Fold SQL performance, wait and replication rows into a composite score
///
/// Several rows for the same database are reduced to the newest one.
/// Wait times are summed per wait type before picking the top wait.
pub fn score_sql_health(
    performance: &[SqlPerformanceRow],
    wait_stats: &[WaitStatRow],
    replication_links: &[ReplicationLinkRow],
) -> SqlHealthScore {
    let databases = latest_per_resource(performance);

    let mut waits: HashMap<&str, f64> = HashMap::new();
    for row in wait_stats {
        *waits.entry(row.wait_type.as_str()).or_insert(0.0) += row.wait_time_ms.max(0.0);
    }
    let top_wait = waits
        .into_iter()
        .max_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.cmp(a.0))
        });

    let factors = SqlHealthFactors {
        avg_dtu_percent: mean(databases.iter().filter_map(|d| d.dtu_percent)),
        avg_cpu_percent: mean(databases.iter().filter_map(|d| d.cpu_percent)),
        high_dtu_count: databases
            .iter()
            .filter(|d| d.dtu_percent.map(|v| v > HIGH_DTU_PERCENT).unwrap_or(false))
            .count() as u32,
        deadlock_count: databases.iter().map(|d| d.deadlock_count.unwrap_or(0)).sum(),
        blocked_count: databases.iter().map(|d| d.blocked_count.unwrap_or(0)).sum(),
        top_wait_type: top_wait.map(|(name, _)| name.to_string()),
        top_wait_time_ms: top_wait.map(|(_, ms)| ms),
        replication_issues: replication_links.iter().filter(|l| is_replication_issue(l)).count() as u32,
        avg_replication_lag: mean(replication_links.iter().filter_map(|l| l.replication_lag_seconds)),
    };

    let performance_score = performance_score(
        factors.avg_dtu_percent,
        factors.avg_cpu_percent,
        factors.deadlock_count,
        factors.blocked_count,
    );
    let wait_stats_score = wait_stats_score(factors.top_wait_time_ms);
    let replication_score = replication_score(factors.replication_issues, factors.avg_replication_lag);

    let mut healthy_count = 0;
    let mut warning_count = 0;
    let mut critical_count = 0;
    for db in &databases {
        let score = performance_score_for(db);
        match DatabaseStatus::from_score(score) {
            DatabaseStatus::Healthy => healthy_count += 1,
            DatabaseStatus::Warning => warning_count += 1,
            DatabaseStatus::Critical => critical_count += 1,
        }
    }

    SqlHealthScore {
        overall_score: overall_score(performance_score, wait_stats_score, replication_score),
        performance_score,
        wait_stats_score,
        replication_score,
        database_count: databases.len() as u32,
        healthy_count,
        warning_count,
        critical_count,
        factors,
    }
}

/// Performance score of a single database row
pub fn performance_score_for(row: &SqlPerformanceRow) -> u8 {
    performance_score(
        row.dtu_percent,
        row.cpu_percent,
        row.deadlock_count.unwrap_or(0),
        row.blocked_count.unwrap_or(0),
    )
}
