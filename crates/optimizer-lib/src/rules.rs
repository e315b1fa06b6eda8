//! Declarative rule tables
//!
//! Every weight, tier and cut point used by the scorers lives here so the
//! rule cascade can be audited and tested without running a full scoring pass.

use crate::models::MetricCategory;

/// Ordered substring rules for metric classification (first match wins)
pub const CLASSIFICATION_RULES: &[(MetricCategory, &[&str])] = &[
    (MetricCategory::Cpu, &["cpu"]),
    (MetricCategory::Memory, &["memory", "workingset"]),
    (MetricCategory::Dtu, &["dtu"]),
    (MetricCategory::Storage, &["storage", "capacity", "disk"]),
    (MetricCategory::Network, &["network", "ingress", "egress"]),
];

/// Weight of each category in the underutilization score
///
/// Network is measured but not weighted.
pub const CATEGORY_WEIGHTS: &[(MetricCategory, f64)] = &[
    (MetricCategory::Cpu, 3.0),
    (MetricCategory::Dtu, 3.0),
    (MetricCategory::Memory, 2.0),
    (MetricCategory::Storage, 1.0),
];

pub fn category_weight(category: MetricCategory) -> Option<f64> {
    CATEGORY_WEIGHTS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, w)| *w)
}

/// A penalty applied when a value is strictly above `above`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyTier {
    pub above: f64,
    pub points: u32,
}

/// Tiers ordered from the highest cut point down; only the first match applies
#[derive(Debug, Clone, Copy)]
pub struct PenaltyTable {
    pub tiers: &'static [PenaltyTier],
}

impl PenaltyTable {
    pub const fn new(tiers: &'static [PenaltyTier]) -> Self {
        Self { tiers }
    }

    pub fn penalty(&self, value: f64) -> u32 {
        self.tiers
            .iter()
            .find(|tier| value > tier.above)
            .map(|tier| tier.points)
            .unwrap_or(0)
    }
}

const fn tier(above: f64, points: u32) -> PenaltyTier {
    PenaltyTier { above, points }
}

/// DTU or CPU percent
pub const UTILIZATION_PENALTIES: PenaltyTable =
    PenaltyTable::new(&[tier(90.0, 40), tier(80.0, 25), tier(70.0, 10)]);

pub const DEADLOCK_PENALTIES: PenaltyTable =
    PenaltyTable::new(&[tier(10.0, 30), tier(5.0, 20), tier(0.0, 10)]);

pub const BLOCKED_PENALTIES: PenaltyTable =
    PenaltyTable::new(&[tier(20.0, 20), tier(10.0, 10), tier(0.0, 5)]);

/// Top wait time, in seconds
pub const WAIT_TIME_PENALTIES: PenaltyTable = PenaltyTable::new(&[
    tier(10_000.0, 40),
    tier(5_000.0, 25),
    tier(1_000.0, 15),
    tier(100.0, 5),
]);

pub const REPLICATION_ISSUE_PENALTIES: PenaltyTable =
    PenaltyTable::new(&[tier(5.0, 30), tier(2.0, 15), tier(0.0, 5)]);

/// Average replication lag, in seconds
pub const REPLICATION_LAG_PENALTIES: PenaltyTable = PenaltyTable::new(&[
    tier(300.0, 40),
    tier(60.0, 25),
    tier(30.0, 15),
    tier(10.0, 5),
]);

/// Weights of the SQL sub-scores in the overall score
pub const SQL_PERFORMANCE_WEIGHT: f64 = 0.5;
pub const SQL_WAIT_STATS_WEIGHT: f64 = 0.3;
pub const SQL_REPLICATION_WEIGHT: f64 = 0.2;

/// DTU percent above which a database counts toward `high_dtu_count`
pub const HIGH_DTU_PERCENT: f64 = 80.0;

/// Per-database status cut points on the performance score
pub const SQL_HEALTHY_MIN_SCORE: u8 = 80;
pub const SQL_WARNING_MIN_SCORE: u8 = 50;

/// Replication states that are not counted as issues
pub const HEALTHY_REPLICATION_STATES: &[&str] = &["catch_up", "synchronized", "seeding"];

/// Lag above which a link in a healthy state still counts as an issue
pub const REPLICATION_LAG_ISSUE_SECS: f64 = 60.0;

/// Savings percent chosen by the first tier whose `below` exceeds the value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsTier {
    pub below: f64,
    pub percent: f64,
}

pub fn tiered_savings(tiers: &[SavingsTier], value: f64, fallback: f64) -> f64 {
    tiers
        .iter()
        .find(|t| value < t.below)
        .map(|t| t.percent)
        .unwrap_or(fallback)
}

pub const DEALLOCATE_MAX_CPU_AVG: f64 = 5.0;
pub const DEALLOCATE_MAX_CPU_PEAK: f64 = 20.0;
pub const DEALLOCATE_HIGH_CONFIDENCE_PEAK: f64 = 10.0;
pub const DEALLOCATE_SAVINGS_PERCENT: f64 = 70.0;

pub const DOWNSIZE_MAX_CPU_PEAK: f64 = 60.0;
pub const DOWNSIZE_HIGH_CONFIDENCE_PEAK: f64 = 40.0;
pub const DOWNSIZE_HIGH_CONFIDENCE_AVG: f64 = 10.0;
pub const DOWNSIZE_SAVINGS_TIERS: &[SavingsTier] = &[
    SavingsTier { below: 10.0, percent: 50.0 },
    SavingsTier { below: 15.0, percent: 35.0 },
];
pub const DOWNSIZE_DEFAULT_SAVINGS_PERCENT: f64 = 25.0;

pub const RESERVED_MIN_MONTHLY_COST: f64 = 100.0;
pub const RESERVED_SQL_SAVINGS_PERCENT: f64 = 40.0;
pub const RESERVED_VM_SAVINGS_PERCENT: f64 = 35.0;

pub const SPOT_MAX_CPU_AVG: f64 = 30.0;
pub const SPOT_SAVINGS_PERCENT: f64 = 60.0;

pub const MEMORY_DOWNSIZE_MAX_PEAK: f64 = 50.0;
pub const MEMORY_DOWNSIZE_SAVINGS_PERCENT: f64 = 20.0;

/// Share of monthly cost reported as potential savings when no rule fires
pub const FALLBACK_SAVINGS_PERCENT: f64 = 30.0;

pub const VM_TYPE_MARKER: &str = "virtualmachines";
pub const SQL_TYPE_MARKER: &str = "sql";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_first_matching_tier_only() {
        assert_eq!(UTILIZATION_PENALTIES.penalty(95.0), 40);
        assert_eq!(UTILIZATION_PENALTIES.penalty(85.0), 25);
        assert_eq!(UTILIZATION_PENALTIES.penalty(75.0), 10);
        assert_eq!(UTILIZATION_PENALTIES.penalty(70.0), 0);
    }

    #[test]
    fn test_penalty_zero_tier_requires_strictly_positive() {
        assert_eq!(DEADLOCK_PENALTIES.penalty(0.0), 0);
        assert_eq!(DEADLOCK_PENALTIES.penalty(1.0), 10);
        assert_eq!(BLOCKED_PENALTIES.penalty(21.0), 20);
    }

    #[test]
    fn test_tables_are_ordered_descending() {
        for table in [
            UTILIZATION_PENALTIES,
            DEADLOCK_PENALTIES,
            BLOCKED_PENALTIES,
            WAIT_TIME_PENALTIES,
            REPLICATION_ISSUE_PENALTIES,
            REPLICATION_LAG_PENALTIES,
        ] {
            for pair in table.tiers.windows(2) {
                assert!(pair[0].above > pair[1].above);
                assert!(pair[0].points >= pair[1].points);
            }
        }
    }

    #[test]
    fn test_category_weights() {
        assert_eq!(category_weight(MetricCategory::Cpu), Some(3.0));
        assert_eq!(category_weight(MetricCategory::Dtu), Some(3.0));
        assert_eq!(category_weight(MetricCategory::Memory), Some(2.0));
        assert_eq!(category_weight(MetricCategory::Storage), Some(1.0));
        assert_eq!(category_weight(MetricCategory::Network), None);
    }

    #[test]
    fn test_downsize_tiers() {
        let pick = |v| tiered_savings(DOWNSIZE_SAVINGS_TIERS, v, DOWNSIZE_DEFAULT_SAVINGS_PERCENT);
        assert_eq!(pick(5.0), 50.0);
        assert_eq!(pick(12.0), 35.0);
        assert_eq!(pick(18.0), 25.0);
    }

    #[test]
    fn test_sql_weights_sum_to_one() {
        let total = SQL_PERFORMANCE_WEIGHT + SQL_WAIT_STATS_WEIGHT + SQL_REPLICATION_WEIGHT;
        assert!((total - 1.0).abs() < f64::EPSILON);
    }
}
