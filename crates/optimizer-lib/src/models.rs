//! Core data models for the optimizer
//!
//! Row types mirror what the backend data layer returns. Derived types
//! (`MetricUsage`, `UsageProfile`) are built per resource per request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// Resource metadata row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRow {
    pub id: String,
    pub name: String,
    pub resource_type: String,
    #[serde(default)]
    pub resource_group: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
}

/// Raw metric aggregate for one resource at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub resource_id: String,
    pub metric_name: String,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Cost row for a single resource and usage day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    pub resource_id: String,
    pub cost_amount: f64,
    pub usage_date: NaiveDate,
}

/// SQL database performance snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlPerformanceRow {
    pub resource_id: String,
    #[serde(default)]
    pub dtu_percent: Option<f64>,
    #[serde(default)]
    pub cpu_percent: Option<f64>,
    #[serde(default)]
    pub deadlock_count: Option<u64>,
    #[serde(default)]
    pub blocked_count: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

/// Accumulated wait time for one wait type on one database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitStatRow {
    pub resource_id: String,
    pub wait_type: String,
    pub wait_time_ms: f64,
}

/// Geo-replication link state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationLinkRow {
    pub resource_id: String,
    pub replication_state: String,
    #[serde(default)]
    pub replication_lag_seconds: Option<f64>,
}

/// Utilization category a metric name maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricCategory {
    Cpu,
    Memory,
    Dtu,
    Storage,
    Network,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 5] = [
        MetricCategory::Cpu,
        MetricCategory::Memory,
        MetricCategory::Dtu,
        MetricCategory::Storage,
        MetricCategory::Network,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::Cpu => "cpu",
            MetricCategory::Memory => "memory",
            MetricCategory::Dtu => "dtu",
            MetricCategory::Storage => "storage",
            MetricCategory::Network => "network",
        }
    }
}

impl std::fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated usage of one category over the lookback window
///
/// Deserialized values pass through [`MetricUsage::new`], so negative
/// readings are clamped to zero wherever the usage comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MetricUsageFields")]
pub struct MetricUsage {
    pub category: MetricCategory,
    pub avg_value: f64,
    pub max_value: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Deserialize)]
struct MetricUsageFields {
    category: MetricCategory,
    avg_value: f64,
    max_value: f64,
    #[serde(default)]
    unit: String,
}

impl From<MetricUsageFields> for MetricUsage {
    fn from(fields: MetricUsageFields) -> Self {
        Self::new(fields.category, fields.avg_value, fields.max_value, fields.unit)
    }
}

impl MetricUsage {
    pub fn new(category: MetricCategory, avg_value: f64, max_value: f64, unit: impl Into<String>) -> Self {
        Self {
            category,
            avg_value: avg_value.max(0.0),
            max_value: max_value.max(0.0),
            unit: unit.into(),
        }
    }
}

/// Per-category usage of a resource
///
/// A missing category stays `None`: an unmeasured metric is never treated
/// as a measured zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageProfile {
    #[serde(default)]
    pub cpu: Option<MetricUsage>,
    #[serde(default)]
    pub memory: Option<MetricUsage>,
    #[serde(default)]
    pub dtu: Option<MetricUsage>,
    #[serde(default)]
    pub storage: Option<MetricUsage>,
    #[serde(default)]
    pub network: Option<MetricUsage>,
}

impl UsageProfile {
    pub fn get(&self, category: MetricCategory) -> Option<&MetricUsage> {
        match category {
            MetricCategory::Cpu => self.cpu.as_ref(),
            MetricCategory::Memory => self.memory.as_ref(),
            MetricCategory::Dtu => self.dtu.as_ref(),
            MetricCategory::Storage => self.storage.as_ref(),
            MetricCategory::Network => self.network.as_ref(),
        }
    }

    /// Store usage under its own category, replacing any previous value
    pub fn set(&mut self, usage: MetricUsage) {
        let slot = match usage.category {
            MetricCategory::Cpu => &mut self.cpu,
            MetricCategory::Memory => &mut self.memory,
            MetricCategory::Dtu => &mut self.dtu,
            MetricCategory::Storage => &mut self.storage,
            MetricCategory::Network => &mut self.network,
        };
        *slot = Some(usage);
    }

    /// Iterate over the categories that were measured
    pub fn present(&self) -> impl Iterator<Item = &MetricUsage> {
        MetricCategory::ALL.into_iter().filter_map(move |c| self.get(c))
    }

    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// Check that every slot holds usage of its own category
    pub fn validate(&self) -> Result<()> {
        for slot in MetricCategory::ALL {
            if let Some(usage) = self.get(slot) {
                if usage.category != slot {
                    return Err(ScoringError::UsageCategoryMismatch {
                        slot,
                        category: usage.category,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_profile_set_and_get() {
        let mut usage = UsageProfile::default();
        assert!(usage.is_empty());

        usage.set(MetricUsage::new(MetricCategory::Dtu, 10.0, 50.0, "Percent"));
        assert!(usage.cpu.is_none());
        assert_eq!(usage.get(MetricCategory::Dtu).map(|u| u.avg_value), Some(10.0));
        assert_eq!(usage.present().count(), 1);
    }

    #[test]
    fn test_metric_usage_clamps_negative_values() {
        let usage = MetricUsage::new(MetricCategory::Cpu, -1.0, -5.0, "Percent");
        assert_eq!(usage.avg_value, 0.0);
        assert_eq!(usage.max_value, 0.0);
    }

    #[test]
    fn test_deserialized_usage_is_clamped() {
        let usage: MetricUsage = serde_json::from_str(
            r#"{"category": "cpu", "avg_value": -3.0, "max_value": 12.0}"#,
        )
        .unwrap();
        assert_eq!(usage.avg_value, 0.0);
        assert_eq!(usage.max_value, 12.0);
        assert_eq!(usage.unit, "");
    }

    #[test]
    fn test_validate_rejects_slot_category_mismatch() {
        let usage: UsageProfile = serde_json::from_str(
            r#"{"cpu": {"category": "memory", "avg_value": 5.0, "max_value": 10.0}}"#,
        )
        .unwrap();
        assert_eq!(
            usage.validate(),
            Err(ScoringError::UsageCategoryMismatch {
                slot: MetricCategory::Cpu,
                category: MetricCategory::Memory,
            })
        );

        let mut matching = UsageProfile::default();
        matching.set(MetricUsage::new(MetricCategory::Memory, 5.0, 10.0, "Percent"));
        assert_eq!(matching.validate(), Ok(()));
    }

    #[test]
    fn test_absent_categories_serialize_as_null() {
        let json = serde_json::to_value(UsageProfile::default()).unwrap();
        assert!(json["cpu"].is_null());
        assert!(json["network"].is_null());
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&MetricCategory::Storage).unwrap();
        assert_eq!(json, "\"storage\"");
    }
}
