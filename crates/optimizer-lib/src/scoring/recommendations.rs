//! Rightsizing recommendation rules
//!
//! Each rule is checked independently; every rule that matches contributes
//! one recommendation.

use serde::{Deserialize, Serialize};

use crate::models::{ResourceRow, UsageProfile};
use crate::rules::*;

use super::thresholds::UnderutilizationThresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Downsize,
    Deallocate,
    Reserved,
    Spot,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::Downsize => "downsize",
            RecommendationType::Deallocate => "deallocate",
            RecommendationType::Reserved => "reserved",
            RecommendationType::Spot => "spot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RightsizingRecommendation {
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,
    pub title: String,
    pub description: String,
    pub estimated_savings: f64,
    pub savings_percent: f64,
    pub confidence: Confidence,
}

impl RightsizingRecommendation {
    fn new(
        recommendation_type: RecommendationType,
        title: impl Into<String>,
        description: impl Into<String>,
        monthly_cost: f64,
        savings_percent: f64,
        confidence: Confidence,
    ) -> Self {
        let savings_percent = savings_percent.clamp(0.0, 100.0);
        Self {
            recommendation_type,
            title: title.into(),
            description: description.into(),
            estimated_savings: monthly_cost.max(0.0) * savings_percent / 100.0,
            savings_percent,
            confidence,
        }
    }
}

/// Generate every rightsizing recommendation that applies to a resource
///
/// DTU stands in for CPU when a database reports no CPU metric.
pub fn generate_recommendations(
    resource: &ResourceRow,
    usage: &UsageProfile,
    thresholds: &UnderutilizationThresholds,
    monthly_cost: f64,
) -> Vec<RightsizingRecommendation> {
    let mut recommendations = Vec::new();
    let resource_type = resource.resource_type.to_lowercase();
    let is_vm = resource_type.contains(VM_TYPE_MARKER);
    let is_sql = resource_type.contains(SQL_TYPE_MARKER);
    let sku = resource.sku.as_deref().unwrap_or("current SKU");

    let cpu_source = usage.cpu.as_ref().or(usage.dtu.as_ref());
    let cpu_avg = cpu_source.map(|u| u.avg_value);
    let cpu_max = cpu_source.map(|u| u.max_value);

    if let (Some(avg), Some(max)) = (cpu_avg, cpu_max) {
        if avg < DEALLOCATE_MAX_CPU_AVG && max < DEALLOCATE_MAX_CPU_PEAK {
            let confidence = if max < DEALLOCATE_HIGH_CONFIDENCE_PEAK {
                Confidence::High
            } else {
                Confidence::Medium
            };
            recommendations.push(RightsizingRecommendation::new(
                RecommendationType::Deallocate,
                "Deallocate or delete idle resource",
                format!(
                    "{} averaged {:.1}% utilization with a peak of {:.1}%; it appears idle and can be stopped or removed.",
                    resource.name, avg, max
                ),
                monthly_cost,
                DEALLOCATE_SAVINGS_PERCENT,
                confidence,
            ));
        }

        if avg < thresholds.cpu && max < DOWNSIZE_MAX_CPU_PEAK {
            let percent = tiered_savings(DOWNSIZE_SAVINGS_TIERS, avg, DOWNSIZE_DEFAULT_SAVINGS_PERCENT);
            let confidence = if max < DOWNSIZE_HIGH_CONFIDENCE_PEAK || avg < DOWNSIZE_HIGH_CONFIDENCE_AVG {
                Confidence::High
            } else {
                Confidence::Medium
            };
            recommendations.push(RightsizingRecommendation::new(
                RecommendationType::Downsize,
                format!("Downsize from {}", sku),
                format!(
                    "Average utilization of {:.1}% (peak {:.1}%) is below the {:.0}% threshold; a smaller tier would cover the observed load.",
                    avg, max, thresholds.cpu
                ),
                monthly_cost,
                percent,
                confidence,
            ));
        }
    }

    if (is_vm || is_sql) && monthly_cost > RESERVED_MIN_MONTHLY_COST {
        let percent = if is_sql {
            RESERVED_SQL_SAVINGS_PERCENT
        } else {
            RESERVED_VM_SAVINGS_PERCENT
        };
        recommendations.push(RightsizingRecommendation::new(
            RecommendationType::Reserved,
            "Purchase reserved capacity",
            format!(
                "Steady spend on {} can be covered by a 1-year reservation for roughly {:.0}% off pay-as-you-go pricing.",
                resource.name, percent
            ),
            monthly_cost,
            percent,
            Confidence::Medium,
        ));
    }

    if is_vm {
        if let Some(avg) = cpu_avg {
            if avg < SPOT_MAX_CPU_AVG {
                recommendations.push(RightsizingRecommendation::new(
                    RecommendationType::Spot,
                    "Consider spot instances",
                    format!(
                        "{} runs at {:.1}% average CPU; interruptible workloads on this VM could move to spot pricing.",
                        resource.name, avg
                    ),
                    monthly_cost,
                    SPOT_SAVINGS_PERCENT,
                    Confidence::Low,
                ));
            }
        }
    }

    if let Some(memory) = usage.memory.as_ref() {
        if memory.avg_value < thresholds.memory && memory.max_value < MEMORY_DOWNSIZE_MAX_PEAK {
            recommendations.push(RightsizingRecommendation::new(
                RecommendationType::Downsize,
                "Reduce memory allocation",
                format!(
                    "Memory averaged {:.1}% with a peak of {:.1}%; a memory-lighter SKU would fit.",
                    memory.avg_value, memory.max_value
                ),
                monthly_cost,
                MEMORY_DOWNSIZE_SAVINGS_PERCENT,
                Confidence::Medium,
            ));
        }
    }

    recommendations
}

/// Largest savings across recommendations, if any fired
pub fn max_savings(recommendations: &[RightsizingRecommendation]) -> Option<f64> {
    recommendations
        .iter()
        .map(|r| r.estimated_savings)
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricCategory, MetricUsage};

    fn resource(resource_type: &str) -> ResourceRow {
        ResourceRow {
            id: "r1".to_string(),
            name: "vm-web-01".to_string(),
            resource_type: resource_type.to_string(),
            resource_group: Some("rg-prod".to_string()),
            location: Some("westeurope".to_string()),
            sku: Some("Standard_D4s_v3".to_string()),
        }
    }

    fn usage_with(category: MetricCategory, avg: f64, max: f64) -> UsageProfile {
        let mut usage = UsageProfile::default();
        usage.set(MetricUsage::new(category, avg, max, "Percent"));
        usage
    }

    fn find(recs: &[RightsizingRecommendation], t: RecommendationType) -> Option<&RightsizingRecommendation> {
        recs.iter().find(|r| r.recommendation_type == t)
    }

    #[test]
    fn test_idle_resource_deallocate() {
        let usage = usage_with(MetricCategory::Cpu, 3.0, 15.0);
        let recs = generate_recommendations(
            &resource("Microsoft.Web/sites"),
            &usage,
            &UnderutilizationThresholds::default(),
            200.0,
        );

        let dealloc = find(&recs, RecommendationType::Deallocate).unwrap();
        assert!((dealloc.estimated_savings - 140.0).abs() < 1e-9);
        assert_eq!(dealloc.savings_percent, 70.0);
        // peak 15 is not below 10, so confidence drops a level
        assert_eq!(dealloc.confidence, Confidence::Medium);
    }

    #[test]
    fn test_idle_vm_deallocate_follows_peak_rule() {
        let usage = usage_with(MetricCategory::Cpu, 3.0, 15.0);
        let recs = generate_recommendations(
            &resource("Microsoft.Compute/virtualMachines"),
            &usage,
            &UnderutilizationThresholds::default(),
            200.0,
        );

        let dealloc = find(&recs, RecommendationType::Deallocate).unwrap();
        assert!((dealloc.estimated_savings - 140.0).abs() < 1e-9);
        assert_eq!(dealloc.confidence, Confidence::Medium);
        assert_eq!(recs[0].recommendation_type, RecommendationType::Deallocate);
    }

    #[test]
    fn test_deallocate_high_confidence_with_low_peak() {
        let usage = usage_with(MetricCategory::Cpu, 3.0, 8.0);
        let recs = generate_recommendations(
            &resource("Microsoft.Web/sites"),
            &usage,
            &UnderutilizationThresholds::default(),
            200.0,
        );
        let dealloc = find(&recs, RecommendationType::Deallocate).unwrap();
        assert_eq!(dealloc.estimated_savings, 140.0);
        assert_eq!(dealloc.confidence, Confidence::High);
    }

    #[test]
    fn test_downsize_tiers_and_confidence() {
        let thresholds = UnderutilizationThresholds::default();
        let r = resource("Microsoft.Web/serverFarms");

        let recs = generate_recommendations(&r, &usage_with(MetricCategory::Cpu, 8.0, 55.0), &thresholds, 100.0);
        let down = find(&recs, RecommendationType::Downsize).unwrap();
        assert_eq!(down.savings_percent, 50.0);
        assert_eq!(down.confidence, Confidence::High);

        let recs = generate_recommendations(&r, &usage_with(MetricCategory::Cpu, 12.0, 50.0), &thresholds, 100.0);
        let down = find(&recs, RecommendationType::Downsize).unwrap();
        assert_eq!(down.savings_percent, 35.0);
        assert_eq!(down.confidence, Confidence::Medium);

        let recs = generate_recommendations(&r, &usage_with(MetricCategory::Cpu, 18.0, 30.0), &thresholds, 100.0);
        let down = find(&recs, RecommendationType::Downsize).unwrap();
        assert_eq!(down.savings_percent, 25.0);
        assert_eq!(down.confidence, Confidence::High);

        let recs = generate_recommendations(&r, &usage_with(MetricCategory::Cpu, 18.0, 75.0), &thresholds, 100.0);
        assert!(find(&recs, RecommendationType::Downsize).is_none());
    }

    #[test]
    fn test_dtu_used_as_cpu_proxy() {
        let usage = usage_with(MetricCategory::Dtu, 2.0, 9.0);
        let recs = generate_recommendations(
            &resource("Microsoft.Sql/servers/databases"),
            &usage,
            &UnderutilizationThresholds::default(),
            50.0,
        );
        assert!(find(&recs, RecommendationType::Deallocate).is_some());
        assert!(find(&recs, RecommendationType::Downsize).is_some());
        // below the reservation cost floor
        assert!(find(&recs, RecommendationType::Reserved).is_none());
    }

    #[test]
    fn test_reserved_capacity_by_type() {
        let usage = usage_with(MetricCategory::Cpu, 70.0, 90.0);
        let thresholds = UnderutilizationThresholds::default();

        let sql = generate_recommendations(&resource("Microsoft.Sql/servers/databases"), &usage, &thresholds, 300.0);
        assert_eq!(find(&sql, RecommendationType::Reserved).unwrap().savings_percent, 40.0);

        let vm = generate_recommendations(&resource("Microsoft.Compute/virtualMachines"), &usage, &thresholds, 300.0);
        let reserved = find(&vm, RecommendationType::Reserved).unwrap();
        assert_eq!(reserved.savings_percent, 35.0);
        assert_eq!(reserved.confidence, Confidence::Medium);
        assert!(find(&vm, RecommendationType::Spot).is_none());

        let cheap = generate_recommendations(&resource("Microsoft.Compute/virtualMachines"), &usage, &thresholds, 100.0);
        assert!(find(&cheap, RecommendationType::Reserved).is_none());
    }

    #[test]
    fn test_spot_for_light_vms() {
        let usage = usage_with(MetricCategory::Cpu, 25.0, 70.0);
        let recs = generate_recommendations(
            &resource("Microsoft.Compute/virtualMachines"),
            &usage,
            &UnderutilizationThresholds::default(),
            80.0,
        );
        let spot = find(&recs, RecommendationType::Spot).unwrap();
        assert_eq!(spot.confidence, Confidence::Low);
        assert_eq!(spot.estimated_savings, 48.0);
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn test_memory_oversized() {
        let usage = usage_with(MetricCategory::Memory, 20.0, 45.0);
        let recs = generate_recommendations(
            &resource("Microsoft.Web/sites"),
            &usage,
            &UnderutilizationThresholds::default(),
            100.0,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].recommendation_type, RecommendationType::Downsize);
        assert_eq!(recs[0].estimated_savings, 20.0);
    }

    #[test]
    fn test_no_metrics_no_usage_rules() {
        let recs = generate_recommendations(
            &resource("Microsoft.Storage/storageAccounts"),
            &UsageProfile::default(),
            &UnderutilizationThresholds::default(),
            500.0,
        );
        assert!(recs.is_empty());
        assert_eq!(max_savings(&recs), None);
    }

    #[test]
    fn test_savings_bounded_by_cost() {
        let thresholds = UnderutilizationThresholds::default();
        for cost in [0.0, 10.0, 150.0, 10_000.0, -25.0] {
            let mut usage = usage_with(MetricCategory::Cpu, 1.0, 2.0);
            usage.set(MetricUsage::new(MetricCategory::Memory, 5.0, 10.0, "Percent"));
            let recs = generate_recommendations(&resource("Microsoft.Compute/virtualMachines"), &usage, &thresholds, cost);
            for rec in &recs {
                assert!(rec.estimated_savings >= 0.0);
                assert!(rec.estimated_savings <= cost.max(0.0));
            }
        }
    }

    #[test]
    fn test_recommendation_type_serializes_as_type() {
        let usage = usage_with(MetricCategory::Cpu, 1.0, 2.0);
        let recs = generate_recommendations(
            &resource("Microsoft.Web/sites"),
            &usage,
            &UnderutilizationThresholds::default(),
            10.0,
        );
        let json = serde_json::to_value(&recs[0]).unwrap();
        assert_eq!(json["type"], "deallocate");
        assert_eq!(json["confidence"], "high");
    }
}
