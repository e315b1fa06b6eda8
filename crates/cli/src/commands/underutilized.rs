//! Underutilized resource report

use anyhow::Result;
use colored::Colorize;
use optimizer_lib::{
    scoring::UnderutilizationThresholds,
    snapshot::{UnderutilizedResponse, UnderutilizedSnapshot},
    SavingsBasis, UnderutilizedResourceReport,
};
use std::path::Path;
use tabled::Tabled;

use super::read_snapshot;
use crate::client::ApiClient;
use crate::output::{
    color_confidence, color_score, format_currency, print_heading, print_json, print_success,
    print_table, print_warning, OutputFormat,
};

/// Row for the underutilized resources table
#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Resource")]
    name: String,
    #[tabled(rename = "Type")]
    resource_type: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Monthly Cost")]
    monthly_cost: String,
    #[tabled(rename = "Savings")]
    savings: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
}

impl From<&UnderutilizedResourceReport> for ReportRow {
    fn from(report: &UnderutilizedResourceReport) -> Self {
        // Action and confidence follow the recommendation behind the savings figure
        let top = report.recommendations.iter().max_by(|a, b| {
            a.estimated_savings
                .partial_cmp(&b.estimated_savings)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let savings = match report.savings_basis {
            SavingsBasis::Recommendation => format_currency(report.potential_savings),
            SavingsBasis::CostHeuristic => format!("~{}", format_currency(report.potential_savings)),
        };
        Self {
            name: report.name.clone(),
            resource_type: short_type(&report.resource_type).to_string(),
            score: color_score(report.underutilization_score),
            monthly_cost: format_currency(report.monthly_cost),
            savings,
            action: top
                .map(|r| r.recommendation_type.as_str().to_string())
                .unwrap_or_else(|| "-".to_string()),
            confidence: top
                .map(|r| color_confidence(r.confidence))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Last segment of an Azure resource type
fn short_type(resource_type: &str) -> &str {
    resource_type.rsplit('/').next().unwrap_or(resource_type)
}

/// Score every resource in a snapshot and list the underutilized ones
///
/// Thresholds embedded in the snapshot win over `overrides` from the config
/// file; the service or built-in defaults apply when neither is set.
pub async fn show_underutilized(
    client: Option<&ApiClient>,
    snapshot_path: &Path,
    overrides: Option<UnderutilizationThresholds>,
    format: OutputFormat,
) -> Result<()> {
    let mut snapshot: UnderutilizedSnapshot = read_snapshot(snapshot_path)?;
    snapshot.thresholds = snapshot.thresholds.or(overrides);

    let response: UnderutilizedResponse = match client {
        Some(client) => client.post("api/v1/underutilized", &snapshot).await?,
        None => snapshot.evaluate(&UnderutilizationThresholds::default())?,
    };

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            if response.reports.is_empty() {
                print_success("No underutilized resources found");
                return Ok(());
            }

            print_heading("Underutilized Resources");
            print_table(response.reports.iter().map(ReportRow::from).collect());
            println!();

            let summary = &response.summary;
            println!("Resources:              {}", summary.resource_count);
            println!(
                "Monthly cost:           {}",
                format_currency(summary.total_monthly_cost)
            );
            println!("Average score:          {:.1}", summary.average_score);
            println!(
                "{} {}",
                "Potential Savings:".bold(),
                format_currency(summary.total_potential_savings).green().bold()
            );

            if response
                .reports
                .iter()
                .any(|r| r.savings_basis == SavingsBasis::CostHeuristic)
            {
                println!();
                print_warning("Savings marked ~ are estimated from cost alone");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use optimizer_lib::{evaluate_resource, MetricCategory, MetricUsage, ResourceRow, UsageProfile};
    use std::io::Write;

    #[test]
    fn test_row_shows_recommendation_with_largest_savings() {
        let resource = ResourceRow {
            id: "vm1".to_string(),
            name: "vm-batch".to_string(),
            resource_type: "Microsoft.Compute/virtualMachines".to_string(),
            resource_group: None,
            location: None,
            sku: None,
        };
        let mut usage = UsageProfile::default();
        usage.set(MetricUsage::new(MetricCategory::Cpu, 25.0, 50.0, "Percent"));

        let report = evaluate_resource(&resource, usage, &UnderutilizationThresholds::default(), 200.0);
        assert_eq!(report.recommendations.len(), 2);

        let row = ReportRow::from(&report);
        assert_eq!(row.action, "spot");
        assert!(row.confidence.contains("low"));
        assert_eq!(row.savings, format_currency(120.0));
    }

    #[tokio::test]
    async fn test_remote_request_carries_config_thresholds() {
        let overrides = UnderutilizationThresholds {
            min_monthly_cost: 500.0,
            ..Default::default()
        };
        let empty_response = UnderutilizedSnapshot::default()
            .evaluate(&overrides)
            .unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/underutilized")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "thresholds": {"min_monthly_cost": 500.0}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&empty_response).unwrap())
            .create_async()
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"resources": [], "metrics": [], "costs": []}}"#).unwrap();

        let client = ApiClient::new(&server.url()).unwrap();
        show_underutilized(Some(&client), file.path(), Some(overrides), OutputFormat::Json)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn test_short_type() {
        assert_eq!(short_type("Microsoft.Compute/virtualMachines"), "virtualMachines");
        assert_eq!(short_type("Microsoft.Sql/servers/databases"), "databases");
        assert_eq!(short_type("custom"), "custom");
    }
}
