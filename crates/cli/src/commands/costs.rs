//! Cost-related CLI commands

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use optimizer_lib::snapshot::{CostSnapshot, CostTrendResponse};
use std::path::Path;
use tabled::Tabled;

use super::read_snapshot;
use crate::client::ApiClient;
use crate::output::{
    color_severity, format_currency, format_percent, print_heading, print_info, print_json,
    print_success, print_table, OutputFormat,
};

/// Row for the cost spikes table
#[derive(Tabled)]
struct SpikeRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Cost")]
    amount: String,
    #[tabled(rename = "Previous")]
    previous: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "Z-Score")]
    z_score: String,
    #[tabled(rename = "Severity")]
    severity: String,
}

/// Show daily cost trend, month-end projection and spikes
pub async fn show_trend(
    client: Option<&ApiClient>,
    snapshot_path: &Path,
    today: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<()> {
    let mut snapshot: CostSnapshot = read_snapshot(snapshot_path)?;
    snapshot.today = today.or(snapshot.today);

    let response: CostTrendResponse = match client {
        Some(client) => client.post("api/v1/cost-trend", &snapshot).await?,
        None => snapshot.evaluate(),
    };

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            let Some(trend) = &response.trend else {
                print_info("No cost data in snapshot");
                return Ok(());
            };

            print_heading("Cost Trend");
            println!("Days:                   {}", response.series.len());
            println!("Total:                  {}", format_currency(trend.total_cost));
            println!("Daily average:          {}", format_currency(trend.daily_average));
            println!(
                "Day over day:           {}",
                format_percent(trend.day_over_day_change_percent)
            );
            println!("Slope:                  {}/day", format_currency(trend.slope_per_day));
            println!();
            println!("Month to date:          {}", format_currency(trend.month_to_date));
            println!(
                "{} {}",
                "Projected month end:".bold(),
                format_currency(trend.projected_month_end).cyan().bold()
            );
            println!();

            if response.spikes.is_empty() {
                print_success("No cost spikes detected");
            } else {
                println!("{}", "Cost Spikes".bold());
                println!("{}", "-".repeat(50));
                let rows = response
                    .spikes
                    .iter()
                    .map(|s| SpikeRow {
                        date: s.date.to_string(),
                        amount: format_currency(s.amount),
                        previous: format_currency(s.previous_amount),
                        change: format_percent(s.change_percent),
                        z_score: s
                            .z_score
                            .map(|z| format!("{:.2}", z))
                            .unwrap_or_else(|| "-".to_string()),
                        severity: color_severity(s.severity),
                    })
                    .collect();
                print_table(rows);
            }
        }
    }

    Ok(())
}
