//! Effective threshold display

use anyhow::Result;
use optimizer_lib::scoring::UnderutilizationThresholds;

use crate::client::ApiClient;
use crate::output::{format_currency, print_heading, print_info, print_json, OutputFormat};

/// Show the thresholds in effect, from the service when a client is given
pub async fn show_thresholds(
    client: Option<&ApiClient>,
    local: UnderutilizationThresholds,
    format: OutputFormat,
) -> Result<()> {
    let thresholds = match client {
        Some(client) => client.get("api/v1/thresholds").await?,
        None => local,
    };

    match format {
        OutputFormat::Json => print_json(&thresholds)?,
        OutputFormat::Table => {
            print_heading("Underutilization Thresholds");
            println!("CPU:                    {:.1}%", thresholds.cpu);
            println!("Memory:                 {:.1}%", thresholds.memory);
            println!("DTU:                    {:.1}%", thresholds.dtu);
            println!("Storage:                {:.1}%", thresholds.storage);
            println!(
                "Minimum monthly cost:   {}",
                format_currency(thresholds.min_monthly_cost)
            );
            println!("Lookback:               {} days", thresholds.lookback_days);
            if client.is_some() {
                println!();
                print_info("Thresholds reported by the service");
            }
        }
    }

    Ok(())
}
