//! Storage growth projection

use anyhow::Result;
use colored::Colorize;
use optimizer_lib::{snapshot::StorageSnapshot, storage::StorageProjection};
use std::path::Path;

use super::read_snapshot;
use crate::client::ApiClient;
use crate::output::{color_storage_status, print_heading, print_json, OutputFormat};

/// Project when storage fills up from a series of usage samples
pub async fn show_storage(
    client: Option<&ApiClient>,
    snapshot_path: &Path,
    capacity: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let mut snapshot: StorageSnapshot = read_snapshot(snapshot_path)?;
    snapshot.capacity = capacity.or(snapshot.capacity);

    let projection: StorageProjection = match client {
        Some(client) => client.post("api/v1/storage-projection", &snapshot).await?,
        None => snapshot.evaluate(None).ok_or_else(|| {
            anyhow::anyhow!("Storage projection needs at least two samples and a positive capacity")
        })?,
    };

    match format {
        OutputFormat::Json => print_json(&projection)?,
        OutputFormat::Table => {
            print_heading("Storage Projection");
            println!(
                "Used:                   {:.1} of {:.1} ({:.1}%)",
                projection.current_used, projection.capacity, projection.percent_used
            );
            println!("Growth per day:         {:.2}", projection.growth_per_day);
            match (projection.days_until_full, projection.projected_full_at) {
                (Some(days), Some(at)) => println!(
                    "Full in:                {:.1} days ({})",
                    days,
                    at.format("%Y-%m-%d")
                ),
                _ => println!("Full in:                {}", "not growing".dimmed()),
            }
            println!(
                "{} {}",
                "Status:".bold(),
                color_storage_status(projection.status)
            );
        }
    }

    Ok(())
}
