//! SQL database health summary

use anyhow::Result;
use colored::Colorize;
use optimizer_lib::{
    scoring::{DatabaseStatus, SqlHealthScore},
    snapshot::SqlHealthSnapshot,
};
use std::path::Path;

use super::read_snapshot;
use crate::client::ApiClient;
use crate::output::{
    color_database_status, color_score, format_percent, print_heading, print_info, print_json,
    OutputFormat,
};

/// Score SQL health from a snapshot of performance, wait and replication rows
pub async fn show_sql_health(
    client: Option<&ApiClient>,
    snapshot_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let snapshot: SqlHealthSnapshot = read_snapshot(snapshot_path)?;

    let score: SqlHealthScore = match client {
        Some(client) => client.post("api/v1/sql-health", &snapshot).await?,
        None => snapshot.evaluate(),
    };

    match format {
        OutputFormat::Json => print_json(&score)?,
        OutputFormat::Table => {
            if score.database_count == 0 {
                print_info("No SQL performance data in snapshot");
                return Ok(());
            }

            print_heading("SQL Health");
            println!(
                "{} {} ({})",
                "Overall:".bold(),
                color_score(score.overall_score),
                color_database_status(DatabaseStatus::from_score(score.overall_score))
            );
            println!("Performance:            {}", color_score(score.performance_score));
            println!("Wait statistics:        {}", color_score(score.wait_stats_score));
            println!("Replication:            {}", color_score(score.replication_score));
            println!();

            println!("{}", "Databases".bold());
            println!("{}", "-".repeat(50));
            println!("Total:                  {}", score.database_count);
            println!("Healthy:                {}", score.healthy_count.to_string().green());
            println!("Warning:                {}", score.warning_count.to_string().yellow());
            println!("Critical:               {}", score.critical_count.to_string().red());
            println!();

            let factors = &score.factors;
            println!("{}", "Factors".bold());
            println!("{}", "-".repeat(50));
            println!("Avg DTU:                {}", format_percent(factors.avg_dtu_percent));
            println!("Avg CPU:                {}", format_percent(factors.avg_cpu_percent));
            println!("High-DTU databases:     {}", factors.high_dtu_count);
            println!("Deadlocks:              {}", factors.deadlock_count);
            println!("Blocked processes:      {}", factors.blocked_count);
            if let (Some(wait_type), Some(wait_ms)) =
                (&factors.top_wait_type, factors.top_wait_time_ms)
            {
                println!("Top wait:               {} ({:.0} ms)", wait_type, wait_ms);
            }
            println!("Replication issues:     {}", factors.replication_issues);
            if let Some(lag) = factors.avg_replication_lag {
                println!("Avg replication lag:    {:.1}s", lag);
            }
        }
    }

    Ok(())
}
