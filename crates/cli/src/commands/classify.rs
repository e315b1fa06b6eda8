//! Metric name classification

use anyhow::Result;
use colored::Colorize;
use optimizer_lib::classify_metric;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_json, print_table, OutputFormat};

#[derive(Debug, Serialize)]
struct Classification {
    metric: String,
    category: Option<String>,
}

/// Row for the classification table
#[derive(Tabled)]
struct ClassificationRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Category")]
    category: String,
}

/// Classify each metric name into a resource category
pub fn classify(metrics: &[String], format: OutputFormat) -> Result<()> {
    let results: Vec<Classification> = metrics
        .iter()
        .map(|name| Classification {
            metric: name.clone(),
            category: classify_metric(name).map(|c| c.as_str().to_string()),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&results)?,
        OutputFormat::Table => {
            let rows = results
                .into_iter()
                .map(|r| ClassificationRow {
                    metric: r.metric,
                    category: r
                        .category
                        .map(|c| c.cyan().to_string())
                        .unwrap_or_else(|| "unclassified".dimmed().to_string()),
                })
                .collect();
            print_table(rows);
        }
    }

    Ok(())
}
