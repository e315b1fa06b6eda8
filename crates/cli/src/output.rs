//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use optimizer_lib::{
    cost::SpikeSeverity, scoring::DatabaseStatus, storage::StorageStatus, Confidence,
};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Print a bold section heading with an underline
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a cost amount in billing currency
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

/// Format an optional percentage, `-` when absent
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "-".to_string(),
    }
}

/// Color a 0-100 score by health band
pub fn color_score(score: u8) -> String {
    let formatted = score.to_string();
    match DatabaseStatus::from_score(score) {
        DatabaseStatus::Healthy => formatted.green().to_string(),
        DatabaseStatus::Warning => formatted.yellow().to_string(),
        DatabaseStatus::Critical => formatted.red().to_string(),
    }
}

pub fn color_database_status(status: DatabaseStatus) -> String {
    match status {
        DatabaseStatus::Healthy => "healthy".green().to_string(),
        DatabaseStatus::Warning => "warning".yellow().to_string(),
        DatabaseStatus::Critical => "critical".red().to_string(),
    }
}

pub fn color_storage_status(status: StorageStatus) -> String {
    match status {
        StorageStatus::Healthy => "healthy".green().to_string(),
        StorageStatus::Warning => "warning".yellow().to_string(),
        StorageStatus::Critical => "critical".red().to_string(),
    }
}

/// Color confidence level
pub fn color_confidence(confidence: Confidence) -> String {
    match confidence {
        Confidence::High => confidence.as_str().green().to_string(),
        Confidence::Medium => confidence.as_str().yellow().to_string(),
        Confidence::Low => confidence.as_str().red().to_string(),
    }
}

pub fn color_severity(severity: SpikeSeverity) -> String {
    match severity {
        SpikeSeverity::Warning => severity.as_str().yellow().to_string(),
        SpikeSeverity::High => severity.as_str().red().to_string(),
        SpikeSeverity::Critical => severity.as_str().red().bold().to_string(),
    }
}
