//! Azure resource optimizer CLI
//!
//! Scores snapshots of resource, metric, cost and SQL rows locally, or
//! hands them to the optimizer service when an API URL is configured.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{classify, costs, sql_health, storage, thresholds, underutilized};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Azure resource optimizer CLI
#[derive(Parser)]
#[command(name = "azopt")]
#[command(author, version, about = "Azure resource health and optimization scorer", long_about = None)]
pub struct Cli {
    /// Optimizer service URL; snapshots are scored locally when unset
    #[arg(long, env = "AZOPT_API_URL")]
    pub api_url: Option<String>,

    /// Path to the config file (defaults to ~/.config/azopt/config.json)
    #[arg(long, env = "AZOPT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify metric names into resource categories
    Classify {
        /// Metric names, e.g. "Percentage CPU"
        #[arg(required = true)]
        metrics: Vec<String>,
    },

    /// List underutilized resources with rightsizing recommendations
    Underutilized {
        /// JSON snapshot of resources, metrics and costs
        #[arg(long, short)]
        snapshot: PathBuf,
    },

    /// Score SQL database health
    SqlHealth {
        /// JSON snapshot of performance, wait and replication rows
        #[arg(long, short)]
        snapshot: PathBuf,
    },

    /// Cost trend analysis
    #[command(subcommand)]
    Costs(CostsCommands),

    /// Project storage growth against capacity
    Storage {
        /// JSON snapshot of storage samples
        #[arg(long, short)]
        snapshot: PathBuf,

        /// Capacity in the same unit as the samples
        #[arg(long)]
        capacity: Option<f64>,
    },

    /// Show the thresholds in effect
    Thresholds,
}

#[derive(Subcommand)]
pub enum CostsCommands {
    /// Show daily trend, month-end projection and spikes
    Trend {
        /// JSON snapshot of cost rows
        #[arg(long, short)]
        snapshot: PathBuf,

        /// Day to project from (YYYY-MM-DD); defaults to the last day with data
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load(cli.config.as_deref())?;
    let format = cli.format.or_else(|| config.format()).unwrap_or_default();

    // Remote scoring only when a URL is configured
    let client = match cli.api_url.as_deref().or(config.api_url.as_deref()) {
        Some(url) => Some(client::ApiClient::new(url)?),
        None => None,
    };
    let client = client.as_ref();

    match cli.command {
        Commands::Classify { metrics } => {
            classify::classify(&metrics, format)?;
        }
        Commands::Underutilized { snapshot } => {
            underutilized::show_underutilized(client, &snapshot, config.thresholds, format)
                .await?;
        }
        Commands::SqlHealth { snapshot } => {
            sql_health::show_sql_health(client, &snapshot, format).await?;
        }
        Commands::Costs(costs_cmd) => match costs_cmd {
            CostsCommands::Trend { snapshot, today } => {
                costs::show_trend(client, &snapshot, today, format).await?;
            }
        },
        Commands::Storage { snapshot, capacity } => {
            storage::show_storage(client, &snapshot, capacity, format).await?;
        }
        Commands::Thresholds => {
            thresholds::show_thresholds(client, config.thresholds(), format).await?;
        }
    }

    Ok(())
}
