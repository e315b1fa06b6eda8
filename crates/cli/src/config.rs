//! Configuration management for the CLI

use anyhow::{Context, Result};
use clap::ValueEnum;
use optimizer_lib::scoring::UnderutilizationThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL used when `--api-url` is not given
    pub api_url: Option<String>,
    /// Default output format ("table" or "json")
    pub default_format: Option<String>,
    /// Threshold overrides for local evaluation
    pub thresholds: Option<UnderutilizationThresholds>,
}

impl Config {
    /// Load configuration from `path`, or the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        let config: Config =
            serde_json::from_str(&content).context("Failed to parse config file")?;
        config
            .thresholds()
            .validate()
            .context("Invalid thresholds in config file")?;

        Ok(config)
    }

    /// Thresholds for local evaluation, falling back to the built-in defaults
    pub fn thresholds(&self) -> UnderutilizationThresholds {
        self.thresholds.unwrap_or_default()
    }

    /// Output format from the config file, if set and recognized
    pub fn format(&self) -> Option<OutputFormat> {
        self.default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("azopt").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();

        assert!(config.api_url.is_none());
        assert_eq!(config.thresholds(), UnderutilizationThresholds::default());
    }

    #[test]
    fn test_partial_threshold_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"default_format": "json", "thresholds": {{"cpu": 10.0, "min_monthly_cost": 50.0}}}}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        let thresholds = config.thresholds();

        assert_eq!(thresholds.cpu, 10.0);
        assert_eq!(thresholds.min_monthly_cost, 50.0);
        assert_eq!(thresholds.memory, UnderutilizationThresholds::default().memory);
        assert!(matches!(config.format(), Some(OutputFormat::Json)));
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"thresholds": {{"dtu": 0.0}}}}"#).unwrap();

        assert!(Config::load(Some(file.path())).is_err());
    }
}
