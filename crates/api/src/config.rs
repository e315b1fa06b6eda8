//! Service configuration

use anyhow::{Context, Result};
use optimizer_lib::scoring::{
    UnderutilizationThresholds, DEFAULT_CPU_THRESHOLD, DEFAULT_DTU_THRESHOLD,
    DEFAULT_LOOKBACK_DAYS, DEFAULT_MEMORY_THRESHOLD, DEFAULT_MIN_MONTHLY_COST,
    DEFAULT_STORAGE_THRESHOLD,
};
use serde::Deserialize;

/// Service configuration, read from `OPTIMIZER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Name attached to structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// HTTP listen port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    #[serde(default = "default_cpu_threshold")]
    pub cpu_threshold: f64,

    #[serde(default = "default_memory_threshold")]
    pub memory_threshold: f64,

    #[serde(default = "default_dtu_threshold")]
    pub dtu_threshold: f64,

    #[serde(default = "default_storage_threshold")]
    pub storage_threshold: f64,

    #[serde(default = "default_min_monthly_cost")]
    pub min_monthly_cost: f64,

    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

fn default_service_name() -> String {
    "optimizer-api".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_cpu_threshold() -> f64 {
    DEFAULT_CPU_THRESHOLD
}

fn default_memory_threshold() -> f64 {
    DEFAULT_MEMORY_THRESHOLD
}

fn default_dtu_threshold() -> f64 {
    DEFAULT_DTU_THRESHOLD
}

fn default_storage_threshold() -> f64 {
    DEFAULT_STORAGE_THRESHOLD
}

fn default_min_monthly_cost() -> f64 {
    DEFAULT_MIN_MONTHLY_COST
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

impl ServiceConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::from_env(config::Environment::with_prefix("OPTIMIZER"))
    }

    /// Load configuration from an environment source and validate thresholds
    pub fn from_env(env: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let service: ServiceConfig = config
            .try_deserialize()
            .context("Failed to parse configuration")?;
        service
            .thresholds()
            .validate()
            .context("Invalid default thresholds")?;

        Ok(service)
    }

    /// Default thresholds applied when a request carries none
    pub fn thresholds(&self) -> UnderutilizationThresholds {
        UnderutilizationThresholds {
            cpu: self.cpu_threshold,
            memory: self.memory_threshold,
            dtu: self.dtu_threshold,
            storage: self.storage_threshold,
            min_monthly_cost: self.min_monthly_cost,
            lookback_days: self.lookback_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("OPTIMIZER").source(Some(source))
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServiceConfig::from_env(env(&[])).unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.service_name, "optimizer-api");
        assert_eq!(config.thresholds(), UnderutilizationThresholds::default());
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = ServiceConfig::from_env(env(&[
            ("OPTIMIZER_API_PORT", "9090"),
            ("OPTIMIZER_CPU_THRESHOLD", "15"),
            ("OPTIMIZER_LOOKBACK_DAYS", "14"),
        ]))
        .unwrap();
        assert_eq!(config.api_port, 9090);
        assert_eq!(config.thresholds().cpu, 15.0);
        assert_eq!(config.thresholds().lookback_days, 14);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = ServiceConfig::from_env(env(&[("OPTIMIZER_MEMORY_THRESHOLD", "-5")]));
        assert!(result.is_err());
    }
}
