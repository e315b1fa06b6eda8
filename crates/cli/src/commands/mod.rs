//! CLI command implementations

pub mod classify;
pub mod costs;
pub mod sql_health;
pub mod storage;
pub mod thresholds;
pub mod underutilized;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a JSON snapshot file
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}
