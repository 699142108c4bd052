use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub forecast_periods: Option<usize>,

    pub thresholds: Option<ThresholdsConfig>,
    pub instruments: Option<InstrumentsConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub low_enrollment_students: Option<u32>,
    pub full_capacity_seats: Option<u32>,
    pub critical_enrollment_percent: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct InstrumentsConfig {
    /// Instrument codes shown in coverage reports, in display order.
    pub codes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub file_prefix: Option<String>,
    pub include_timestamp: Option<bool>,
    pub output_dir: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
