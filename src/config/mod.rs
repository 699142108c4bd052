mod file_config;

pub use file_config::{ExportConfig, FileConfig, InstrumentsConfig, ThresholdsConfig};

use crate::analytics::Thresholds;
use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_INSTRUMENT_CODES: [&str; 5] = ["GUIT", "PNO", "BASS", "DRUMS", "VOICE"];
pub const DEFAULT_FILE_PREFIX: &str = "ensemble_dashboard";
pub const DEFAULT_FORECAST_PERIODS: usize = 3;
pub const MAX_STUDENT_CUTOFF: u32 = 1000;
pub const MAX_FULL_CAPACITY_SEATS: u32 = 1000;
pub const MAX_FORECAST_PERIODS: usize = 20;

/// Overrides given on the command line. `None` means the flag was not passed.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub low_enrollment_students: Option<u32>,
    pub forecast_periods: Option<usize>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub thresholds: Thresholds,
    pub instrument_codes: Vec<String>,
    pub forecast_periods: usize,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub file_prefix: String,
    pub include_timestamp: bool,
    pub output_dir: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            include_timestamp: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// Explicit CLI flags override TOML values, TOML overrides defaults.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let defaults = Thresholds::default();

        let th_file = file.thresholds.unwrap_or_default();
        let thresholds = Thresholds {
            low_enrollment_students: cli
                .low_enrollment_students
                .or(th_file.low_enrollment_students)
                .unwrap_or(defaults.low_enrollment_students),
            full_capacity_seats: th_file
                .full_capacity_seats
                .unwrap_or(defaults.full_capacity_seats),
            critical_enrollment_percent: th_file
                .critical_enrollment_percent
                .unwrap_or(defaults.critical_enrollment_percent),
        };

        if !(1..=MAX_STUDENT_CUTOFF).contains(&thresholds.low_enrollment_students) {
            bail!(
                "low_enrollment_students must be between 1 and {}, got {}",
                MAX_STUDENT_CUTOFF,
                thresholds.low_enrollment_students
            );
        }
        if thresholds.full_capacity_seats > MAX_FULL_CAPACITY_SEATS {
            bail!(
                "full_capacity_seats must be at most {}, got {}",
                MAX_FULL_CAPACITY_SEATS,
                thresholds.full_capacity_seats
            );
        }
        if !(0.0..=100.0).contains(&thresholds.critical_enrollment_percent) {
            bail!(
                "critical_enrollment_percent must be between 0 and 100, got {}",
                thresholds.critical_enrollment_percent
            );
        }

        let forecast_periods = cli
            .forecast_periods
            .or(file.forecast_periods)
            .unwrap_or(DEFAULT_FORECAST_PERIODS);
        if !(1..=MAX_FORECAST_PERIODS).contains(&forecast_periods) {
            bail!(
                "forecast_periods must be between 1 and {}, got {}",
                MAX_FORECAST_PERIODS,
                forecast_periods
            );
        }

        let instrument_codes = file
            .instruments
            .and_then(|i| i.codes)
            .unwrap_or_else(|| {
                DEFAULT_INSTRUMENT_CODES
                    .iter()
                    .map(|c| c.to_string())
                    .collect()
            });
        if instrument_codes.is_empty() {
            bail!("instruments.codes must list at least one instrument");
        }

        let export_file = file.export.unwrap_or_default();
        let export_defaults = ExportSettings::default();
        let output_dir = cli
            .output_dir
            .clone()
            .or_else(|| export_file.output_dir.map(PathBuf::from))
            .unwrap_or(export_defaults.output_dir);
        if output_dir.exists() && !output_dir.is_dir() {
            bail!("output_dir is not a directory: {:?}", output_dir);
        }

        let export = ExportSettings {
            file_prefix: export_file
                .file_prefix
                .unwrap_or(export_defaults.file_prefix),
            include_timestamp: export_file
                .include_timestamp
                .unwrap_or(export_defaults.include_timestamp),
            output_dir,
        };

        Ok(Self {
            thresholds,
            instrument_codes,
            forecast_periods,
            export,
        })
    }
}
