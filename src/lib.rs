//! Ensemble Enrollment Analytics Library
//!
//! Loads ensemble section data and derives enrollment metrics, risk alerts,
//! grouped summaries and naive forecasts from it.

pub mod analytics;
pub mod config;
pub mod export;
pub mod sections;

// Re-export commonly used types for convenience
pub use analytics::{AnalyticsError, EnrollmentRate, RiskLevel, SectionMetrics, Thresholds};
pub use config::{AppConfig, CliConfig, FileConfig};
pub use sections::{load_sections, EnsembleSection, LoadProblem, LoadedSections, SectionFilter};
