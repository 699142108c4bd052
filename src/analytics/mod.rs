//! Enrollment analytics.
//!
//! Everything in here is a pure function of the sections and thresholds it
//! is handed. No call keeps state around for the next one.

mod aggregate;
mod forecast;
mod instruments;
mod metrics;
mod rate;
mod risk;

pub use aggregate::{group_by, GroupKey, GroupSummary};
pub use forecast::{
    fit_linear, forecast, term_series, Forecast, ForecastMethod, LinearFit, ProjectedPoint,
    TermPoint, NAIVE_FORECAST_DISCLAIMER,
};
pub use instruments::{
    instrument_status, instrument_summary, sections_needing, InstrumentStatus, InstrumentSummary,
};
pub use metrics::{
    compute_all_metrics, compute_metrics, enrollment_distribution, summarize, EnrollmentBand,
    MalformedInstrumentation, MetricsSummary, SectionMetrics,
};
pub use rate::EnrollmentRate;
pub use risk::{
    alerts, classify, low_enrollment_breakdown, low_enrollment_status, Alert, AlertKind,
    RiskCounts, RiskLevel, Severity, Thresholds,
};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Malformed record at row {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("{what} is undefined: capacity is zero")]
    DivisionUndefined { what: String },

    #[error("Insufficient data: need at least {required} data points, got {available}")]
    InsufficientData { required: usize, available: usize },
}
