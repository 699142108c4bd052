//! JSON reports.

use crate::analytics::{
    alerts, enrollment_distribution, group_by, instrument_summary, low_enrollment_breakdown,
    summarize, Alert, AlertKind, AnalyticsError, EnrollmentBand, Forecast, GroupKey,
    GroupSummary, InstrumentSummary, MetricsSummary, SectionMetrics, Severity, Thresholds,
};
use crate::sections::SectionFilter;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistributionRow {
    pub band: EnrollmentBand,
    pub label: &'static str,
    pub sections: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AlertCounts {
    pub critical: usize,
    pub warning: usize,
    pub low_enrollment: usize,
    pub low_rate: usize,
    pub full_capacity: usize,
}

impl AlertCounts {
    fn count(alerts: &[Alert]) -> Self {
        let mut counts = AlertCounts::default();
        for alert in alerts {
            match alert.severity {
                Severity::Critical => counts.critical += 1,
                Severity::Warning => counts.warning += 1,
            }
            match alert.kind {
                AlertKind::LowEnrollment { .. } => counts.low_enrollment += 1,
                AlertKind::LowRate { .. } => counts.low_rate += 1,
                AlertKind::FullCapacity { .. } => counts.full_capacity += 1,
            }
        }
        counts
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AlertSection {
    pub counts: AlertCounts,
    pub items: Vec<Alert>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExecutiveReport {
    pub generated_at: String,
    pub scope: SectionFilter,
    pub thresholds: Thresholds,
    pub summary: MetricsSummary,
    pub distribution: Vec<DistributionRow>,
    pub instruments: Vec<InstrumentSummary>,
    pub alerts: AlertSection,
    /// Under-enrolled sections keyed by exact student count.
    pub low_enrollment_breakdown: BTreeMap<u32, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast_unavailable: Option<String>,
}

impl ExecutiveReport {
    /// The forecast is computed by the caller, usually over every term
    /// rather than the filtered scope.
    pub fn build(
        scope: &SectionFilter,
        metrics: &[SectionMetrics<'_>],
        thresholds: &Thresholds,
        instrument_codes: &[String],
        forecast: Result<Forecast, AnalyticsError>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let items = alerts(metrics, thresholds);
        let (forecast, forecast_unavailable) = match forecast {
            Ok(f) => (Some(f), None),
            Err(e) => (None, Some(e.to_string())),
        };

        ExecutiveReport {
            generated_at: timestamp(generated_at),
            scope: scope.clone(),
            thresholds: thresholds.clone(),
            summary: summarize(metrics),
            distribution: enrollment_distribution(metrics)
                .into_iter()
                .map(|(band, sections)| DistributionRow {
                    band,
                    label: band.label(),
                    sections,
                })
                .collect(),
            instruments: instrument_summary(metrics, instrument_codes),
            alerts: AlertSection {
                counts: AlertCounts::count(&items),
                items,
            },
            low_enrollment_breakdown: low_enrollment_breakdown(metrics, thresholds),
            forecast,
            forecast_unavailable,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupReport {
    pub generated_at: String,
    pub scope: SectionFilter,
    pub group_key: GroupKey,
    /// Set when one section can count toward several groups, so group sums
    /// may exceed the overall totals.
    pub fan_out: bool,
    pub groups: Vec<GroupSummary>,
}

impl GroupReport {
    pub fn build(
        scope: &SectionFilter,
        metrics: &[SectionMetrics<'_>],
        group_key: GroupKey,
        generated_at: DateTime<Utc>,
    ) -> Self {
        GroupReport {
            generated_at: timestamp(generated_at),
            scope: scope.clone(),
            group_key,
            fan_out: group_key.fans_out(),
            groups: group_by(metrics, group_key),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn write_json<W: Write, T: Serialize>(writer: &mut W, report: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report).context("Failed to serialize report")?;
    writeln!(writer).context("Failed to write report")?;
    Ok(())
}
