//! Per-section and aggregate enrollment metrics.

use super::{classify, EnrollmentRate, RiskCounts, RiskLevel, Thresholds};
use crate::sections::EnsembleSection;
#[cfg(not(feature = "serial"))]
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// The instrument list and its enrolled counts had different lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MalformedInstrumentation {
    pub instruments: usize,
    pub enrolled: usize,
}

/// Derived view over one section. The section itself is only borrowed.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionMetrics<'a> {
    pub section: &'a EnsembleSection,
    pub enrollment_rate: EnrollmentRate,
    /// Capacity minus active students, negative for over-enrolled data.
    pub open_seats: i64,
    /// Instrument codes paired with their enrolled counts, up to the shorter
    /// of the two source lists.
    pub instrument_counts: Vec<(String, u32)>,
    pub malformed: Option<MalformedInstrumentation>,
    pub risk: RiskLevel,
}

impl<'a> SectionMetrics<'a> {
    pub fn for_section(section: &'a EnsembleSection, thresholds: &Thresholds) -> Self {
        let instrument_counts: Vec<(String, u32)> = section
            .instruments
            .iter()
            .zip(section.instrument_enrolled.iter())
            .map(|(code, enrolled)| (code.clone(), *enrolled))
            .collect();

        let malformed = (section.instruments.len() != section.instrument_enrolled.len()).then(|| {
            MalformedInstrumentation {
                instruments: section.instruments.len(),
                enrolled: section.instrument_enrolled.len(),
            }
        });
        if let Some(m) = &malformed {
            debug!(
                "{}: {} instruments but {} enrolled counts, pairing the first {}",
                section.section_name,
                m.instruments,
                m.enrolled,
                instrument_counts.len()
            );
        }

        SectionMetrics {
            section,
            enrollment_rate: EnrollmentRate::from_counts(
                section.active_student_count as u64,
                section.seats_capacity as u64,
            ),
            open_seats: section.seats_capacity as i64 - section.active_student_count as i64,
            instrument_counts,
            malformed,
            risk: classify(
                section.active_student_count,
                section.seats_available,
                thresholds,
            ),
        }
    }

    /// Enrolled players for `code`, summed if the code is listed twice.
    pub fn enrolled_for(&self, code: &str) -> u32 {
        self.instrument_counts
            .iter()
            .filter(|(c, _)| c == code)
            .map(|(_, n)| *n)
            .sum()
    }
}

/// Metrics for each section, in input order.
pub fn compute_metrics<'a>(
    sections: &[&'a EnsembleSection],
    thresholds: &Thresholds,
) -> Vec<SectionMetrics<'a>> {
    #[cfg(not(feature = "serial"))]
    let metrics = sections
        .par_iter()
        .map(|&section| SectionMetrics::for_section(section, thresholds))
        .collect();

    #[cfg(feature = "serial")]
    let metrics = sections
        .iter()
        .map(|&section| SectionMetrics::for_section(section, thresholds))
        .collect();

    metrics
}

pub fn compute_all_metrics<'a>(
    sections: &'a [EnsembleSection],
    thresholds: &Thresholds,
) -> Vec<SectionMetrics<'a>> {
    let refs: Vec<&EnsembleSection> = sections.iter().collect();
    compute_metrics(&refs, thresholds)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_sections: usize,
    pub total_seats: u64,
    pub enrolled_students: u64,
    pub open_seats: i64,
    /// Summed enrollment over summed capacity.
    pub capacity_utilization: EnrollmentRate,
    /// Mean of the per-section rates that are defined.
    pub average_enrollment_rate: EnrollmentRate,
    pub risk_counts: RiskCounts,
    pub malformed_rows: usize,
}

pub fn summarize(metrics: &[SectionMetrics<'_>]) -> MetricsSummary {
    let total_seats: u64 = metrics.iter().map(|m| m.section.seats_capacity as u64).sum();
    let enrolled_students: u64 = metrics
        .iter()
        .map(|m| m.section.active_student_count as u64)
        .sum();

    MetricsSummary {
        total_sections: metrics.len(),
        total_seats,
        enrolled_students,
        open_seats: metrics.iter().map(|m| m.open_seats).sum(),
        capacity_utilization: EnrollmentRate::from_counts(enrolled_students, total_seats),
        average_enrollment_rate: EnrollmentRate::mean(metrics.iter().map(|m| m.enrollment_rate)),
        risk_counts: metrics.iter().map(|m| m.risk).collect(),
        malformed_rows: metrics.iter().filter(|m| m.malformed.is_some()).count(),
    }
}

/// Enrollment-rate buckets used for the distribution breakdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentBand {
    None,
    Low,
    Medium,
    Good,
    High,
    Full,
    Undefined,
}

impl EnrollmentBand {
    pub const ALL: [EnrollmentBand; 7] = [
        EnrollmentBand::None,
        EnrollmentBand::Low,
        EnrollmentBand::Medium,
        EnrollmentBand::Good,
        EnrollmentBand::High,
        EnrollmentBand::Full,
        EnrollmentBand::Undefined,
    ];

    pub fn for_rate(rate: EnrollmentRate) -> Self {
        let Some(percent) = rate.percent() else {
            return EnrollmentBand::Undefined;
        };
        if percent == 0.0 {
            EnrollmentBand::None
        } else if percent <= 25.0 {
            EnrollmentBand::Low
        } else if percent <= 50.0 {
            EnrollmentBand::Medium
        } else if percent <= 75.0 {
            EnrollmentBand::Good
        } else if percent <= 99.0 {
            EnrollmentBand::High
        } else {
            EnrollmentBand::Full
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EnrollmentBand::None => "0% (No Students)",
            EnrollmentBand::Low => "1-25% (Low)",
            EnrollmentBand::Medium => "26-50% (Medium)",
            EnrollmentBand::Good => "51-75% (Good)",
            EnrollmentBand::High => "76-99% (High)",
            EnrollmentBand::Full => "100% (Full)",
            EnrollmentBand::Undefined => "N/A (No Capacity)",
        }
    }
}

/// Section count per band, every band listed in `EnrollmentBand::ALL` order.
pub fn enrollment_distribution(metrics: &[SectionMetrics<'_>]) -> Vec<(EnrollmentBand, usize)> {
    EnrollmentBand::ALL
        .iter()
        .map(|band| {
            let count = metrics
                .iter()
                .filter(|m| EnrollmentBand::for_rate(m.enrollment_rate) == *band)
                .count();
            (*band, count)
        })
        .collect()
}
