//! Instrument coverage per section and across sections.

use super::{EnrollmentRate, SectionMetrics};
use crate::sections::EnsembleSection;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentStatus {
    Filled,
    Needed,
    NotRequired,
}

impl InstrumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentStatus::Filled => "Filled",
            InstrumentStatus::Needed => "Needed",
            InstrumentStatus::NotRequired => "Not Required",
        }
    }
}

/// A filled seat wins over an open need for the same instrument.
pub fn instrument_status(metrics: &SectionMetrics<'_>, code: &str) -> InstrumentStatus {
    if metrics.enrolled_for(code) > 0 {
        InstrumentStatus::Filled
    } else if metrics.section.needs_instrument(code) {
        InstrumentStatus::Needed
    } else {
        InstrumentStatus::NotRequired
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InstrumentSummary {
    pub code: String,
    /// Occurrences in needed lists.
    pub needed: usize,
    pub enrolled: u64,
    pub sections_needing: usize,
    pub filled_sections: usize,
    pub fill_rate: EnrollmentRate,
}

pub fn instrument_summary(metrics: &[SectionMetrics<'_>], codes: &[String]) -> Vec<InstrumentSummary> {
    codes
        .iter()
        .map(|code| {
            let needed = metrics
                .iter()
                .map(|m| {
                    m.section
                        .instruments_needed
                        .iter()
                        .filter(|n| *n == code)
                        .count()
                })
                .sum();
            let enrolled = metrics.iter().map(|m| m.enrolled_for(code) as u64).sum();
            let sections_needing = metrics
                .iter()
                .filter(|m| m.section.needs_instrument(code))
                .count();
            let filled_sections = metrics
                .iter()
                .filter(|m| instrument_status(m, code) == InstrumentStatus::Filled)
                .count();

            InstrumentSummary {
                code: code.clone(),
                needed,
                enrolled,
                sections_needing,
                filled_sections,
                fill_rate: EnrollmentRate::from_counts(
                    filled_sections as u64,
                    sections_needing as u64,
                ),
            }
        })
        .collect()
}

/// Sections still recruiting for `code`, in input order.
pub fn sections_needing<'a, I>(sections: I, code: &str) -> Vec<&'a EnsembleSection>
where
    I: IntoIterator<Item = &'a EnsembleSection>,
{
    sections
        .into_iter()
        .filter(|s| s.needs_instrument(code))
        .collect()
}
