//! Grouped summaries over section metrics.

use super::{EnrollmentRate, RiskCounts, SectionMetrics};
use serde::Serialize;
use std::collections::HashMap;

const UNASSIGNED: &str = "Unassigned";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Department,
    Faculty,
    Instrument,
    Term,
    Style,
}

impl GroupKey {
    /// Faculty and instrument groups overlap, so their sums can exceed
    /// the overall totals.
    pub fn fans_out(&self) -> bool {
        matches!(self, GroupKey::Faculty | GroupKey::Instrument)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Department => "department",
            GroupKey::Faculty => "faculty",
            GroupKey::Instrument => "instrument",
            GroupKey::Term => "term",
            GroupKey::Style => "style",
        }
    }

    /// Group names for one section, each at most once.
    fn keys_for(&self, m: &SectionMetrics<'_>) -> Vec<String> {
        let section = m.section;
        match self {
            GroupKey::Department => vec![section
                .department
                .clone()
                .unwrap_or_else(|| UNASSIGNED.to_string())],
            GroupKey::Term => vec![section.term.clone()],
            GroupKey::Style => vec![section
                .style
                .clone()
                .unwrap_or_else(|| UNASSIGNED.to_string())],
            GroupKey::Faculty => dedup(section.faculty.iter()),
            GroupKey::Instrument => dedup(
                section
                    .instruments
                    .iter()
                    .chain(section.instruments_needed.iter()),
            ),
        }
    }
}

fn dedup<'s>(names: impl Iterator<Item = &'s String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !name.is_empty() && !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub section_count: usize,
    pub total_capacity: u64,
    pub total_enrolled: u64,
    /// Summed enrollment over summed capacity.
    pub enrollment_rate: EnrollmentRate,
    pub average_section_rate: EnrollmentRate,
    pub risk_counts: RiskCounts,
}

#[derive(Default)]
struct GroupAccumulator {
    section_count: usize,
    total_capacity: u64,
    total_enrolled: u64,
    rates: Vec<EnrollmentRate>,
    risk_counts: RiskCounts,
}

impl GroupAccumulator {
    fn add(&mut self, m: &SectionMetrics<'_>) {
        self.section_count += 1;
        self.total_capacity += m.section.seats_capacity as u64;
        self.total_enrolled += m.section.active_student_count as u64;
        self.rates.push(m.enrollment_rate);
        self.risk_counts.add(m.risk);
    }

    fn finish(self, key: String) -> GroupSummary {
        GroupSummary {
            key,
            section_count: self.section_count,
            total_capacity: self.total_capacity,
            total_enrolled: self.total_enrolled,
            enrollment_rate: EnrollmentRate::from_counts(self.total_enrolled, self.total_capacity),
            average_section_rate: EnrollmentRate::mean(self.rates),
            risk_counts: self.risk_counts,
        }
    }
}

/// Groups sections by `key`, in the order each group is first seen.
///
/// Faculty and instrument keys put a section in every group it names.
pub fn group_by(metrics: &[SectionMetrics<'_>], key: GroupKey) -> Vec<GroupSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, GroupAccumulator> = HashMap::new();

    for m in metrics {
        for name in key.keys_for(m) {
            let acc = groups.entry(name.clone()).or_insert_with(|| {
                order.push(name.clone());
                GroupAccumulator::default()
            });
            acc.add(m);
        }
    }

    order
        .into_iter()
        .filter_map(|name| groups.remove(&name).map(|acc| acc.finish(name)))
        .collect()
}
