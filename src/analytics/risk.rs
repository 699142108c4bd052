//! Risk classification and alerts.

use super::SectionMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cutoffs used to label sections. Loaded from configuration so each
/// institution can pick its own.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Sections with fewer active students than this are low-enrollment.
    pub low_enrollment_students: u32,
    /// Sections with this many open seats or fewer are full.
    pub full_capacity_seats: u32,
    /// Sections at or above the student cutoff still raise a low-rate alert
    /// below this enrollment percentage.
    pub critical_enrollment_percent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_enrollment_students: 4,
            full_capacity_seats: 0,
            critical_enrollment_percent: 25.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Healthy,
    LowEnrollment,
    NoStudents,
    FullCapacity,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Healthy => "healthy",
            RiskLevel::LowEnrollment => "low_enrollment",
            RiskLevel::NoStudents => "no_students",
            RiskLevel::FullCapacity => "full_capacity",
        }
    }

    /// True for the levels that put a section at risk of being dropped.
    pub fn is_under_enrolled(&self) -> bool {
        matches!(self, RiskLevel::LowEnrollment | RiskLevel::NoStudents)
    }
}

/// Labels a section from its counts.
///
/// No students beats low enrollment, and both beat full capacity.
pub fn classify(active_students: u32, seats_available: u32, thresholds: &Thresholds) -> RiskLevel {
    if active_students == 0 {
        RiskLevel::NoStudents
    } else if active_students < thresholds.low_enrollment_students {
        RiskLevel::LowEnrollment
    } else if seats_available <= thresholds.full_capacity_seats {
        RiskLevel::FullCapacity
    } else {
        RiskLevel::Healthy
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RiskCounts {
    pub healthy: usize,
    pub low_enrollment: usize,
    pub no_students: usize,
    pub full_capacity: usize,
}

impl RiskCounts {
    pub fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Healthy => self.healthy += 1,
            RiskLevel::LowEnrollment => self.low_enrollment += 1,
            RiskLevel::NoStudents => self.no_students += 1,
            RiskLevel::FullCapacity => self.full_capacity += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.healthy + self.low_enrollment + self.no_students + self.full_capacity
    }

    pub fn at_risk(&self) -> usize {
        self.low_enrollment + self.no_students
    }
}

impl FromIterator<RiskLevel> for RiskCounts {
    fn from_iter<I: IntoIterator<Item = RiskLevel>>(iter: I) -> Self {
        let mut counts = RiskCounts::default();
        for level in iter {
            counts.add(level);
        }
        counts
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertKind {
    LowEnrollment { students: u32 },
    LowRate { rate_percent: f64 },
    FullCapacity { seats_available: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alert {
    pub term: String,
    pub section_name: String,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: AlertKind,
    pub message: String,
}

/// Status line shown for an under-enrolled section.
pub fn low_enrollment_status(students: u32) -> (Severity, String) {
    match students {
        0 => (Severity::Critical, "CRITICAL - NO STUDENTS".to_string()),
        1 => (Severity::Critical, "CRITICAL - ONLY 1 STUDENT".to_string()),
        n => (Severity::Warning, format!("WARNING - ONLY {} STUDENTS", n)),
    }
}

/// Alerts for every section, in input order.
pub fn alerts(metrics: &[SectionMetrics<'_>], thresholds: &Thresholds) -> Vec<Alert> {
    let mut out = Vec::new();
    for m in metrics {
        let section = m.section;
        let make = |severity, kind, message| Alert {
            term: section.term.clone(),
            section_name: section.section_name.clone(),
            severity,
            kind,
            message,
        };

        if m.risk.is_under_enrolled() {
            let students = section.active_student_count;
            let (severity, status) = low_enrollment_status(students);
            out.push(make(
                severity,
                AlertKind::LowEnrollment { students },
                status,
            ));
        } else if let Some(percent) = m.enrollment_rate.percent() {
            if percent < thresholds.critical_enrollment_percent {
                out.push(make(
                    Severity::Warning,
                    AlertKind::LowRate {
                        rate_percent: percent,
                    },
                    format!(
                        "{} has only {:.1}% enrollment rate (but has {}+ students)",
                        section.section_name, percent, thresholds.low_enrollment_students
                    ),
                ));
            }
        }

        if section.seats_available <= thresholds.full_capacity_seats {
            out.push(make(
                Severity::Warning,
                AlertKind::FullCapacity {
                    seats_available: section.seats_available,
                },
                format!("{} has no available seats", section.section_name),
            ));
        }
    }
    out
}

/// Under-enrolled sections counted by their exact student count.
pub fn low_enrollment_breakdown(
    metrics: &[SectionMetrics<'_>],
    thresholds: &Thresholds,
) -> BTreeMap<u32, usize> {
    let mut out: BTreeMap<u32, usize> = (0..thresholds.low_enrollment_students)
        .map(|students| (students, 0))
        .collect();
    for m in metrics.iter().filter(|m| m.risk.is_under_enrolled()) {
        *out.entry(m.section.active_student_count).or_insert(0) += 1;
    }
    out
}
