use crate::analytics::AnalyticsError;
use std::fmt;

/// Non-fatal issue found while loading the section data.
///
/// Rows with a problem other than `CapacityMismatch` are skipped, the rest of
/// the batch still loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadProblem {
    NotAnObject {
        index: usize,
    },
    /// An object row serde could not read, with its message.
    Unreadable {
        index: usize,
        reason: String,
    },
    MissingField {
        index: usize,
        section: Option<String>,
        field: &'static str,
    },
    InvalidValue {
        index: usize,
        field: &'static str,
        value: String,
    },
    CapacityMismatch {
        index: usize,
        section: String,
        capacity: u32,
        available: u32,
        active: u32,
    },
}

impl LoadProblem {
    pub fn index(&self) -> usize {
        match self {
            LoadProblem::NotAnObject { index }
            | LoadProblem::Unreadable { index, .. }
            | LoadProblem::MissingField { index, .. }
            | LoadProblem::InvalidValue { index, .. }
            | LoadProblem::CapacityMismatch { index, .. } => *index,
        }
    }

    /// Whether the row was dropped from the loaded set.
    pub fn skips_row(&self) -> bool {
        !matches!(self, LoadProblem::CapacityMismatch { .. })
    }

    pub fn to_error(&self) -> AnalyticsError {
        AnalyticsError::MalformedRecord {
            index: self.index(),
            reason: self.to_string(),
        }
    }
}

impl fmt::Display for LoadProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadProblem::NotAnObject { index } => {
                write!(f, "Row {} is not a JSON object", index)
            }
            LoadProblem::Unreadable { index, reason } => {
                write!(f, "Row {} could not be read: {}", index, reason)
            }
            LoadProblem::MissingField {
                index,
                section: Some(section),
                field,
            } => write!(
                f,
                "Row {} ({}) is missing required field '{}'",
                index, section, field
            ),
            LoadProblem::MissingField {
                index,
                section: None,
                field,
            } => write!(f, "Row {} is missing required field '{}'", index, field),
            LoadProblem::InvalidValue {
                index,
                field,
                value,
            } => write!(
                f,
                "Row {} has invalid value {} for field '{}'",
                index, value, field
            ),
            LoadProblem::CapacityMismatch {
                index,
                section,
                capacity,
                available,
                active,
            } => write!(
                f,
                "Row {} ({}): {} active + {} available != {} capacity",
                index, section, active, available, capacity
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_mismatch_keeps_row() {
        let problem = LoadProblem::CapacityMismatch {
            index: 3,
            section: "ENS-1".to_string(),
            capacity: 10,
            available: 2,
            active: 5,
        };
        assert!(!problem.skips_row());
        assert_eq!(problem.index(), 3);
        assert_eq!(
            problem.to_string(),
            "Row 3 (ENS-1): 5 active + 2 available != 10 capacity"
        );
    }

    #[test]
    fn test_to_error_is_malformed_record() {
        let problem = LoadProblem::NotAnObject { index: 7 };
        assert!(problem.skips_row());
        match problem.to_error() {
            AnalyticsError::MalformedRecord { index, reason } => {
                assert_eq!(index, 7);
                assert_eq!(reason, "Row 7 is not a JSON object");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
