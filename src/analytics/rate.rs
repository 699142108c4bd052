use super::AnalyticsError;
use serde::{Serialize, Serializer};
use std::fmt;

/// Active students over seat capacity, as a fraction.
///
/// A zero capacity gives `Undefined` instead of NaN. Rates above 1 are kept
/// as they are: they mean the source data has more students than seats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnrollmentRate {
    Defined(f64),
    Undefined,
}

impl EnrollmentRate {
    pub fn from_counts(enrolled: u64, capacity: u64) -> Self {
        if capacity == 0 {
            EnrollmentRate::Undefined
        } else {
            EnrollmentRate::Defined(enrolled as f64 / capacity as f64)
        }
    }

    /// Mean of the defined rates, `Undefined` when there are none.
    pub fn mean<I: IntoIterator<Item = EnrollmentRate>>(rates: I) -> Self {
        let (sum, count) = rates
            .into_iter()
            .filter_map(EnrollmentRate::value)
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            EnrollmentRate::Undefined
        } else {
            EnrollmentRate::Defined(sum / count as f64)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            EnrollmentRate::Defined(v) => Some(v),
            EnrollmentRate::Undefined => None,
        }
    }

    pub fn percent(self) -> Option<f64> {
        self.value().map(|v| v * 100.0)
    }

    pub fn is_defined(self) -> bool {
        matches!(self, EnrollmentRate::Defined(_))
    }

    /// The rate as a plain number, `what` names it in the error.
    pub fn ratio(self, what: &str) -> Result<f64, AnalyticsError> {
        self.value().ok_or_else(|| AnalyticsError::DivisionUndefined {
            what: what.to_string(),
        })
    }

    /// Percent with one decimal, or `N/A`. Used for CSV cells.
    pub fn percent_cell(self) -> String {
        match self.percent() {
            Some(p) => format!("{:.1}", p),
            None => "N/A".to_string(),
        }
    }
}

impl fmt::Display for EnrollmentRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(p) => write!(f, "{:.1}%", p),
            None => write!(f, "N/A"),
        }
    }
}

impl Serialize for EnrollmentRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}
