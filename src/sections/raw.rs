//! Lenient conversion of source JSON rows into [`EnsembleSection`]s.
//!
//! Source exports are loose: counts arrive as numbers or numeric strings,
//! titles and times as single strings or one-element lists. Everything is
//! coerced here so the rest of the crate only sees typed sections.

use super::problem::LoadProblem;
use super::EnsembleSection;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub(super) struct RawSection {
    #[serde(rename = "bSecTerm")]
    term: Option<Value>,
    #[serde(rename = "secInstrumentation_sectionname")]
    section_name: Option<Value>,
    #[serde(rename = "secInstrumentation_titlelongcrs")]
    course_title: Option<Value>,
    #[serde(rename = "secInstrumentation_seatscap")]
    seats_capacity: Option<Value>,
    #[serde(rename = "secInstrumentation_seatsavail")]
    seats_available: Option<Value>,
    #[serde(rename = "secInstrumentation_activestucount")]
    active_student_count: Option<Value>,
    style: Option<Value>,
    #[serde(rename = "ratingOverall")]
    rating: Option<Value>,
    #[serde(alias = "dept")]
    department: Option<Value>,
    #[serde(rename = "rhythminstrument")]
    instruments: Option<Value>,
    #[serde(rename = "rhythmenrolled")]
    instrument_enrolled: Option<Value>,
    #[serde(rename = "rhythmneeded")]
    instruments_needed: Option<Value>,
    #[serde(rename = "secInstrumentation_facnamepreffml")]
    faculty: Option<Value>,
    #[serde(rename = "bSinCsmDays")]
    days: Option<Value>,
    #[serde(rename = "bSinCsmStartTime")]
    start_time: Option<Value>,
    #[serde(rename = "bSinCsmEndTime")]
    end_time: Option<Value>,
}

impl RawSection {
    /// Converts a raw row, `index` is its position in the source array.
    ///
    /// Mandatory fields are the term, the section name and the capacity
    /// triple; anything else that fails to parse is dropped.
    pub(super) fn into_section(self, index: usize) -> Result<EnsembleSection, LoadProblem> {
        let section_name = scalar_text(self.section_name.as_ref());
        let missing = |field: &'static str| LoadProblem::MissingField {
            index,
            section: section_name.clone(),
            field,
        };

        let term = scalar_text(self.term.as_ref()).ok_or_else(|| missing("bSecTerm"))?;
        let name = section_name
            .clone()
            .ok_or_else(|| missing("secInstrumentation_sectionname"))?;

        let seats_capacity = count(index, "secInstrumentation_seatscap", self.seats_capacity.as_ref())?
            .ok_or_else(|| missing("secInstrumentation_seatscap"))?;
        let seats_available =
            count(index, "secInstrumentation_seatsavail", self.seats_available.as_ref())?
                .ok_or_else(|| missing("secInstrumentation_seatsavail"))?;
        let active_student_count = count(
            index,
            "secInstrumentation_activestucount",
            self.active_student_count.as_ref(),
        )?
        .ok_or_else(|| missing("secInstrumentation_activestucount"))?;

        let instrument_enrolled = match self.instrument_enrolled.as_ref() {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    count(index, "rhythmenrolled", Some(item)).map(|c| c.unwrap_or(0))
                })
                .collect::<Result<Vec<u32>, LoadProblem>>()?,
            Some(other) => vec![count(index, "rhythmenrolled", Some(other))?.unwrap_or(0)],
        };

        Ok(EnsembleSection {
            term,
            section_name: name,
            course_title: scalar_text(self.course_title.as_ref()),
            seats_capacity,
            seats_available,
            active_student_count,
            style: scalar_text(self.style.as_ref()),
            // Ratings follow the coerce rule: unreadable means absent.
            rating: count(index, "ratingOverall", self.rating.as_ref())
                .ok()
                .flatten(),
            department: scalar_text(self.department.as_ref()),
            instruments: text_list(self.instruments.as_ref()),
            instrument_enrolled,
            instruments_needed: text_list(self.instruments_needed.as_ref()),
            faculty: text_list(self.faculty.as_ref()),
            days: text_list(self.days.as_ref()),
            start_time: scalar_text(self.start_time.as_ref()),
            end_time: scalar_text(self.end_time.as_ref()),
        })
    }
}

/// A single display string: strings are trimmed, numbers stringified and
/// lists reduced to their first non-empty element.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.iter().find_map(|item| scalar_text(Some(item))),
        Value::Null | Value::Object(_) => None,
    }
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| scalar_text(Some(item)))
            .collect(),
        Some(other) => scalar_text(Some(other)).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Reads a non-negative integer. `Ok(None)` means the value is absent,
/// anything present but unreadable is an `InvalidValue` problem.
fn count(index: usize, field: &'static str, value: Option<&Value>) -> Result<Option<u32>, LoadProblem> {
    let invalid = |v: &Value| LoadProblem::InvalidValue {
        index,
        field,
        value: v.to_string(),
    };

    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };

    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u32::try_from(u).map(Some).map_err(|_| invalid(value));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
                    Ok(Some(f as u32))
                }
                _ => Err(invalid(value)),
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if let Ok(u) = s.parse::<u32>() {
                return Ok(Some(u));
            }
            match s.parse::<f64>() {
                Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
                    Ok(Some(f as u32))
                }
                _ => Err(invalid(value)),
            }
        }
        Value::Array(items) if items.len() == 1 => count(index, field, items.first()),
        _ => Err(invalid(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn convert(value: Value) -> Result<EnsembleSection, LoadProblem> {
        let raw: RawSection = serde_json::from_value(value).unwrap();
        raw.into_section(0)
    }

    #[test]
    fn test_converts_full_row() {
        let section = convert(json!({
            "bSecTerm": "2024FA",
            "secInstrumentation_sectionname": "ENS-101-01",
            "secInstrumentation_titlelongcrs": ["Jazz Combo"],
            "secInstrumentation_seatscap": "8",
            "secInstrumentation_seatsavail": 3,
            "secInstrumentation_activestucount": "5",
            "style": "Jazz",
            "ratingOverall": "3",
            "rhythminstrument": ["GUIT", "PNO"],
            "rhythmenrolled": ["1", 0],
            "rhythmneeded": ["PNO"],
            "secInstrumentation_facnamepreffml": ["Ana Ruiz"],
            "bSinCsmDays": ["T", "R"],
            "bSinCsmStartTime": ["02:00:00 PM"],
            "bSinCsmEndTime": ["03:50:00 PM"]
        }))
        .unwrap();

        assert_eq!(section.term, "2024FA");
        assert_eq!(section.section_name, "ENS-101-01");
        assert_eq!(section.course_title.as_deref(), Some("Jazz Combo"));
        assert_eq!(section.seats_capacity, 8);
        assert_eq!(section.seats_available, 3);
        assert_eq!(section.active_student_count, 5);
        assert_eq!(section.rating, Some(3));
        assert_eq!(section.instruments, vec!["GUIT", "PNO"]);
        assert_eq!(section.instrument_enrolled, vec![1, 0]);
        assert_eq!(section.instruments_needed, vec!["PNO"]);
        assert_eq!(section.start_time.as_deref(), Some("02:00:00 PM"));
        assert!(section.department.is_none());
    }

    #[test]
    fn test_missing_capacity_is_reported() {
        let err = convert(json!({
            "bSecTerm": "2024FA",
            "secInstrumentation_sectionname": "ENS-101-01",
            "secInstrumentation_seatsavail": 3,
            "secInstrumentation_activestucount": 5
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            LoadProblem::MissingField {
                field: "secInstrumentation_seatscap",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_term_keeps_section_name_in_problem() {
        let err = convert(json!({
            "secInstrumentation_sectionname": "ENS-200-02",
            "secInstrumentation_seatscap": 3,
            "secInstrumentation_seatsavail": 3,
            "secInstrumentation_activestucount": 0
        }))
        .unwrap_err();
        match err {
            LoadProblem::MissingField { section, field, .. } => {
                assert_eq!(field, "bSecTerm");
                assert_eq!(section.as_deref(), Some("ENS-200-02"));
            }
            other => panic!("unexpected problem {other:?}"),
        }
    }

    #[test]
    fn test_negative_count_is_invalid() {
        let err = convert(json!({
            "bSecTerm": "2024FA",
            "secInstrumentation_sectionname": "ENS-101-01",
            "secInstrumentation_seatscap": -2,
            "secInstrumentation_seatsavail": 3,
            "secInstrumentation_activestucount": 5
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            LoadProblem::InvalidValue {
                field: "secInstrumentation_seatscap",
                ..
            }
        ));
    }

    #[test]
    fn test_unreadable_rating_is_dropped() {
        let section = convert(json!({
            "bSecTerm": "2024FA",
            "secInstrumentation_sectionname": "ENS-101-01",
            "secInstrumentation_seatscap": 4,
            "secInstrumentation_seatsavail": 0,
            "secInstrumentation_activestucount": 4,
            "ratingOverall": "excellent"
        }))
        .unwrap();
        assert_eq!(section.rating, None);
    }

    #[test]
    fn test_scalar_text_and_lists() {
        assert_eq!(scalar_text(Some(&json!("  Rock "))), Some("Rock".to_string()));
        assert_eq!(scalar_text(Some(&json!(["", "Pop"]))), Some("Pop".to_string()));
        assert_eq!(scalar_text(Some(&json!(2024))), Some("2024".to_string()));
        assert_eq!(scalar_text(Some(&json!(null))), None);
        assert_eq!(text_list(Some(&json!("Ana Ruiz"))), vec!["Ana Ruiz"]);
        assert!(text_list(None).is_empty());
    }

    #[test]
    fn test_count_coercion() {
        assert_eq!(count(0, "f", Some(&json!(4.0))).unwrap(), Some(4));
        assert_eq!(count(0, "f", Some(&json!(" 12 "))).unwrap(), Some(12));
        assert_eq!(count(0, "f", Some(&json!(""))).unwrap(), None);
        assert_eq!(count(0, "f", Some(&json!([7]))).unwrap(), Some(7));
        assert!(count(0, "f", Some(&json!(2.5))).is_err());
        assert!(count(0, "f", Some(&json!({"n": 1}))).is_err());
    }
}
