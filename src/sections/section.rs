use serde::Serialize;

/// One scheduled offering of an ensemble class for a given term.
///
/// Built by the loader from a raw JSON row. Sections are never mutated after
/// loading; every analytics call takes them by shared reference.
#[derive(Clone, Serialize, Debug, PartialEq, Eq, Default)]
pub struct EnsembleSection {
    pub term: String,
    pub section_name: String,
    pub course_title: Option<String>,

    pub seats_capacity: u32,
    pub seats_available: u32,
    pub active_student_count: u32,

    pub style: Option<String>,
    pub rating: Option<u32>,
    pub department: Option<String>,

    /// Ordered instrument codes, parallel to `instrument_enrolled`.
    pub instruments: Vec<String>,
    pub instrument_enrolled: Vec<u32>,
    /// One entry per open player need, codes may repeat.
    pub instruments_needed: Vec<String>,
    pub faculty: Vec<String>,

    // Display only.
    pub days: Vec<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl EnsembleSection {
    /// Whether `active + available == capacity` holds for this row.
    pub fn capacity_is_consistent(&self) -> bool {
        self.active_student_count as u64 + self.seats_available as u64
            == self.seats_capacity as u64
    }

    pub fn needs_instrument(&self, code: &str) -> bool {
        self.instruments_needed.iter().any(|c| c == code)
    }

    pub fn faculty_display(&self) -> String {
        if self.faculty.is_empty() {
            return "N/A".to_string();
        }
        self.faculty.join(", ")
    }

    pub fn course_title_display(&self) -> &str {
        self.course_title.as_deref().unwrap_or("N/A")
    }

    pub fn days_display(&self) -> String {
        if self.days.is_empty() {
            return "N/A".to_string();
        }
        self.days.join(", ")
    }

    pub fn time_range_display(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.as_deref().unwrap_or("N/A"),
            self.end_time.as_deref().unwrap_or("N/A")
        )
    }
}
