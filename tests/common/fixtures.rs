//! Section data fixtures written to temporary directories

use super::constants::*;
use ensemble_analytics::sections::{load_sections, LoadedSections};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A data file in its own temporary directory, removed on drop.
pub struct TestData {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestData {
    pub fn from_value(rows: &Value) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sections.json");
        fs::write(&path, serde_json::to_string_pretty(rows).unwrap()).unwrap();
        TestData { dir, path }
    }

    pub fn from_text(text: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sections.json");
        fs::write(&path, text).unwrap();
        TestData { dir, path }
    }

    /// Three terms of clean data. The latest term covers every risk level.
    pub fn standard() -> Self {
        Self::from_value(&standard_rows())
    }

    /// The standard rows plus a few broken ones.
    pub fn messy() -> Self {
        let mut rows = standard_rows();
        if let Value::Array(items) = &mut rows {
            items.push(json!(42));
            items.push(json!({
                "bSecTerm": LATEST_TERM,
                "secInstrumentation_seatscap": 10,
                "secInstrumentation_seatsavail": 5,
                "secInstrumentation_activestucount": 5
            }));
            items.push(json!({
                "bSecTerm": LATEST_TERM,
                "secInstrumentation_sectionname": "ENS-198-A",
                "secInstrumentation_seatscap": "ten",
                "secInstrumentation_seatsavail": 5,
                "secInstrumentation_activestucount": 5
            }));
            items.push(json!({
                "bSecTerm": LATEST_TERM,
                "secInstrumentation_sectionname": "ENS-199-A",
                "secInstrumentation_seatscap": 10,
                "secInstrumentation_seatsavail": 9,
                "secInstrumentation_activestucount": 5
            }));
        }
        Self::from_value(&rows)
    }

    pub fn load(&self) -> LoadedSections {
        load_sections(&self.path).unwrap()
    }

    pub fn output_dir(&self) -> &Path {
        self.dir.path()
    }
}

fn section(term: &str, name: &str, capacity: u32, available: u32, active: u32) -> Value {
    json!({
        "bSecTerm": term,
        "secInstrumentation_sectionname": name,
        "secInstrumentation_seatscap": capacity,
        "secInstrumentation_seatsavail": available,
        "secInstrumentation_activestucount": active,
    })
}

fn with(mut row: Value, extra: Value) -> Value {
    if let (Value::Object(row_map), Value::Object(extra_map)) = (&mut row, extra) {
        row_map.extend(extra_map);
    }
    row
}

fn standard_rows() -> Value {
    json!([
        with(
            section(LATEST_TERM, HEALTHY_SECTION, 10, 6, 4),
            json!({
                "secInstrumentation_titlelongcrs": ["Jazz Combo"],
                "secInstrumentation_facnamepreffml": [FACULTY_SMITH],
                "style": "Jazz",
                "ratingOverall": 5,
                "department": "Jazz Studies",
                "rhythminstrument": ["GUIT", "PNO"],
                "rhythmenrolled": [2, 1],
                "rhythmneeded": ["BASS"],
                "bSinCsmDays": ["M", "W"],
                "bSinCsmStartTime": "10:00",
                "bSinCsmEndTime": "11:30"
            })
        ),
        with(
            section(LATEST_TERM, LOW_SECTION, 8, 7, 1),
            json!({
                "secInstrumentation_titlelongcrs": "Rock Ensemble",
                "secInstrumentation_facnamepreffml": [FACULTY_LEE, FACULTY_SMITH],
                "style": "Rock",
                "rhythminstrument": ["DRUMS"],
                "rhythmenrolled": ["1"],
                "rhythmneeded": ["GUIT", "VOICE"],
                "bSinCsmDays": ["T", "R"],
                "bSinCsmStartTime": "14:00",
                "bSinCsmEndTime": "15:30"
            })
        ),
        with(
            section(LATEST_TERM, FULL_SECTION, 12, 0, 12),
            json!({
                "secInstrumentation_titlelongcrs": "Rock Ensemble",
                "secInstrumentation_facnamepreffml": FACULTY_LEE,
                "style": "Rock",
                "ratingOverall": "4",
                "rhythminstrument": ["GUIT", "BASS", "DRUMS"],
                "rhythmenrolled": [4, 4, 4],
                "rhythmneeded": []
            })
        ),
        with(
            section(LATEST_TERM, EMPTY_SECTION, 6, 6, 0),
            json!({
                "secInstrumentation_titlelongcrs": "Jazz Combo",
                "style": "Jazz",
                "rhythmneeded": ["PNO"]
            })
        ),
        with(
            section(LATEST_TERM, MALFORMED_SECTION, 10, 2, 8),
            json!({
                "secInstrumentation_titlelongcrs": "Pop Choir",
                "secInstrumentation_facnamepreffml": [FACULTY_SMITH],
                "style": "Pop",
                "rhythminstrument": ["GUIT", "PNO", "VOICE"],
                "rhythmenrolled": ["3"]
            })
        ),
        section(MIDDLE_TERM, "ENS-101-S", 10, 4, 6),
        section(MIDDLE_TERM, "ENS-102-S", 10, 6, 4),
        section(OLDEST_TERM, "ENS-101-F", 10, 5, 5),
        section(OLDEST_TERM, "ENS-102-F", 10, 7, 3),
    ])
}
