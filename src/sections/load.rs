//! Section data loading

use super::raw::RawSection;
use super::{EnsembleSection, LoadProblem};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Sections that made it through loading, plus everything that was wrong
/// with the rows along the way.
#[derive(Debug, Default)]
pub struct LoadedSections {
    pub sections: Vec<EnsembleSection>,
    pub problems: Vec<LoadProblem>,
}

impl LoadedSections {
    /// Parses a JSON document holding an array of section rows.
    ///
    /// Only a document that is not valid JSON, or not an array, is an error.
    /// Bad rows are reported in `problems`.
    pub fn from_json_str(text: &str) -> Result<LoadedSections> {
        let document: Value = serde_json::from_str(text).context("Section data is not valid JSON")?;
        let rows = match document {
            Value::Array(rows) => rows,
            other => bail!(
                "Section data must be a JSON array of rows, found {}",
                json_kind(&other)
            ),
        };
        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(rows: Vec<Value>) -> LoadedSections {
        let mut out = LoadedSections {
            sections: Vec::with_capacity(rows.len()),
            problems: Vec::new(),
        };

        for (index, row) in rows.into_iter().enumerate() {
            if !row.is_object() {
                out.problems.push(LoadProblem::NotAnObject { index });
                continue;
            }
            let raw: RawSection = match serde_json::from_value(row) {
                Ok(raw) => raw,
                Err(err) => {
                    out.problems.push(LoadProblem::Unreadable {
                        index,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            match raw.into_section(index) {
                Ok(section) => {
                    if !section.capacity_is_consistent() {
                        out.problems.push(LoadProblem::CapacityMismatch {
                            index,
                            section: section.section_name.clone(),
                            capacity: section.seats_capacity,
                            available: section.seats_available,
                            active: section.active_student_count,
                        });
                    }
                    out.sections.push(section);
                }
                Err(problem) => out.problems.push(problem),
            }
        }

        out
    }

    pub fn skipped_rows(&self) -> usize {
        self.problems.iter().filter(|p| p.skips_row()).count()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn load_sections<P: AsRef<Path>>(path: P) -> Result<LoadedSections> {
    let path = path.as_ref();
    debug!("Reading section data from {}", path.display());
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read section data: {}", path.display()))?;
    let loaded = LoadedSections::from_json_str(&text)
        .with_context(|| format!("Failed to parse section data: {}", path.display()))?;

    if !loaded.problems.is_empty() {
        info!("Found {} problems:", loaded.problems.len());
        for problem in loaded.problems.iter() {
            info!("- {}", problem);
        }
    }

    match (loaded.sections.is_empty(), loaded.problems.is_empty()) {
        (false, true) => info!("Section data checked, no issues found."),
        (false, false) => info!(
            "Section data loaded, but check the {} non-fatal issues above ({} rows skipped).",
            loaded.problems.len(),
            loaded.skipped_rows()
        ),
        (true, _) => info!("No usable sections found in {}.", path.display()),
    }
    info!("Loaded {} sections", loaded.sections.len());

    Ok(loaded)
}
