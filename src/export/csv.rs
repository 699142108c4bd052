//! CSV downloads for sections and low-enrollment lists.

use crate::analytics::{low_enrollment_status, SectionMetrics};
use chrono::NaiveDateTime;
use std::io::{self, Write};

const SECTION_HEADERS: [&str; 15] = [
    "bSecTerm",
    "secInstrumentation_sectionname",
    "secInstrumentation_titlelongcrs",
    "secInstrumentation_facnamepreffml",
    "secInstrumentation_seatsavail",
    "secInstrumentation_activestucount",
    "secInstrumentation_seatscap",
    "style",
    "ratingOverall",
    "bSinCsmDays",
    "bSinCsmStartTime",
    "bSinCsmEndTime",
    "enrollment_rate",
    "risk_level",
    "malformed_instrumentation",
];

const LOW_ENROLLMENT_HEADERS: [&str; 10] = [
    "Section",
    "Course_Title",
    "Faculty",
    "Schedule_Days",
    "Schedule_Time",
    "Enrolled_Students",
    "Total_Capacity",
    "Enrollment_Rate_Percent",
    "Status",
    "Risk_Level",
];

pub const DROP_RISK_LABEL: &str = "POTENTIALLY WILL BE DROPPED";

/// Quotes a field when it holds a comma, quote or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row<W: Write, S: AsRef<str>>(writer: &mut W, fields: &[S]) -> io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    writeln!(writer, "{}", line.join(","))
}

/// One row per section with source fields and derived columns.
pub fn write_sections_csv<W: Write>(writer: &mut W, metrics: &[SectionMetrics<'_>]) -> io::Result<()> {
    write_row(writer, &SECTION_HEADERS)?;
    for m in metrics {
        let s = m.section;
        write_row(
            writer,
            &[
                s.term.clone(),
                s.section_name.clone(),
                s.course_title.clone().unwrap_or_default(),
                s.faculty.join(", "),
                s.seats_available.to_string(),
                s.active_student_count.to_string(),
                s.seats_capacity.to_string(),
                s.style.clone().unwrap_or_default(),
                s.rating.map(|r| r.to_string()).unwrap_or_default(),
                s.days.join(", "),
                s.start_time.clone().unwrap_or_default(),
                s.end_time.clone().unwrap_or_default(),
                m.enrollment_rate.percent_cell(),
                m.risk.as_str().to_string(),
                m.malformed.is_some().to_string(),
            ],
        )?;
    }
    writer.flush()
}

/// Sections under the low-enrollment cutoff, the list handed to schedulers.
pub fn write_low_enrollment_csv<W: Write>(
    writer: &mut W,
    metrics: &[SectionMetrics<'_>],
) -> io::Result<usize> {
    write_row(writer, &LOW_ENROLLMENT_HEADERS)?;
    let mut rows = 0;
    for m in metrics.iter().filter(|m| m.risk.is_under_enrolled()) {
        let s = m.section;
        let (_, status) = low_enrollment_status(s.active_student_count);
        write_row(
            writer,
            &[
                s.section_name.clone(),
                s.course_title_display().to_string(),
                s.faculty_display(),
                s.days_display(),
                s.time_range_display(),
                s.active_student_count.to_string(),
                s.seats_capacity.to_string(),
                m.enrollment_rate.percent_cell(),
                status,
                DROP_RISK_LABEL.to_string(),
            ],
        )?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

/// `{prefix}_{kind}_{term}.csv`, with `_{YYYYmmdd_HHMMSS}` before the
/// extension when a timestamp is given.
pub fn export_filename(
    prefix: &str,
    kind: &str,
    term: &str,
    timestamp: Option<NaiveDateTime>,
) -> String {
    match timestamp {
        Some(ts) => format!(
            "{}_{}_{}_{}.csv",
            prefix,
            kind,
            term,
            ts.format("%Y%m%d_%H%M%S")
        ),
        None => format!("{}_{}_{}.csv", prefix, kind, term),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{compute_all_metrics, Thresholds};
    use crate::sections::EnsembleSection;
    use chrono::NaiveDate;

    fn make_section(name: &str, capacity: u32, active: u32) -> EnsembleSection {
        EnsembleSection {
            term: "2024FA".to_string(),
            section_name: name.to_string(),
            course_title: Some("Jazz Combo".to_string()),
            seats_capacity: capacity,
            seats_available: capacity.saturating_sub(active),
            active_student_count: active,
            faculty: vec!["Smith, Ann".to_string()],
            days: vec!["M".to_string(), "W".to_string()],
            start_time: Some("10:00".to_string()),
            end_time: Some("11:30".to_string()),
            ..Default::default()
        }
    }

    fn to_string(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_sections_csv() {
        let sections = vec![make_section("ENS-1", 10, 5), make_section("ENS-2", 0, 0)];
        let metrics = compute_all_metrics(&sections, &Thresholds::default());
        let mut out = Vec::new();
        write_sections_csv(&mut out, &metrics).unwrap();
        let text = to_string(out);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("bSecTerm,secInstrumentation_sectionname,"));
        assert_eq!(
            lines[1],
            "2024FA,ENS-1,Jazz Combo,\"Smith, Ann\",5,5,10,,,\"M, W\",10:00,11:30,50.0,healthy,false"
        );
        assert!(lines[2].contains(",N/A,no_students,"));
    }

    #[test]
    fn test_low_enrollment_csv() {
        let sections = vec![
            make_section("ENS-1", 10, 5),
            make_section("ENS-2", 10, 1),
            make_section("ENS-3", 10, 3),
        ];
        let metrics = compute_all_metrics(&sections, &Thresholds::default());
        let mut out = Vec::new();
        let rows = write_low_enrollment_csv(&mut out, &metrics).unwrap();
        let text = to_string(out);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(rows, 2);
        assert_eq!(lines[0], LOW_ENROLLMENT_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "ENS-2,Jazz Combo,\"Smith, Ann\",\"M, W\",10:00 - 11:30,1,10,10.0,CRITICAL - ONLY 1 STUDENT,POTENTIALLY WILL BE DROPPED"
        );
        assert!(lines[2].contains("WARNING - ONLY 3 STUDENTS"));
    }

    #[test]
    fn test_export_filename() {
        let ts = NaiveDate::from_ymd_opt(2024, 9, 3)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap();
        assert_eq!(
            export_filename("ensemble_dashboard", "low_enrollment", "2024FA", Some(ts)),
            "ensemble_dashboard_low_enrollment_2024FA_20240903_140509.csv"
        );
        assert_eq!(
            export_filename("music", "sections", "all", None),
            "music_sections_all.csv"
        );
    }
}
