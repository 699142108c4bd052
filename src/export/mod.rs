mod csv;
mod report;

pub use csv::{
    escape_field, export_filename, write_low_enrollment_csv, write_sections_csv, DROP_RISK_LABEL,
};
pub use report::{
    write_json, AlertCounts, AlertSection, DistributionRow, ExecutiveReport, GroupReport,
};
