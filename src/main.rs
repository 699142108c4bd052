use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ensemble_analytics::analytics::{
    alerts, compute_metrics, enrollment_distribution, forecast, group_by, instrument_status,
    instrument_summary, low_enrollment_breakdown, sections_needing, summarize, term_series,
    AnalyticsError, Forecast, GroupKey, InstrumentStatus, SectionMetrics, Thresholds,
};
use ensemble_analytics::config::{AppConfig, CliConfig, FileConfig};
use ensemble_analytics::export::{
    export_filename, write_json, write_low_enrollment_csv, write_sections_csv, ExecutiveReport,
    GroupReport,
};
use ensemble_analytics::sections::{
    available_terms, load_sections, EnsembleSection, LoadedSections, SectionFilter,
};

mod cli_style;
use cli_style::{
    colors, print_banner, print_empty_list, print_error, print_info, print_key_value,
    print_key_value_highlight, print_list_item_styled, print_section_footer,
    print_section_header, print_success, print_warning, risk_color, severity_color,
    TableBuilder,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Enrollment reports for ensemble sections.
#[derive(Parser, Debug)]
#[command(name = "ensemble-report", version, about, styles = cli_style::get_styles())]
struct CliArgs {
    /// Path to the JSON file with the ensemble section rows.
    #[clap(value_parser = parse_path)]
    pub data: PathBuf,

    /// Path to a TOML config file with thresholds, instruments and export settings.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Term to report on. Defaults to the latest term in the data.
    #[clap(long, conflicts_with = "all_terms")]
    pub term: Option<String>,

    /// Report on every term at once.
    #[clap(long)]
    pub all_terms: bool,

    /// Only keep sections of this style.
    #[clap(long)]
    pub style: Option<String>,

    /// Only keep sections with this overall rating.
    #[clap(long)]
    pub rating: Option<u32>,

    /// Only keep sections that still need this instrument code. Repeat to
    /// require several instruments at once.
    #[clap(long = "instrument")]
    pub instruments: Vec<String>,

    /// Case-insensitive search on section name, faculty and course title.
    #[clap(long)]
    pub search: Option<String>,

    /// Sections with fewer active students than this are low-enrollment.
    #[clap(long)]
    pub low_enrollment: Option<u32>,

    /// How many terms ahead to forecast.
    #[clap(long)]
    pub forecast_periods: Option<usize>,

    /// Directory CSV exports are written to.
    #[clap(long, value_parser = parse_path)]
    pub output_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the section data and list every problem found.
    Check {
        /// Fail on the first problem instead of only listing them.
        #[clap(long)]
        strict: bool,
    },
    /// Print metrics, distribution, instrument coverage and alerts.
    Summary,
    /// Write a JSON report.
    Report {
        #[clap(value_enum)]
        kind: ReportKind,

        /// Write to this file instead of stdout.
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Write a CSV file into the output directory.
    Export {
        #[clap(value_enum)]
        kind: ExportKind,
    },
    /// Print the term history and a naive linear forecast.
    Forecast {
        /// Overrides --forecast-periods.
        #[clap(long)]
        periods: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportKind {
    Executive,
    Department,
    Faculty,
    Instrument,
    Term,
    Style,
}

impl ReportKind {
    fn group_key(&self) -> Option<GroupKey> {
        match self {
            ReportKind::Executive => None,
            ReportKind::Department => Some(GroupKey::Department),
            ReportKind::Faculty => Some(GroupKey::Faculty),
            ReportKind::Instrument => Some(GroupKey::Instrument),
            ReportKind::Term => Some(GroupKey::Term),
            ReportKind::Style => Some(GroupKey::Style),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportKind {
    Sections,
    LowEnrollment,
}

impl ExportKind {
    fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Sections => "sections",
            ExportKind::LowEnrollment => "low_enrollment",
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Reports can go to stdout, so logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    let forecast_periods = match &cli_args.command {
        Command::Forecast { periods } => periods.or(cli_args.forecast_periods),
        _ => cli_args.forecast_periods,
    };
    let cli_config = CliConfig {
        low_enrollment_students: cli_args.low_enrollment,
        forecast_periods,
        output_dir: cli_args.output_dir.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Loading section data from {:?}...", cli_args.data);
    let loaded = load_sections(&cli_args.data)?;

    if let Command::Check { strict } = cli_args.command {
        return run_check(&loaded, strict);
    }

    let filter = build_filter(&cli_args, &loaded.sections);
    let selected = filter.apply(&loaded.sections);
    info!(
        "{} of {} sections match the current filter",
        selected.len(),
        loaded.sections.len()
    );
    let metrics = compute_metrics(&selected, &config.thresholds);

    match cli_args.command {
        Command::Check { .. } => Ok(()),
        Command::Summary => {
            let history = forecast_history(&loaded.sections, &filter, &config);
            print_summary(&filter, &metrics, &config, &history);
            Ok(())
        }
        Command::Report { kind, output } => {
            let generated_at = Utc::now();
            let mut writer = open_output(output.as_deref())?;
            match kind.group_key() {
                None => {
                    let history = forecast_history(&loaded.sections, &filter, &config);
                    let report = ExecutiveReport::build(
                        &filter,
                        &metrics,
                        &config.thresholds,
                        &config.instrument_codes,
                        history,
                        generated_at,
                    );
                    write_json(&mut writer, &report)?;
                }
                Some(key) => {
                    let report = GroupReport::build(&filter, &metrics, key, generated_at);
                    write_json(&mut writer, &report)?;
                }
            }
            writer.flush().context("Failed to write report")?;
            if let Some(path) = output {
                print_success(&format!("Report written to {}", path.display()));
            }
            Ok(())
        }
        Command::Export { kind } => run_export(kind, &filter, &metrics, &config),
        Command::Forecast { .. } => {
            let history = forecast_history(&loaded.sections, &filter, &config);
            print_forecast(history);
            Ok(())
        }
    }
}

/// The term defaults to the latest one in the data unless every term is asked for.
fn build_filter(cli_args: &CliArgs, sections: &[EnsembleSection]) -> SectionFilter {
    let term = if cli_args.all_terms {
        None
    } else {
        cli_args
            .term
            .clone()
            .or_else(|| available_terms(sections).pop())
    };

    SectionFilter {
        term,
        style: cli_args.style.clone(),
        rating: cli_args.rating,
        instrument_needs: cli_args.instruments.clone(),
        search: cli_args.search.clone(),
    }
}

/// Forecast over every term, with the rest of the filter still applied.
fn forecast_history(
    sections: &[EnsembleSection],
    filter: &SectionFilter,
    config: &AppConfig,
) -> Result<Forecast, AnalyticsError> {
    let history_filter = SectionFilter {
        term: None,
        ..filter.clone()
    };
    let selected = history_filter.apply(sections);
    let metrics = compute_metrics(&selected, &config.thresholds);
    let series = term_series(&group_by(&metrics, GroupKey::Term));
    forecast(&series, config.forecast_periods)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

fn run_check(loaded: &LoadedSections, strict: bool) -> Result<()> {
    print_section_header("Data Check");
    print_key_value("Sections loaded", &loaded.sections.len().to_string());
    print_key_value("Rows skipped", &loaded.skipped_rows().to_string());
    print_key_value(
        "Terms",
        &available_terms(&loaded.sections).join(", "),
    );

    if loaded.problems.is_empty() {
        print_success("No problems found");
        print_section_footer();
        return Ok(());
    }

    for problem in &loaded.problems {
        if problem.skips_row() {
            print_error(&problem.to_string());
        } else {
            print_warning(&problem.to_string());
        }
    }
    print_section_footer();

    if strict {
        if let Some(problem) = loaded.problems.first() {
            return Err(problem.to_error().into());
        }
    }
    Ok(())
}

fn scope_label(filter: &SectionFilter) -> String {
    filter
        .term
        .clone()
        .unwrap_or_else(|| "all terms".to_string())
}

fn print_summary(
    filter: &SectionFilter,
    metrics: &[SectionMetrics<'_>],
    config: &AppConfig,
    history: &Result<Forecast, AnalyticsError>,
) {
    print_banner("Enrollment Summary");

    let summary = summarize(metrics);
    print_section_header("Overview");
    print_key_value_highlight("Scope", &scope_label(filter));
    print_key_value("Sections", &summary.total_sections.to_string());
    print_key_value("Total seats", &summary.total_seats.to_string());
    print_key_value("Enrolled students", &summary.enrolled_students.to_string());
    print_key_value("Open seats", &summary.open_seats.to_string());
    match summary.capacity_utilization.ratio("Capacity utilization") {
        Ok(ratio) => print_key_value("Capacity utilization", &format!("{:.1}%", ratio * 100.0)),
        Err(err) => print_warning(&err.to_string()),
    }
    print_key_value(
        "Average enrollment rate",
        &summary.average_enrollment_rate.to_string(),
    );
    print_key_value(
        "At risk",
        &format!(
            "{} ({} with no students)",
            summary.risk_counts.at_risk(),
            summary.risk_counts.no_students
        ),
    );
    print_key_value("Full", &summary.risk_counts.full_capacity.to_string());
    if summary.malformed_rows > 0 {
        print_warning(&format!(
            "{} sections have mismatched instrument lists",
            summary.malformed_rows
        ));
    }
    print_section_footer();

    if metrics.is_empty() {
        print_empty_list("No sections match the current filter");
        return;
    }

    print_section_header("Enrollment Distribution");
    let mut distribution = TableBuilder::new(vec!["Rate", "Sections"]);
    for (band, count) in enrollment_distribution(metrics) {
        distribution.add_row(vec![band.label().to_string(), count.to_string()]);
    }
    distribution.print();

    print_section_header("Sections");
    let mut sections = TableBuilder::new(vec![
        "Section", "Faculty", "Enrolled", "Capacity", "Rate", "Status",
    ]);
    let mut instrument_table = TableBuilder::new(
        std::iter::once("Section")
            .chain(config.instrument_codes.iter().map(String::as_str))
            .collect(),
    );
    for m in metrics {
        let s = m.section;
        sections.add_row_colored(
            vec![
                s.section_name.clone(),
                s.faculty_display(),
                s.active_student_count.to_string(),
                s.seats_capacity.to_string(),
                m.enrollment_rate.to_string(),
                m.risk.as_str().to_string(),
            ],
            risk_color(m.risk),
        );
        let mut row = vec![s.section_name.clone()];
        row.extend(
            config
                .instrument_codes
                .iter()
                .map(|code| match instrument_status(m, code) {
                    InstrumentStatus::Filled => format!("Filled ({})", m.enrolled_for(code)),
                    status => status.as_str().to_string(),
                }),
        );
        instrument_table.add_row(row);
    }
    sections.print();

    print_section_header("Instrument Coverage");
    instrument_table.print();
    let mut coverage = TableBuilder::new(vec![
        "Instrument",
        "Needed",
        "Enrolled",
        "Sections needing",
        "Filled",
        "Fill rate",
    ]);
    for item in instrument_summary(metrics, &config.instrument_codes) {
        coverage.add_row(vec![
            item.code,
            item.needed.to_string(),
            item.enrolled.to_string(),
            item.sections_needing.to_string(),
            item.filled_sections.to_string(),
            item.fill_rate.to_string(),
        ]);
    }
    coverage.print();

    print_section_header("Recruiting");
    let mut recruiting = TableBuilder::new(vec!["Instrument", "Sections"]);
    for code in &config.instrument_codes {
        let names: Vec<&str> = sections_needing(metrics.iter().map(|m| m.section), code)
            .into_iter()
            .map(|s| s.section_name.as_str())
            .collect();
        if !names.is_empty() {
            recruiting.add_row(vec![code.clone(), names.join(", ")]);
        }
    }
    if recruiting.is_empty() {
        print_empty_list("No section is recruiting");
    } else {
        recruiting.print();
    }

    print_section_header("Alerts");
    let items = alerts(metrics, &config.thresholds);
    if items.is_empty() {
        print_empty_list("No alerts");
    }
    for alert in &items {
        print_list_item_styled(
            &format!("{}: {}", alert.section_name, alert.message),
            severity_color(alert.severity),
            1,
        );
    }
    println!();
    print_low_enrollment_breakdown(metrics, &config.thresholds);
    print_section_footer();

    match history {
        Ok(f) => print_info(&format!(
            "Naive forecast for the next term: {:.1}%",
            f.projections
                .first()
                .map(|p| p.rate * 100.0)
                .unwrap_or_default()
        )),
        Err(e) => print_info(&format!("Forecast unavailable: {}", e)),
    }
}

fn print_low_enrollment_breakdown(metrics: &[SectionMetrics<'_>], thresholds: &Thresholds) {
    let breakdown = low_enrollment_breakdown(metrics, thresholds);
    let total: usize = breakdown.values().sum();
    print_key_value_highlight(
        "Sections under the enrollment cutoff",
        &format!("{} (fewer than {} students)", total, thresholds.low_enrollment_students),
    );
    for (students, count) in breakdown {
        let label = if students == 1 { "student" } else { "students" };
        print_key_value(&format!("{} {}", students, label), &count.to_string());
    }
}

fn run_export(
    kind: ExportKind,
    filter: &SectionFilter,
    metrics: &[SectionMetrics<'_>],
    config: &AppConfig,
) -> Result<()> {
    let export = &config.export;
    std::fs::create_dir_all(&export.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            export.output_dir.display()
        )
    })?;

    let term = filter
        .term
        .clone()
        .unwrap_or_else(|| "all_terms".to_string());
    let timestamp = export
        .include_timestamp
        .then(|| Local::now().naive_local());
    let path = export
        .output_dir
        .join(export_filename(&export.file_prefix, kind.as_str(), &term, timestamp));

    let file = File::create(&path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let rows = match kind {
        ExportKind::Sections => {
            write_sections_csv(&mut writer, metrics)?;
            metrics.len()
        }
        ExportKind::LowEnrollment => write_low_enrollment_csv(&mut writer, metrics)?,
    };
    info!("Wrote {} rows to {}", rows, path.display());

    if rows == 0 {
        print_warning(&format!("No rows to export, wrote headers only to {}", path.display()));
    } else {
        print_success(&format!("Exported {} rows to {}", rows, path.display()));
    }
    Ok(())
}

fn print_forecast(result: Result<Forecast, AnalyticsError>) {
    print_section_header("Enrollment Forecast");
    let forecast = match result {
        Ok(forecast) => forecast,
        Err(e) => {
            warn!("Forecast unavailable: {}", e);
            print_error(&format!("Forecast unavailable: {}", e));
            print_section_footer();
            return;
        }
    };

    let mut history = TableBuilder::new(vec!["Term", "Sections", "Enrollment rate"]);
    for point in &forecast.history {
        history.add_row(vec![
            point.term.clone(),
            point.section_count.to_string(),
            point.rate.to_string(),
        ]);
    }
    history.print();

    let mut projections = TableBuilder::new(vec!["Terms ahead", "Projected rate"]);
    for p in &forecast.projections {
        projections.add_row_colored(
            vec![format!("+{}", p.offset), format!("{:.1}%", p.rate * 100.0)],
            colors::TEAL,
        );
    }
    projections.print();

    print_key_value(
        "Trend",
        &format!("{:+.1} points per term", forecast.slope * 100.0),
    );
    println!("  {}", forecast.disclaimer.with(colors::DIM));
    print_section_footer();
}
