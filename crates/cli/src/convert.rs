//! `salami FILE`: read, aggregate, project, write.

use indicatif::{ProgressBar, ProgressStyle};
use salami_io::{
    output_path_for_institution, output_path_single, read_roster, write_date_report,
    write_flat_report,
};
use salami_roster::{
    project_by_date, project_flat, AggregateStats, Aggregation, Aggregator, Roster, RosterConfig,
};
use serde::Serialize;

use crate::exit_codes::{EXIT_ERROR, EXIT_USAGE};
use crate::{Cli, CliError};

#[derive(Debug, Serialize)]
struct RunSummary {
    input: String,
    one_file: bool,
    stats: AggregateStats,
    reports: Vec<ReportSummary>,
}

#[derive(Debug, Serialize)]
struct ReportSummary {
    institution: String,
    short_name: String,
    path: String,
    sheets: Vec<String>,
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => RosterConfig::from_file(path)?,
        None => RosterConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        if !dir.is_dir() {
            return Err(CliError::new(
                EXIT_USAGE,
                format!("output directory does not exist: {}", dir.display()),
            ));
        }
    }

    let roster = read_roster(&cli.file, cli.sheet.as_deref())?;
    let aggregation = aggregate_with_progress(&config, &roster, cli.quiet || cli.json)?;

    let reports = if aggregation.registry.is_empty() {
        log::warn!("{} lists no assignments, nothing written", cli.file.display());
        Vec::new()
    } else if cli.one_file {
        write_one_file(cli, &config, &aggregation)?
    } else {
        write_per_institution(cli, &config, &aggregation)?
    };

    let summary = RunSummary {
        input: cli.file.display().to_string(),
        one_file: cli.one_file,
        stats: aggregation.stats,
        reports,
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&summary);
    }
    Ok(())
}

fn aggregate_with_progress(
    config: &RosterConfig,
    roster: &Roster,
    hidden: bool,
) -> Result<Aggregation, CliError> {
    let progress = if hidden {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(roster.rows.len() as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rows {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    };

    let mut aggregator = Aggregator::new(config, &roster.headers)?;
    for row in &roster.rows {
        if let Err(e) = aggregator.push_row(row) {
            progress.abandon();
            return Err(CliError::from(e).at_line(row.line));
        }
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(aggregator.finish())
}

fn write_per_institution(
    cli: &Cli,
    config: &RosterConfig,
    aggregation: &Aggregation,
) -> Result<Vec<ReportSummary>, CliError> {
    let mut reports = Vec::new();
    for report in project_by_date(&aggregation.registry, config) {
        if report.sheets.is_empty() {
            log::warn!("'{}' has only undated slots, no report written", report.institution);
            continue;
        }
        let path = output_path_for_institution(
            &cli.file,
            cli.output_dir.as_deref(),
            &report.file_name,
            &config.output.suffix,
        );
        let written = write_date_report(&report, &config.output, &path)?;
        reports.push(ReportSummary {
            sheets: report.sheets.iter().map(|s| s.name.clone()).collect(),
            institution: report.institution,
            short_name: report.short_name,
            path: written.display().to_string(),
        });
    }
    Ok(reports)
}

fn write_one_file(
    cli: &Cli,
    config: &RosterConfig,
    aggregation: &Aggregation,
) -> Result<Vec<ReportSummary>, CliError> {
    let sheets = project_flat(&aggregation.registry, config);
    let path = output_path_single(&cli.file, cli.output_dir.as_deref(), &config.output.suffix);
    let written = write_flat_report(&sheets, &path)?.display().to_string();
    Ok(sheets
        .into_iter()
        .map(|sheet| ReportSummary {
            sheets: vec![sheet.name.clone()],
            short_name: sheet.name,
            institution: sheet.institution,
            path: written.clone(),
        })
        .collect())
}

fn print_summary(summary: &RunSummary) {
    for (idx, report) in summary.reports.iter().enumerate() {
        println!("{}. {}", idx + 1, report.institution);
        println!("   {} -> {}", report.short_name, report.path);
    }
    let s = &summary.stats;
    println!(
        "{} institutions, {} slots, {} assignments from {} rows",
        s.institutions, s.slots, s.assignments, s.rows_processed
    );
    if s.malformed_lines_skipped > 0 {
        println!("{} malformed cell lines skipped", s.malformed_lines_skipped);
    }
}
