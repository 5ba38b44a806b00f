// Report export (xlsx)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet, XlsxError};
use salami_roster::config::{OutputConfig, INVALID_SHEET_CHARS, MAX_SHEET_NAME_LEN};
use salami_roster::project::{DateSheet, FlatSheet, InstitutionReport, FLAT_HEADERS};

use crate::error::IoError;
use crate::paths::write_new_file;

/// Write one institution's per-date report to `path`, or to the next free
/// `"<stem> (n).xlsx"` beside it. Returns the path actually written.
pub fn write_date_report(
    report: &InstitutionReport,
    output: &OutputConfig,
    path: &Path,
) -> Result<PathBuf, IoError> {
    let bytes = build_date_report(report, output)
        .and_then(|mut workbook| workbook.save_to_buffer())
        .map_err(|e| write_error(path, e))?;
    let written = write_new_file(path, &bytes)?;
    log::info!(
        "wrote {} ({} sheets) to {}",
        report.institution,
        report.sheets.len(),
        written.display()
    );
    Ok(written)
}

/// Write every institution's flat listing into a single workbook.
pub fn write_flat_report(sheets: &[FlatSheet], path: &Path) -> Result<PathBuf, IoError> {
    let bytes = build_flat_report(sheets)
        .and_then(|mut workbook| workbook.save_to_buffer())
        .map_err(|e| write_error(path, e))?;
    let written = write_new_file(path, &bytes)?;
    log::info!("wrote {} institutions to {}", sheets.len(), written.display());
    Ok(written)
}

fn write_error(path: &Path, e: XlsxError) -> IoError {
    IoError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn header_format() -> Format {
    Format::new().set_bold().set_border(FormatBorder::Thin)
}

fn build_date_report(report: &InstitutionReport, output: &OutputConfig) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = header_format();
    let mut names = SheetNames::default();

    for sheet in &report.sheets {
        let name = names.claim(&sheet.name);
        let worksheet = workbook.add_worksheet().set_name(&name)?;
        write_date_sheet(worksheet, sheet, output, &header)?;
    }

    if report.sheets.is_empty() {
        // A workbook needs at least one sheet
        workbook.add_worksheet().set_name(names.claim(&report.short_name))?;
    }
    Ok(workbook)
}

/// Titles across the header row at `start_row`, subject then people below,
/// and a leading column numbering the body rows from zero.
fn write_date_sheet(
    worksheet: &mut Worksheet,
    sheet: &DateSheet,
    output: &OutputConfig,
    header: &Format,
) -> Result<(), XlsxError> {
    let top = output.start_row;
    let columns = sheet.columns();
    let height = columns.first().map(|c| c.cells.len()).unwrap_or(0);

    for idx in 0..height {
        worksheet.write_number(top + 1 + idx as u32, 0, idx as f64)?;
    }

    for (idx, column) in columns.iter().enumerate() {
        let col = idx as u16 + 1;
        worksheet.write_string_with_format(top, col, &column.title, header)?;
        for (offset, value) in column.cells.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(top + 1 + offset as u32, col, value)?;
            }
        }
        worksheet.set_column_width(col, output.column_width)?;
    }
    Ok(())
}

fn build_flat_report(sheets: &[FlatSheet]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = header_format();
    let mut names = SheetNames::default();

    for sheet in sheets {
        let name = names.claim(&sheet.name);
        let worksheet = workbook.add_worksheet().set_name(&name)?;

        for (idx, title) in FLAT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, idx as u16 + 1, *title, &header)?;
        }
        for (idx, row) in sheet.rows.iter().enumerate() {
            let r = idx as u32 + 1;
            worksheet.write_number(r, 0, idx as f64)?;
            for (c, value) in row.cells().iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(r, c as u16 + 1, *value)?;
                }
            }
        }
        worksheet.autofit();
    }

    if sheets.is_empty() {
        workbook.add_worksheet();
    }
    Ok(workbook)
}

// ---------------------------------------------------------------------------
// Sheet names
// ---------------------------------------------------------------------------

/// Make `raw` usable as a worksheet name: forbidden characters become `_`,
/// surrounding apostrophes and blanks are trimmed and the result is cut to
/// the 31-character limit.
pub fn sheet_name(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == '\'' || c.is_whitespace());
    let cut: String = trimmed.chars().take(MAX_SHEET_NAME_LEN).collect();
    let cut = cut.trim_end();
    if cut.is_empty() {
        "Sheet".to_string()
    } else {
        cut.to_string()
    }
}

/// Names already used in one workbook. Excel compares them case-insensitively.
#[derive(Default)]
struct SheetNames {
    used: HashSet<String>,
}

impl SheetNames {
    fn claim(&mut self, raw: &str) -> String {
        let base = sheet_name(raw);
        let mut candidate = base.clone();
        let mut n = 2;
        while !self.used.insert(candidate.to_lowercase()) {
            let suffix = format!(" ({})", n);
            let room = MAX_SHEET_NAME_LEN - suffix.chars().count();
            let head: String = base.chars().take(room).collect();
            candidate = format!("{}{}", head.trim_end(), suffix);
            n += 1;
        }
        if candidate != raw {
            log::debug!("sheet '{}' written as '{}'", raw, candidate);
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Data, Reader};
    use salami_roster::project::{FlatRow, ReportRow};
    use salami_roster::Person;
    use tempfile::TempDir;

    fn report() -> InstitutionReport {
        let row = |title: &str, subject: &str, people: Vec<Person>| ReportRow {
            title: title.to_string(),
            subject: subject.to_string(),
            people,
        };
        InstitutionReport {
            institution: "SP 1, ul. Szkolna 5".into(),
            short_name: "SP 1".into(),
            file_name: "SP 1".into(),
            sheets: vec![DateSheet {
                date: None,
                name: "05.12".into(),
                rows: vec![
                    row(
                        "101 09:00",
                        "Matematyka",
                        vec![
                            Person::new("Anna", "Nowak").with_role("Przewodniczący"),
                            Person::new("Jan", "Kowalski"),
                        ],
                    ),
                    row("102 09:00", "", vec![Person::new("Ewa", "Lis")]),
                ],
            }],
        }
    }

    fn text(value: Option<&Data>) -> String {
        match value {
            Some(Data::String(s)) => s.clone(),
            Some(Data::Float(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    #[test]
    fn date_report_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        let output = OutputConfig::default();

        let written = write_date_report(&report(), &output, &path).unwrap();
        assert_eq!(written, path);

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names().to_vec(), vec!["05.12"]);
        let range = workbook.worksheet_range("05.12").unwrap();

        let top = output.start_row;
        assert_eq!(text(range.get_value((top, 1))), "101 09:00");
        assert_eq!(text(range.get_value((top, 2))), "102 09:00");
        assert_eq!(text(range.get_value((top + 1, 1))), "Matematyka");
        assert_eq!(
            text(range.get_value((top + 2, 1))),
            "Anna Nowak (Przewodniczący)"
        );
        assert_eq!(text(range.get_value((top + 3, 1))), "Jan Kowalski");
        assert_eq!(text(range.get_value((top + 1, 2))), "");
        assert_eq!(text(range.get_value((top + 2, 2))), "Ewa Lis");
        assert_eq!(text(range.get_value((top + 1, 0))), "0");
        assert_eq!(text(range.get_value((top + 3, 0))), "2");
    }

    #[test]
    fn existing_report_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        std::fs::write(&path, b"keep").unwrap();

        let written = write_date_report(&report(), &OutputConfig::default(), &path).unwrap();
        assert_eq!(written, dir.path().join("out (1).xlsx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    }

    #[test]
    fn flat_report_one_sheet_per_institution() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flat.xlsx");
        let sheet = |name: &str| FlatSheet {
            institution: name.to_string(),
            name: name.to_string(),
            rows: vec![FlatRow {
                room: "101".into(),
                term: "12.05.25 09:00 - 12:00".into(),
                subject: "Matematyka".into(),
                person: "Anna Nowak".into(),
                role: "Przewodniczący".into(),
            }],
        };

        write_flat_report(&[sheet("SP 1"), sheet("sp 1"), sheet("LO: 2")], &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec!["SP 1", "sp 1 (2)", "LO_ 2"]
        );
        let range = workbook.worksheet_range("SP 1").unwrap();
        assert_eq!(text(range.get_value((0, 1))), "Sala");
        assert_eq!(text(range.get_value((0, 5))), "Rola");
        assert_eq!(text(range.get_value((1, 1))), "101");
        assert_eq!(text(range.get_value((1, 4))), "Anna Nowak");
    }

    #[test]
    fn sheet_names_are_sanitized() {
        assert_eq!(sheet_name("a/b[c]"), "a_b_c_");
        assert_eq!(sheet_name("'quoted'"), "quoted");
        assert_eq!(sheet_name("   "), "Sheet");
        assert_eq!(sheet_name(&"x".repeat(40)).chars().count(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn long_duplicates_stay_within_limit() {
        let mut names = SheetNames::default();
        let long = "y".repeat(40);
        let first = names.claim(&long);
        let second = names.claim(&long);
        assert_eq!(first.chars().count(), MAX_SHEET_NAME_LEN);
        assert!(second.ends_with(" (2)"));
        assert_eq!(second.chars().count(), MAX_SHEET_NAME_LEN);
    }
}
