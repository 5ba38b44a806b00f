// Spreadsheet in, reports out.

use calamine::{open_workbook_auto, Reader};
use rust_xlsxwriter::Workbook;
use salami_io::{output_path_for_institution, read_roster, write_date_report, IoError};
use salami_roster::{aggregate, project_by_date, RosterConfig};
use tempfile::TempDir;

const T1: &str = "12.05.25 09:00 - 12:00";
const T2: &str = "13.05.25 09:00 - 11:00";

fn write_input(dir: &TempDir, sheet: &str) -> std::path::PathBuf {
    let path = dir.path().join("matura.xlsx");
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet().set_name(sheet).unwrap();
    let rows: [[&str; 4]; 3] = [
        ["Imię", "Nazwisko", T1, T2],
        [
            "Anna",
            "Nowak",
            "Placówka: SP 1\nSala: 101\nEgzamin: Matematyka\nRola: Przewodniczący",
            "Placówka: SP 1, Sala: 101, Egzamin: Polski",
        ],
        ["Jan", "Kowalski", "Placówka: SP 1\nSala: 101", "nie dotyczy"],
    ];
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            ws.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    workbook.save(&path).unwrap();
    path
}

#[test]
fn xlsx_roster_to_date_report() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "Sheet1");
    let config = RosterConfig::default();

    let roster = read_roster(&input, None).unwrap();
    assert_eq!(roster.headers.len(), 4);
    assert_eq!(roster.rows[0].line, 2);

    let aggregation = aggregate(&config, &roster).unwrap();
    assert_eq!(aggregation.stats.assignments, 3);
    assert_eq!(aggregation.stats.cells_not_applicable, 1);

    let reports = project_by_date(&aggregation.registry, &config);
    assert_eq!(reports.len(), 1);
    let report = &reports[0];

    let path = output_path_for_institution(&input, None, &report.file_name, &config.output.suffix);
    assert_eq!(path, dir.path().join("matura - SP 1 - SALAMI.xlsx"));
    let written = write_date_report(report, &config.output, &path).unwrap();
    assert_eq!(written, path);

    let mut workbook = open_workbook_auto(&written).unwrap();
    assert_eq!(workbook.sheet_names().to_vec(), vec!["05.12", "05.13"]);
    let range = workbook.worksheet_range("05.12").unwrap();
    let top = config.output.start_row;
    assert_eq!(
        range.get_value((top, 1)).map(|d| d.to_string()),
        Some("101 09:00".to_string())
    );
}

#[test]
fn numeric_cells_read_as_integers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("numbers.xlsx");
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.write_string(0, 0, "Sala").unwrap();
    ws.write_number(1, 0, 101.0).unwrap();
    ws.write_number(2, 0, 2.5).unwrap();
    workbook.save(&path).unwrap();

    let roster = read_roster(&path, None).unwrap();
    assert_eq!(roster.rows[0].get("Sala"), "101");
    assert_eq!(roster.rows[1].get("Sala"), "2.5");
}

#[test]
fn only_sheet_is_used_when_sheet1_is_absent() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "Dyżury");
    let roster = read_roster(&input, None).unwrap();
    assert_eq!(roster.rows.len(), 2);
}

#[test]
fn missing_named_sheet_is_reported() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "Dyżury");
    match read_roster(&input, Some("Arkusz2")) {
        Err(IoError::Sheet { requested, available }) => {
            assert_eq!(requested, "Arkusz2");
            assert_eq!(available, vec!["Dyżury".to_string()]);
        }
        other => panic!("expected sheet error, got {:?}", other.map(|r| r.headers)),
    }
}

#[test]
fn csv_roster_reads_like_xlsx() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("matura.csv");
    std::fs::write(
        &input,
        format!(
            "Imię;Nazwisko;{T1}\nAnna;Nowak;\"Placówka: SP 1\nSala: 101\"\n;;\n"
        ),
    )
    .unwrap();

    let roster = read_roster(&input, Some("ignored")).unwrap();
    assert_eq!(roster.headers, vec!["Imię", "Nazwisko", T1]);
    assert_eq!(roster.rows.len(), 2);

    let aggregation = aggregate(&RosterConfig::default(), &roster).unwrap();
    assert_eq!(aggregation.stats.assignments, 1);
    assert_eq!(aggregation.stats.blank_rows_skipped, 1);
}

#[test]
fn csv_rows_report_physical_lines() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("matura.csv");
    std::fs::write(
        &input,
        format!(
            "Imię;Nazwisko;{T1}\nAnna;Nowak;\"Placówka: SP 1\nSala: 101\nEgzamin: Matematyka\"\nJan;Kowalski;nie dotyczy\n"
        ),
    )
    .unwrap();

    let roster = read_roster(&input, None).unwrap();
    let lines: Vec<usize> = roster.rows.iter().map(|row| row.line).collect();
    assert_eq!(lines, vec![2, 5]);
}
