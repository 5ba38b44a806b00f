// End-to-end tests for the `salami` binary.
// Run with: cargo test -p salami-cli --test cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use calamine::{open_workbook_auto, Reader};
use tempfile::TempDir;

const HEADER: &str = "Imię;Nazwisko;12.05.25 09:00 - 12:00;13.05.25 09:00 - 11:00";

const ROSTER: &str = "\
Imię;Nazwisko;12.05.25 09:00 - 12:00;13.05.25 09:00 - 11:00
Anna;Nowak;\"Placówka: SP 1, ul. Szkolna 5
Sala: 101
Egzamin: Matematyka
Rola: Przewodniczący\";\"Placówka: LO 2
Sala: 7\"
Jan;Kowalski;\"Placówka: SP 1, ul. Szkolna 5
Sala: 101\";nie dotyczy
";

fn salami(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_salami"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SALAMI_CONFIG")
        .output()
        .expect("run salami")
}

fn write_roster(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("matura.csv");
    std::fs::write(&path, content).unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn sheet_names(path: &Path) -> Vec<String> {
    open_workbook_auto(path).unwrap().sheet_names().to_vec()
}

#[test]
fn one_report_per_institution() {
    let dir = TempDir::new().unwrap();
    let input = write_roster(&dir, ROSTER);

    let output = salami(&[arg(&input)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let sp = dir.path().join("matura - SP 1 - SALAMI.xlsx");
    let lo = dir.path().join("matura - LO 2 - SALAMI.xlsx");
    assert_eq!(sheet_names(&sp), vec!["05.12"]);
    assert_eq!(sheet_names(&lo), vec!["05.13"]);

    let out = stdout(&output);
    assert!(out.contains("1. SP 1, ul. Szkolna 5"), "stdout: {out}");
    assert!(out.contains("2. LO 2"), "stdout: {out}");
    assert!(out.contains("2 institutions, 2 slots, 3 assignments"), "stdout: {out}");
}

#[test]
fn one_file_mode_writes_a_sheet_per_institution() {
    let dir = TempDir::new().unwrap();
    let input = write_roster(&dir, ROSTER);

    let output = salami(&[arg(&input), "--one-file", "--quiet"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let path = dir.path().join("matura - SALAMI.xlsx");
    assert_eq!(sheet_names(&path), vec!["SP 1", "LO 2"]);
}

#[test]
fn json_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_roster(&dir, ROSTER);
    let out_dir = dir.path().join("reports");
    std::fs::create_dir(&out_dir).unwrap();

    let output = salami(&[arg(&input), "--json", "--output-dir", arg(&out_dir)]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["one_file"], false);
    assert_eq!(summary["stats"]["assignments"], 3);
    assert_eq!(summary["stats"]["cells_not_applicable"], 1);
    let reports = summary["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["short_name"], "SP 1");
    assert_eq!(reports[0]["sheets"][0], "05.12");
    assert!(out_dir.join("matura - LO 2 - SALAMI.xlsx").exists());
}

#[test]
fn existing_reports_are_kept() {
    let dir = TempDir::new().unwrap();
    let input = write_roster(&dir, ROSTER);
    let taken = dir.path().join("matura - SALAMI.xlsx");
    std::fs::write(&taken, b"keep").unwrap();

    let output = salami(&[arg(&input), "-o", "-q"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(std::fs::read(&taken).unwrap(), b"keep");
    assert!(dir.path().join("matura - SALAMI (1).xlsx").exists());
}

#[test]
fn duplicate_assignment_exits_5() {
    let dir = TempDir::new().unwrap();
    let input = write_roster(
        &dir,
        &format!("{HEADER}\nAnna;Nowak;Placówka: SP 1, Sala: 101;\nAnna;Nowak;Placówka: SP 1, Sala: 101;\n"),
    );

    let output = salami(&[arg(&input)]);
    assert_eq!(output.status.code(), Some(5));
    let err = stderr(&output);
    assert!(err.contains("error: line 3:"), "stderr: {err}");
    assert!(err.contains("hint:"), "stderr: {err}");
    assert!(!dir.path().join("matura - SP 1 - SALAMI.xlsx").exists());
}

#[test]
fn missing_identity_column_exits_6() {
    let dir = TempDir::new().unwrap();
    let input = write_roster(&dir, "Imię;Nazwa;T1\nAnna;Nowak;x\n");

    let output = salami(&[arg(&input)]);
    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).contains("Nazwisko"));
}

#[test]
fn unreadable_input_exits_3() {
    let dir = TempDir::new().unwrap();
    let output = salami(&[arg(&dir.path().join("missing.csv"))]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn invalid_config_exits_4() {
    let dir = TempDir::new().unwrap();
    let input = write_roster(&dir, ROSTER);
    let config = dir.path().join("salami.toml");
    std::fs::write(&config, "[labels]\ninstitution = \"\"\n").unwrap();

    let output = salami(&[arg(&input), "--config", arg(&config)]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn missing_output_dir_exits_2() {
    let dir = TempDir::new().unwrap();
    let input = write_roster(&dir, ROSTER);

    let output = salami(&[arg(&input), "--output-dir", arg(&dir.path().join("nope"))]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn no_file_argument_is_a_usage_error() {
    let output = salami(&[]);
    assert_eq!(output.status.code(), Some(2));
}
