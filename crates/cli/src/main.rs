// salami - regroup a wide duty roster into per-institution reports

mod convert;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use salami_io::IoError;
use salami_roster::RosterError;

use exit_codes::{io_exit_code, roster_exit_code, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "salami")]
#[command(about = "Regroup a wide duty roster into per-institution, per-date reports")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
Examples:
  salami matura.xlsx
  salami matura.xlsx --sheet Dyżury
  salami matura.csv --one-file --output-dir reports/
  salami matura.xlsx -c english.toml --json")]
pub struct Cli {
    /// Roster file (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
    pub file: PathBuf,

    /// Worksheet to read (default: Sheet1, or the only sheet)
    #[arg(long, short = 's')]
    pub sheet: Option<String>,

    /// One workbook with a sheet per institution instead of a workbook per institution
    #[arg(long, short = 'o')]
    pub one_file: bool,

    /// TOML file overriding column names, cell labels and report layout
    #[arg(long, short = 'c', env = "SALAMI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the reports (default: next to FILE)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print a JSON summary on stdout instead of the human one
    #[arg(long)]
    pub json: bool,

    /// No progress bar and no human summary
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Log more on stderr (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

fn long_version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (", env!("SALAMI_COMMIT"), ")")
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match convert::run(&cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Prefix the message with the roster line it came from.
    pub fn at_line(mut self, line: usize) -> Self {
        self.message = format!("line {}: {}", line, self.message);
        self
    }
}

impl From<RosterError> for CliError {
    fn from(err: RosterError) -> Self {
        let hint = match &err {
            RosterError::MissingColumn { .. } => {
                Some("check the header row, or set [columns] in a --config file")
            }
            RosterError::MalformedLine { .. } => {
                Some("cell lines read 'Label: value'; set [parse] malformed_lines = \"skip\" to ignore others")
            }
            RosterError::UnparsableTerm { .. } => {
                Some("time range headers read like '12.05.25 09:00 - 12:00'")
            }
            RosterError::DuplicateAssignment { .. } => {
                Some("remove the repeated entry from the roster")
            }
            _ => None,
        };
        let cli_err = CliError::new(roster_exit_code(&err), err.to_string());
        match hint {
            Some(hint) => cli_err.with_hint(hint),
            None => cli_err,
        }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::Sheet { .. } => Some("pick a worksheet with --sheet NAME"),
            _ => None,
        };
        let cli_err = CliError::new(io_exit_code(&err), err.to_string());
        match hint {
            Some(hint) => cli_err.with_hint(hint),
            None => cli_err,
        }
    }
}
