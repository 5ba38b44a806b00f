use std::fmt;
use std::path::PathBuf;

/// Failure while reading a roster or writing a report.
#[derive(Debug)]
pub enum IoError {
    /// The input could not be opened or decoded.
    Read { path: PathBuf, message: String },
    /// The requested sheet is missing or ambiguous.
    Sheet { requested: String, available: Vec<String> },
    /// The input holds no header row.
    Empty { path: PathBuf },
    /// Unknown input extension.
    UnsupportedFormat { path: PathBuf },
    /// The report could not be built or saved.
    Write { path: PathBuf, message: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Read { path, message } => {
                write!(f, "cannot read {}: {}", path.display(), message)
            }
            IoError::Sheet { requested, available } => write!(
                f,
                "sheet '{}' not found (available: {})",
                requested,
                available.join(", ")
            ),
            IoError::Empty { path } => write!(f, "{} has no header row", path.display()),
            IoError::UnsupportedFormat { path } => write!(
                f,
                "unsupported input format: {} (expected .xlsx, .xlsm, .xls, .xlsb, .ods or .csv)",
                path.display()
            ),
            IoError::Write { path, message } => {
                write!(f, "cannot write {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for IoError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_error_lists_available_sheets() {
        let err = IoError::Sheet {
            requested: "Sheet1".into(),
            available: vec!["Dyżury".into(), "Uwagi".into()],
        };
        assert_eq!(err.to_string(), "sheet 'Sheet1' not found (available: Dyżury, Uwagi)");
    }
}
