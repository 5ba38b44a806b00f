//! CLI Exit Code Registry
//!
//! Single source of truth for `salami` exit codes. Scripts branch on these,
//! so a code never changes meaning once released.
//!
//! | Code | Meaning                                                        |
//! |------|----------------------------------------------------------------|
//! | 0    | Success                                                        |
//! | 1    | General error (unspecified)                                    |
//! | 2    | Usage error (bad arguments; also clap's own parse failures)    |
//! | 3    | Input could not be read (file, sheet, encoding, empty roster)  |
//! | 4    | Invalid config file                                            |
//! | 5    | Duplicate assignment in the roster                             |
//! | 6    | Malformed roster data (missing column or field, bad line/term) |
//! | 7    | Report could not be written                                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it in `roster_exit_code` or `io_exit_code`

use salami_io::IoError;
use salami_roster::RosterError;

/// Success - every report was written.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// The roster file (or the requested sheet) could not be read.
pub const EXIT_INPUT: u8 = 3;

/// The `--config` file is missing, not TOML, or fails validation.
pub const EXIT_CONFIG: u8 = 4;

/// One person listed twice for the same room and term.
pub const EXIT_DUPLICATE: u8 = 5;

/// The roster parsed but its content is unusable.
pub const EXIT_MALFORMED: u8 = 6;

/// A report file could not be created.
pub const EXIT_WRITE: u8 = 7;

pub fn roster_exit_code(err: &RosterError) -> u8 {
    match err {
        RosterError::ConfigParse(_) | RosterError::ConfigValidation(_) | RosterError::Io(_) => {
            EXIT_CONFIG
        }
        RosterError::DuplicateAssignment { .. } => EXIT_DUPLICATE,
        RosterError::MissingColumn { .. }
        | RosterError::MissingField { .. }
        | RosterError::MalformedLine { .. }
        | RosterError::UnparsableTerm { .. } => EXIT_MALFORMED,
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. }
        | IoError::Sheet { .. }
        | IoError::Empty { .. }
        | IoError::UnsupportedFormat { .. } => EXIT_INPUT,
        IoError::Write { .. } => EXIT_WRITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_INPUT,
            EXIT_CONFIG,
            EXIT_DUPLICATE,
            EXIT_MALFORMED,
            EXIT_WRITE,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn roster_errors_map_to_codes() {
        let dup = RosterError::DuplicateAssignment {
            person: "Anna Nowak".into(),
            institution: "SP 1".into(),
            room: "101".into(),
            term: "t".into(),
        };
        assert_eq!(roster_exit_code(&dup), EXIT_DUPLICATE);
        let missing = RosterError::MissingColumn { column: "Imię".into() };
        assert_eq!(roster_exit_code(&missing), EXIT_MALFORMED);
        assert_eq!(roster_exit_code(&RosterError::ConfigParse("x".into())), EXIT_CONFIG);
    }
}
