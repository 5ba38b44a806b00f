//! Roster import and report export.
//!
//! Reads a wide roster from a spreadsheet or CSV file into a
//! [`salami_roster::Roster`] and writes projected reports as `.xlsx`.

pub mod csv;
pub mod error;
pub mod paths;
pub mod roster;
pub mod xlsx;

pub use error::IoError;
pub use paths::{output_path_for_institution, output_path_single, write_new_file};
pub use roster::{read_roster, DEFAULT_SHEET};
pub use xlsx::{sheet_name, write_date_report, write_flat_report};
