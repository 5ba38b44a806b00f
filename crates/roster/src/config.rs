use serde::{Deserialize, Serialize};

use crate::error::RosterError;

/// Characters Excel refuses in worksheet names.
pub const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Excel's worksheet name limit, also used for institution short names.
pub const MAX_SHEET_NAME_LEN: usize = 31;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterConfig {
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub people: PeopleConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Identity columns
// ---------------------------------------------------------------------------

/// The two roster columns holding a person's name. Every other column is a duty slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    #[serde(default = "default_given_name")]
    pub given_name: String,
    #[serde(default = "default_family_name")]
    pub family_name: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            given_name: default_given_name(),
            family_name: default_family_name(),
        }
    }
}

fn default_given_name() -> String {
    "Imię".into()
}

fn default_family_name() -> String {
    "Nazwisko".into()
}

// ---------------------------------------------------------------------------
// Cell labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelConfig {
    #[serde(default = "default_institution_label")]
    pub institution: String,
    #[serde(default = "default_room_label")]
    pub room: String,
    #[serde(default = "default_subject_label")]
    pub subject: String,
    #[serde(default = "default_role_label")]
    pub role: String,
}

impl LabelConfig {
    /// Labels the engine consumes, in cell order.
    pub fn known(&self) -> [&str; 4] {
        [&self.institution, &self.room, &self.subject, &self.role]
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            institution: default_institution_label(),
            room: default_room_label(),
            subject: default_subject_label(),
            role: default_role_label(),
        }
    }
}

fn default_institution_label() -> String {
    "Placówka".into()
}

fn default_room_label() -> String {
    "Sala".into()
}

fn default_subject_label() -> String {
    "Egzamin".into()
}

fn default_role_label() -> String {
    "Rola".into()
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParseConfig {
    /// Cell text meaning "no assignment", compared case-insensitively.
    #[serde(default = "default_not_applicable")]
    pub not_applicable: String,
    #[serde(default)]
    pub malformed_lines: MalformedLinePolicy,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            not_applicable: default_not_applicable(),
            malformed_lines: MalformedLinePolicy::default(),
        }
    }
}

fn default_not_applicable() -> String {
    "nie dotyczy".into()
}

/// What to do with a cell line that has no `label: value` split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedLinePolicy {
    /// Drop the line, keep parsing the rest of the cell.
    #[default]
    Skip,
    /// Abort the run.
    Fail,
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PeopleConfig {
    /// Role that pins a person to the top of a slot's list.
    #[serde(default = "default_chair_role")]
    pub chair_role: String,
}

impl Default for PeopleConfig {
    fn default() -> Self {
        Self {
            chair_role: default_chair_role(),
        }
    }
}

fn default_chair_role() -> String {
    "Przewodniczący".into()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Appended to output file names.
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default)]
    pub undated: UndatedPolicy,
    #[serde(default = "default_undated_sheet")]
    pub undated_sheet: String,
    #[serde(default = "default_column_width")]
    pub column_width: f64,
    /// Zero-based worksheet row of the header in per-institution reports.
    #[serde(default = "default_start_row")]
    pub start_row: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            undated: UndatedPolicy::default(),
            undated_sheet: default_undated_sheet(),
            column_width: default_column_width(),
            start_row: default_start_row(),
        }
    }
}

fn default_suffix() -> String {
    "SALAMI".into()
}

fn default_undated_sheet() -> String {
    "Bez daty".into()
}

fn default_column_width() -> f64 {
    30.0
}

fn default_start_row() -> u32 {
    4
}

/// Whether slots without a date range get their own sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndatedPolicy {
    #[default]
    Include,
    Drop,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RosterConfig {
    /// Read and validate a TOML config file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, RosterError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| RosterError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn from_toml(input: &str) -> Result<Self, RosterError> {
        let config: RosterConfig =
            toml::from_str(input).map_err(|e| RosterError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        let cols = &self.columns;
        if cols.given_name.trim().is_empty() || cols.family_name.trim().is_empty() {
            return Err(RosterError::ConfigValidation(
                "identity column names must not be empty".into(),
            ));
        }
        if cols.given_name == cols.family_name {
            return Err(RosterError::ConfigValidation(format!(
                "given_name and family_name both name column '{}'",
                cols.given_name
            )));
        }

        let labels = self.labels.known();
        for (i, label) in labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(RosterError::ConfigValidation("labels must not be empty".into()));
            }
            if label.contains(':') {
                return Err(RosterError::ConfigValidation(format!(
                    "label '{label}' must not contain ':'"
                )));
            }
            if labels[..i].contains(label) {
                return Err(RosterError::ConfigValidation(format!(
                    "label '{label}' is used more than once"
                )));
            }
        }

        if self.parse.not_applicable.trim().is_empty() {
            return Err(RosterError::ConfigValidation(
                "parse.not_applicable must not be empty".into(),
            ));
        }

        let out = &self.output;
        if out.suffix.trim().is_empty() {
            return Err(RosterError::ConfigValidation("output.suffix must not be empty".into()));
        }
        let sheet = out.undated_sheet.trim();
        if sheet.is_empty()
            || sheet.chars().count() > MAX_SHEET_NAME_LEN
            || sheet.contains(INVALID_SHEET_CHARS)
        {
            return Err(RosterError::ConfigValidation(format!(
                "output.undated_sheet '{}' is not a valid sheet name",
                out.undated_sheet
            )));
        }
        if out.column_width.is_nan() || out.column_width <= 0.0 {
            return Err(RosterError::ConfigValidation(
                "output.column_width must be positive".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
