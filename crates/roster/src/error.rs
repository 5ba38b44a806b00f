use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty label, clashing column names, etc.).
    ConfigValidation(String),
    /// An identity column is absent from the roster headers.
    MissingColumn { column: String },
    /// A parsed cell has no value for a required label.
    MissingField { person: String, column: String, label: String },
    /// A cell line without a `label: value` split, under the `fail` policy.
    MalformedLine { person: String, column: String, line: String },
    /// A slot label that contains a range separator but not the expected date format.
    UnparsableTerm { label: String },
    /// The same person listed twice for the same room and time range.
    DuplicateAssignment {
        person: String,
        institution: String,
        room: String,
        term: String,
    },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { column } => write!(f, "roster has no column '{column}'"),
            Self::MissingField { person, column, label } => {
                write!(f, "{person}, column '{column}': cell has no '{label}' field")
            }
            Self::MalformedLine { person, column, line } => {
                write!(f, "{person}, column '{column}': line without label: '{line}'")
            }
            Self::UnparsableTerm { label } => {
                write!(f, "cannot parse time range '{label}' (expected 'dd.mm.yy HH:MM - HH:MM')")
            }
            Self::DuplicateAssignment { person, institution, room, term } => {
                write!(
                    f,
                    "{person} is already assigned to room '{room}' at '{term}' in '{institution}'"
                )
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for RosterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_assignment_names_the_person() {
        let err = RosterError::DuplicateAssignment {
            person: "Anna Nowak".into(),
            institution: "Szkoła A".into(),
            room: "101".into(),
            term: "Mon1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Anna Nowak"));
        assert!(msg.contains("'101'"));
        assert!(msg.contains("'Mon1'"));
    }
}
