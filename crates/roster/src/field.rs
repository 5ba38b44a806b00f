//! Cell text → labeled fields.
//!
//! A roster cell holds one `label: value` pair per line:
//!
//! ```text
//! Placówka: Szkoła Podstawowa nr 1, ul. Długa 5
//! Sala: 101
//! Egzamin: Matematyka
//! Rola: Przewodniczący
//! ```
//!
//! A line may also pack several pairs as `Sala: 101, Egzamin: Matematyka`. The
//! comma only splits when a recognized label follows it, so commas inside values
//! (institution addresses) are kept.

use std::collections::HashMap;

/// Result of parsing one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCell {
    /// Sentinel text, an empty cell, or no labeled line at all.
    NotApplicable,
    Fields(CellFields),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellFields {
    pub values: HashMap<String, String>,
    /// Non-blank lines without a `:` split, in cell order.
    pub malformed: Vec<String>,
}

impl CellFields {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    /// False when every line was malformed; the cell then names no assignment.
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Value for `label`, or `""` when absent.
    pub fn get_or_empty(&self, label: &str) -> &str {
        self.get(label).unwrap_or("")
    }
}

/// Parse one cell. Pure: malformed lines are returned, not reported.
pub fn parse_cell(text: &str, not_applicable: &str, known_labels: &[&str]) -> ParsedCell {
    let text = text.trim();
    if text.is_empty() || text.to_lowercase() == not_applicable.trim().to_lowercase() {
        return ParsedCell::NotApplicable;
    }

    let mut fields = CellFields::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        for segment in split_segments(line, known_labels) {
            match segment.split_once(':') {
                Some((label, value)) => {
                    fields
                        .values
                        .insert(label.trim().to_string(), value.trim().to_string());
                }
                None => fields.malformed.push(segment.to_string()),
            }
        }
    }

    if fields.values.is_empty() && fields.malformed.is_empty() {
        return ParsedCell::NotApplicable;
    }
    ParsedCell::Fields(fields)
}

/// Split a line at every `", "` directly followed by `<known label>:`.
fn split_segments<'a>(line: &'a str, known_labels: &[&str]) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;

    for (idx, _) in line.match_indices(", ") {
        let rest = &line[idx + 2..];
        let starts_label = known_labels.iter().any(|label| {
            rest.strip_prefix(label)
                .is_some_and(|after| after.trim_start().starts_with(':'))
        });
        if starts_label && idx > start {
            segments.push(line[start..idx].trim());
            start = idx + 2;
        }
    }
    segments.push(line[start..].trim());
    segments
}
