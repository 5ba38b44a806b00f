//! Regroup the aggregated graph for output.
//!
//! Two shapes are produced: per-institution reports with one sheet per date, and a
//! flat table with one row per (slot, person) pair. [`to_roster`] goes the other
//! way and renders the graph back into a wide roster.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{RosterConfig, UndatedPolicy};
use crate::model::{sort_people, Person, PersonKey, Registry, Roster, RosterRow, Slot};

const SHEET_DATE_FORMAT: &str = "%m.%d";

/// Header of the flat table.
pub const FLAT_HEADERS: [&str; 5] = ["Sala", "Termin", "Przedmiot", "Nauczyciel", "Rola"];

// ---------------------------------------------------------------------------
// Per-institution, per-date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct InstitutionReport {
    pub institution: String,
    pub short_name: String,
    pub file_name: String,
    pub sheets: Vec<DateSheet>,
}

/// All slots of one institution falling on one date (or the undated bucket).
#[derive(Debug, Clone, Serialize)]
pub struct DateSheet {
    pub date: Option<NaiveDate>,
    pub name: String,
    /// Sorted by title.
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub title: String,
    pub subject: String,
    /// Display order: chair first, then by name.
    pub people: Vec<Person>,
}

/// One writer column: the row title as header, subject and people below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportColumn {
    pub title: String,
    pub cells: Vec<String>,
}

impl ReportRow {
    fn from_slot(slot: &Slot, chair_role: &str) -> Self {
        Self {
            title: slot.row_title(),
            subject: slot.subject.clone(),
            people: slot.sorted_people(chair_role),
        }
    }

    /// Fold another slot sharing this row title into the row.
    fn merge(&mut self, slot: &Slot, chair_role: &str) {
        if self.subject.is_empty() {
            self.subject = slot.subject.clone();
        }
        for person in slot.people() {
            if !self.people.contains(person) {
                self.people.push(person.clone());
            }
        }
        sort_people(&mut self.people, chair_role);
    }

    /// Subject followed by each person's display string.
    pub fn cells(&self) -> Vec<String> {
        std::iter::once(self.subject.clone())
            .chain(self.people.iter().map(Person::name_with_role))
            .collect()
    }
}

impl DateSheet {
    /// Rows turned into equal-length columns, padded with empty strings.
    pub fn columns(&self) -> Vec<ReportColumn> {
        let mut columns: Vec<ReportColumn> = self
            .rows
            .iter()
            .map(|row| ReportColumn {
                title: row.title.clone(),
                cells: row.cells(),
            })
            .collect();
        let height = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);
        for column in &mut columns {
            column.cells.resize(height, String::new());
        }
        columns
    }
}

type Bucket = BTreeMap<String, ReportRow>;

/// Per institution, slots bucketed by date and keyed by row title.
pub fn project_by_date(registry: &Registry, config: &RosterConfig) -> Vec<InstitutionReport> {
    let chair_role = config.people.chair_role.as_str();
    let output = &config.output;

    registry
        .institutions()
        .iter()
        .map(|inst| {
            let mut dated: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
            let mut undated: Bucket = BTreeMap::new();
            let mut dropped = 0usize;

            for slot in inst.slots() {
                let bucket = match (&slot.range, output.undated) {
                    (Some(range), _) => dated.entry(range.date()).or_default(),
                    (None, UndatedPolicy::Include) => &mut undated,
                    (None, UndatedPolicy::Drop) => {
                        dropped += 1;
                        continue;
                    }
                };
                let title = slot.row_title();
                match bucket.get_mut(&title) {
                    Some(row) => {
                        log::warn!(
                            "'{}': slots '{}' share row title '{}', merging",
                            inst.name,
                            slot.term,
                            title
                        );
                        row.merge(slot, chair_role);
                    }
                    None => {
                        bucket.insert(title, ReportRow::from_slot(slot, chair_role));
                    }
                }
            }

            if dropped > 0 {
                log::info!("'{}': {dropped} undated slot(s) left out", inst.name);
            }

            let mut sheets: Vec<DateSheet> = dated
                .into_iter()
                .map(|(date, rows)| DateSheet {
                    date: Some(date),
                    name: date.format(SHEET_DATE_FORMAT).to_string(),
                    rows: rows.into_values().collect(),
                })
                .collect();
            if !undated.is_empty() {
                sheets.push(DateSheet {
                    date: None,
                    name: output.undated_sheet.clone(),
                    rows: undated.into_values().collect(),
                });
            }

            InstitutionReport {
                institution: inst.name.clone(),
                short_name: inst.short_name(),
                file_name: inst.file_name(),
                sheets,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Flat table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FlatSheet {
    pub institution: String,
    pub name: String,
    pub rows: Vec<FlatRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRow {
    pub room: String,
    pub term: String,
    pub subject: String,
    pub person: String,
    pub role: String,
}

impl FlatRow {
    pub fn cells(&self) -> [&str; 5] {
        [&self.room, &self.term, &self.subject, &self.person, &self.role]
    }
}

/// One sheet per institution, one row per (slot, person) pair.
pub fn project_flat(registry: &Registry, config: &RosterConfig) -> Vec<FlatSheet> {
    let chair_role = config.people.chair_role.as_str();
    registry
        .institutions()
        .iter()
        .map(|inst| FlatSheet {
            institution: inst.name.clone(),
            name: inst.short_name(),
            rows: inst
                .slots()
                .iter()
                .flat_map(|slot| {
                    slot.sorted_people(chair_role)
                        .into_iter()
                        .map(move |person| FlatRow {
                            room: slot.room.clone(),
                            term: slot.term.clone(),
                            subject: slot.subject.clone(),
                            person: person.name(),
                            role: person.role,
                        })
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Back to a roster
// ---------------------------------------------------------------------------

/// Render the graph as a wide roster that aggregates back to the same graph.
///
/// Each person gets one row; a further row is opened only when two of their
/// assignments fall in the same column.
pub fn to_roster(registry: &Registry, config: &RosterConfig) -> Roster {
    let cols = &config.columns;
    let labels = &config.labels;

    let mut terms: Vec<String> = Vec::new();
    let mut seen_terms: HashSet<&str> = HashSet::new();
    for slot in registry.institutions().iter().flat_map(|i| i.slots()) {
        if seen_terms.insert(slot.term.as_str()) {
            terms.push(slot.term.clone());
        }
    }

    let mut rows: Vec<RosterRow> = Vec::new();
    let mut rows_by_person: HashMap<PersonKey, Vec<usize>> = HashMap::new();

    for inst in registry.institutions() {
        for slot in inst.slots() {
            for person in slot.people() {
                let mut cell = format!(
                    "{}: {}\n{}: {}",
                    labels.institution, inst.name, labels.room, slot.room
                );
                if !slot.subject.is_empty() {
                    cell.push_str(&format!("\n{}: {}", labels.subject, slot.subject));
                }
                if !person.role.is_empty() {
                    cell.push_str(&format!("\n{}: {}", labels.role, person.role));
                }

                let owned = rows_by_person.entry(person.key()).or_default();
                let free = owned
                    .iter()
                    .copied()
                    .find(|&i| !rows[i].cells.contains_key(&slot.term));
                let idx = match free {
                    Some(i) => i,
                    None => {
                        let mut cells = HashMap::new();
                        cells.insert(cols.given_name.clone(), person.given_name.clone());
                        cells.insert(cols.family_name.clone(), person.family_name.clone());
                        rows.push(RosterRow {
                            line: rows.len() + 2,
                            cells,
                        });
                        owned.push(rows.len() - 1);
                        rows.len() - 1
                    }
                };
                rows[idx].cells.insert(slot.term.clone(), cell);
            }
        }
    }

    let mut headers = vec![cols.given_name.clone(), cols.family_name.clone()];
    headers.extend(terms);
    Roster { headers, rows }
}
