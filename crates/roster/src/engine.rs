use serde::Serialize;

use crate::config::{MalformedLinePolicy, RosterConfig};
use crate::error::RosterError;
use crate::field::{parse_cell, ParsedCell};
use crate::model::{duty_columns, Person, Registry, Roster, RosterRow, Slot, SlotKey};
use crate::term::TermRange;

/// Counters for one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub rows_processed: usize,
    pub blank_rows_skipped: usize,
    pub assignments: usize,
    pub cells_not_applicable: usize,
    pub malformed_lines_skipped: usize,
    pub institutions: usize,
    pub slots: usize,
}

/// Finished entity graph plus counters.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub registry: Registry,
    pub stats: AggregateStats,
}

/// Builds the institution → slot → person graph one roster row at a time.
///
/// The registry is owned by the aggregator for the whole pass; a failed pass
/// drops it along with the aggregator.
pub struct Aggregator<'a> {
    config: &'a RosterConfig,
    duty_columns: Vec<String>,
    registry: Registry,
    stats: AggregateStats,
}

impl<'a> Aggregator<'a> {
    /// Checks that the identity columns are present and fixes the duty columns.
    pub fn new(config: &'a RosterConfig, headers: &[String]) -> Result<Self, RosterError> {
        for column in [&config.columns.given_name, &config.columns.family_name] {
            if !headers.contains(column) {
                return Err(RosterError::MissingColumn { column: column.clone() });
            }
        }
        Ok(Self {
            config,
            duty_columns: duty_columns(headers, &config.columns),
            registry: Registry::new(),
            stats: AggregateStats::default(),
        })
    }

    /// Process every duty column of one row.
    pub fn push_row(&mut self, row: &RosterRow) -> Result<(), RosterError> {
        let config = self.config;
        let given = row.get(&config.columns.given_name).trim().to_string();
        let family = row.get(&config.columns.family_name).trim().to_string();
        if given.is_empty() && family.is_empty() {
            log::debug!("row {}: no name, skipped", row.line);
            self.stats.blank_rows_skipped += 1;
            return Ok(());
        }
        self.stats.rows_processed += 1;

        let labels = &config.labels;
        let known = labels.known();

        for column in &self.duty_columns {
            let fields = match parse_cell(row.get(column), &config.parse.not_applicable, &known) {
                ParsedCell::NotApplicable => {
                    self.stats.cells_not_applicable += 1;
                    continue;
                }
                ParsedCell::Fields(fields) => fields,
            };

            let person = Person::new(given.as_str(), family.as_str())
                .with_role(fields.get_or_empty(&labels.role));

            for line in &fields.malformed {
                match config.parse.malformed_lines {
                    MalformedLinePolicy::Skip => {
                        log::warn!(
                            "row {} ({}), column '{}': skipping line without label: '{}'",
                            row.line,
                            person.name(),
                            column,
                            line
                        );
                        self.stats.malformed_lines_skipped += 1;
                    }
                    MalformedLinePolicy::Fail => {
                        return Err(RosterError::MalformedLine {
                            person: person.name(),
                            column: column.clone(),
                            line: line.clone(),
                        });
                    }
                }
            }
            if !fields.has_values() {
                self.stats.cells_not_applicable += 1;
                continue;
            }

            let required = |label: &str| -> Result<String, RosterError> {
                match fields.get(label) {
                    Some(value) if !value.is_empty() => Ok(value.to_string()),
                    _ => Err(RosterError::MissingField {
                        person: person.name(),
                        column: column.clone(),
                        label: label.to_string(),
                    }),
                }
            };
            let institution = required(&labels.institution)?;
            let room = required(&labels.room)?;
            let subject = fields.get_or_empty(&labels.subject).to_string();

            assign(&mut self.registry, &institution, &room, column, &subject, person)?;
            self.stats.assignments += 1;
        }

        Ok(())
    }

    pub fn finish(mut self) -> Aggregation {
        self.stats.institutions = self.registry.len();
        self.stats.slots = self.registry.slot_count();
        log::info!(
            "aggregated {} assignments into {} slots across {} institutions",
            self.stats.assignments,
            self.stats.slots,
            self.stats.institutions
        );
        Aggregation {
            registry: self.registry,
            stats: self.stats,
        }
    }
}

/// Aggregate a whole roster in one call.
pub fn aggregate(config: &RosterConfig, roster: &Roster) -> Result<Aggregation, RosterError> {
    let mut aggregator = Aggregator::new(config, &roster.headers)?;
    for row in &roster.rows {
        aggregator.push_row(row)?;
    }
    Ok(aggregator.finish())
}

/// Resolve institution → slot → person by identity, creating what is missing.
/// Adding a person already present in the slot is the one hard failure.
fn assign(
    registry: &mut Registry,
    institution: &str,
    room: &str,
    term: &str,
    subject: &str,
    person: Person,
) -> Result<(), RosterError> {
    let (inst, created) = registry.find_or_insert_institution(institution);
    if created {
        log::debug!("new institution '{institution}'");
    }

    let slot_key = SlotKey {
        room: room.to_string(),
        term: term.to_string(),
    };
    let (slot, created) = inst.find_or_insert_slot_with(&slot_key, || {
        TermRange::parse(term).map(|range| Slot::new(room, term, subject, range))
    })?;
    if created {
        log::debug!("'{institution}': new slot room '{room}' at '{term}'");
    } else if slot.subject.is_empty() {
        slot.subject = subject.to_string();
    } else if !subject.is_empty() && slot.subject != subject {
        log::debug!(
            "'{institution}', room '{room}' at '{term}': keeping subject '{}', ignoring '{subject}'",
            slot.subject
        );
    }

    if slot.find_person(&person.key()).is_some() {
        return Err(RosterError::DuplicateAssignment {
            person: person.name(),
            institution: institution.to_string(),
            room: room.to_string(),
            term: term.to_string(),
        });
    }
    slot.add_person(person);
    Ok(())
}
