use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::config::{ColumnConfig, MAX_SHEET_NAME_LEN};
use crate::term::TermRange;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One roster row: column name → cell text.
#[derive(Debug, Clone, Default)]
pub struct RosterRow {
    /// 1-based row number in the source sheet, for messages.
    pub line: usize,
    pub cells: HashMap<String, String>,
}

impl RosterRow {
    /// Cell text, `""` for a missing cell.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

/// A wide roster: one row per person, one column per duty slot.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub headers: Vec<String>,
    pub rows: Vec<RosterRow>,
}

impl Roster {
    /// Every header except the two identity columns, in header order.
    pub fn duty_columns(&self, columns: &ColumnConfig) -> Vec<String> {
        duty_columns(&self.headers, columns)
    }
}

pub fn duty_columns(headers: &[String], columns: &ColumnConfig) -> Vec<String> {
    headers
        .iter()
        .filter(|h| **h != columns.given_name && **h != columns.family_name)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Identity keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonKey {
    pub given_name: String,
    pub family_name: String,
}

/// Slot identity = (room, raw time range label). Subject is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub room: String,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstitutionKey(pub String);

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// A person as a member of one slot. The role belongs to this membership, so the
/// same person can hold different roles in different slots.
#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub given_name: String,
    pub family_name: String,
    pub role: String,
}

impl Person {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            role: String::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn key(&self) -> PersonKey {
        PersonKey {
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
        }
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    /// `"given family (role)"`, or just the name when the role is empty.
    pub fn name_with_role(&self) -> String {
        if self.role.is_empty() {
            self.name()
        } else {
            format!("{} ({})", self.name(), self.role)
        }
    }

    pub fn is_chair(&self, chair_role: &str) -> bool {
        !self.role.is_empty() && self.role.to_lowercase() == chair_role.to_lowercase()
    }

    pub fn sort_key(&self, chair_role: &str) -> SortKey {
        if self.is_chair(chair_role) {
            SortKey::Chair
        } else {
            SortKey::Name(self.name())
        }
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.given_name == other.given_name && self.family_name == other.family_name
    }
}

impl Eq for Person {}

impl Hash for Person {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.given_name.hash(state);
        self.family_name.hash(state);
    }
}

/// Display order within a slot: chairs first, everyone else by full name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Chair,
    Name(String),
}

/// Sort people in place by [`SortKey`]; ties keep their insertion order.
pub fn sort_people(people: &mut [Person], chair_role: &str) {
    people.sort_by_cached_key(|p| p.sort_key(chair_role));
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// One room at one time range, with the people assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    pub room: String,
    /// Raw column label the slot came from.
    pub term: String,
    pub subject: String,
    pub range: Option<TermRange>,
    people: Vec<Person>,
    #[serde(skip)]
    index: HashMap<PersonKey, usize>,
}

impl Slot {
    pub fn new(
        room: impl Into<String>,
        term: impl Into<String>,
        subject: impl Into<String>,
        range: Option<TermRange>,
    ) -> Self {
        Self {
            room: room.into(),
            term: term.into(),
            subject: subject.into(),
            range,
            people: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey {
            room: self.room.clone(),
            term: self.term.clone(),
        }
    }

    /// Room name followed by the `"HH:MM"` start time, or by the raw column
    /// label when the slot is undated.
    pub fn row_title(&self) -> String {
        match &self.range {
            Some(range) => format!("{} {}", self.room, range.start_label()),
            None => format!("{} {}", self.room, self.term),
        }
    }

    /// People in insertion order.
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// People in display order.
    pub fn sorted_people(&self, chair_role: &str) -> Vec<Person> {
        let mut people = self.people.clone();
        sort_people(&mut people, chair_role);
        people
    }

    pub fn find_person(&self, key: &PersonKey) -> Option<&Person> {
        self.index.get(key).map(|&i| &self.people[i])
    }

    /// Add a member. Returns `false`, leaving the slot unchanged, when a person
    /// with the same identity is already present.
    pub fn add_person(&mut self, person: Person) -> bool {
        let key = person.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.people.len());
        self.people.push(person);
        true
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.room == other.room && self.term == other.term
    }
}

impl Eq for Slot {}

impl Hash for Slot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.room.hash(state);
        self.term.hash(state);
    }
}

// ---------------------------------------------------------------------------
// Institution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Institution {
    pub name: String,
    slots: Vec<Slot>,
    #[serde(skip)]
    index: HashMap<SlotKey, usize>,
}

impl Institution {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn key(&self) -> InstitutionKey {
        InstitutionKey(self.name.clone())
    }

    /// Slots in discovery order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn find_slot(&self, key: &SlotKey) -> Option<&Slot> {
        self.index.get(key).map(|&i| &self.slots[i])
    }

    /// The slot with `key`, created by `make` when absent. The flag is `true` when
    /// the slot was created.
    pub fn find_or_insert_slot_with<E>(
        &mut self,
        key: &SlotKey,
        make: impl FnOnce() -> Result<Slot, E>,
    ) -> Result<(&mut Slot, bool), E> {
        let (idx, created) = match self.index.get(key) {
            Some(&i) => (i, false),
            None => {
                let slot = make()?;
                debug_assert_eq!(&slot.key(), key);
                self.index.insert(key.clone(), self.slots.len());
                self.slots.push(slot);
                (self.slots.len() - 1, true)
            }
        };
        Ok((&mut self.slots[idx], created))
    }

    /// Attach a slot. A slot with the same identity is replaced in place.
    pub fn insert_slot(&mut self, slot: Slot) -> &mut Slot {
        let key = slot.key();
        let idx = match self.index.get(&key) {
            Some(&i) => {
                self.slots[i] = slot;
                i
            }
            None => {
                self.index.insert(key, self.slots.len());
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };
        &mut self.slots[idx]
    }

    /// Text before the first comma, cut back at word boundaries to fit a sheet name.
    pub fn short_name(&self) -> String {
        let prefix = match self.name.split_once(',') {
            Some((head, _)) if !head.trim().is_empty() => head.trim(),
            _ => self.name.trim(),
        };
        fit_at_word_boundary(prefix, MAX_SHEET_NAME_LEN)
    }

    /// Short name with characters unsafe in file names removed.
    pub fn file_name(&self) -> String {
        self.short_name()
            .chars()
            .filter(|c| !matches!(c, ':' | '/' | '\\' | '.' | ','))
            .collect()
    }
}

impl PartialEq for Institution {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Institution {}

impl Hash for Institution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

fn fit_at_word_boundary(text: &str, max_chars: usize) -> String {
    let mut fitted = text;
    while fitted.chars().count() > max_chars {
        match fitted.rsplit_once(' ') {
            Some((head, _)) if !head.trim().is_empty() => fitted = head.trim_end(),
            _ => return fitted.chars().take(max_chars).collect(),
        }
    }
    fitted.to_string()
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Institutions discovered during one aggregation pass, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registry {
    institutions: Vec<Institution>,
    #[serde(skip)]
    index: HashMap<InstitutionKey, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn institutions(&self) -> &[Institution] {
        &self.institutions
    }

    pub fn len(&self) -> usize {
        self.institutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }

    pub fn find_institution(&self, key: &InstitutionKey) -> Option<&Institution> {
        self.index.get(key).map(|&i| &self.institutions[i])
    }

    /// The institution named `name`, created when absent. The flag is `true` when
    /// it was created.
    pub fn find_or_insert_institution(&mut self, name: &str) -> (&mut Institution, bool) {
        let key = InstitutionKey(name.to_string());
        let (idx, created) = match self.index.get(&key) {
            Some(&i) => (i, false),
            None => {
                self.index.insert(key, self.institutions.len());
                self.institutions.push(Institution::new(name));
                (self.institutions.len() - 1, true)
            }
        };
        (&mut self.institutions[idx], created)
    }

    /// Attach an institution. One with the same identity is replaced in place.
    pub fn insert_institution(&mut self, institution: Institution) -> &mut Institution {
        let key = institution.key();
        let idx = match self.index.get(&key) {
            Some(&i) => {
                self.institutions[i] = institution;
                i
            }
            None => {
                self.index.insert(key, self.institutions.len());
                self.institutions.push(institution);
                self.institutions.len() - 1
            }
        };
        &mut self.institutions[idx]
    }

    pub fn slot_count(&self) -> usize {
        self.institutions.iter().map(|i| i.slots.len()).sum()
    }

    /// Every (institution, slot, person) membership, sorted. Order-free view of the
    /// graph for comparisons.
    pub fn assignments(&self) -> Vec<AssignmentRecord> {
        let mut out: Vec<AssignmentRecord> = self
            .institutions
            .iter()
            .flat_map(|inst| {
                inst.slots.iter().flat_map(move |slot| {
                    slot.people.iter().map(move |p| AssignmentRecord {
                        institution: inst.name.clone(),
                        room: slot.room.clone(),
                        term: slot.term.clone(),
                        subject: slot.subject.clone(),
                        given_name: p.given_name.clone(),
                        family_name: p.family_name.clone(),
                        role: p.role.clone(),
                    })
                })
            })
            .collect();
        out.sort();
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AssignmentRecord {
    pub institution: String,
    pub room: String,
    pub term: String,
    pub subject: String,
    pub given_name: String,
    pub family_name: String,
    pub role: String,
}
