//! `salami-roster`: duty roster entity resolution and regrouping.
//!
//! Pure engine crate: receives a pre-loaded roster, returns the institution →
//! slot → person graph and its per-institution projections.
//! No CLI or spreadsheet dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod model;
pub mod project;
pub mod term;

pub use config::RosterConfig;
pub use engine::{aggregate, Aggregation, Aggregator, AggregateStats};
pub use error::RosterError;
pub use model::{Institution, Person, Registry, Roster, RosterRow, Slot};
pub use project::{project_by_date, project_flat, to_roster, FlatSheet, InstitutionReport};
