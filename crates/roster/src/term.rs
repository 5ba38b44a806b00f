use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::RosterError;

/// Separator between the start and end of a time range label.
pub const RANGE_SEPARATOR: &str = " - ";

const DATETIME_FORMAT: &str = "%d.%m.%y %H:%M";
const TIME_FORMAT: &str = "%H:%M";

/// A parsed slot label such as `"12.05.25 09:00 - 11:30"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TermRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TermRange {
    /// `Ok(None)` for a label with no range separator (an undated slot such as
    /// `"Mon1"`). A label with a separator must parse, or the run fails.
    pub fn parse(label: &str) -> Result<Option<Self>, RosterError> {
        let Some((start_str, end_str)) = label.trim().split_once(RANGE_SEPARATOR) else {
            return Ok(None);
        };
        let err = || RosterError::UnparsableTerm { label: label.to_string() };

        let start = NaiveDateTime::parse_from_str(start_str.trim(), DATETIME_FORMAT)
            .map_err(|_| err())?;

        let end_str = end_str.trim();
        let end = match NaiveTime::parse_from_str(end_str, TIME_FORMAT) {
            Ok(time) => start.date().and_time(time),
            Err(_) => NaiveDateTime::parse_from_str(end_str, DATETIME_FORMAT).map_err(|_| err())?,
        };

        Ok(Some(Self { start, end }))
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// `"HH:MM"` start time, as shown in row titles.
    pub fn start_label(&self) -> String {
        self.start.format(TIME_FORMAT).to_string()
    }
}
