// Roster import (xlsx, xlsm, xlsb, xls, ods, csv)

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use salami_roster::{Roster, RosterRow};

use crate::error::IoError;

/// One raw input row and the source line it starts on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GridRow {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Sheet read when none is named and the workbook has more than one.
pub const DEFAULT_SHEET: &str = "Sheet1";

/// Load a wide roster from `path`.
///
/// The first non-empty row is the header row. Spreadsheets are read from
/// `sheet`, or [`DEFAULT_SHEET`], or their only sheet; `sheet` is ignored
/// for CSV input.
pub fn read_roster(path: &Path, sheet: Option<&str>) -> Result<Roster, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let grid = match ext.as_str() {
        "csv" | "tsv" | "txt" => {
            if let Some(name) = sheet {
                log::debug!("ignoring sheet '{}' for delimited input", name);
            }
            crate::csv::read_grid(path)?
        }
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook_grid(path, sheet)?,
        _ => {
            return Err(IoError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    let roster = grid_to_roster(grid).ok_or_else(|| IoError::Empty {
        path: path.to_path_buf(),
    })?;
    log::info!(
        "read {} rows, {} columns from {}",
        roster.rows.len(),
        roster.headers.len(),
        path.display()
    );
    Ok(roster)
}

fn read_workbook_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<GridRow>, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = choose_sheet(&sheet_names, sheet)?;
    log::debug!("reading sheet '{}' of {}", sheet_name, path.display());

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| IoError::Read {
        path: path.to_path_buf(),
        message: format!("sheet '{}': {}", sheet_name, e),
    })?;

    // Ranges start at the first used cell, not at A1
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let grid = range
        .rows()
        .enumerate()
        .map(|(idx, row)| GridRow {
            line: start_row as usize + idx + 1,
            cells: std::iter::repeat(String::new())
                .take(start_col as usize)
                .chain(row.iter().map(cell_text))
                .collect(),
        })
        .collect();

    Ok(grid)
}

fn choose_sheet(available: &[String], requested: Option<&str>) -> Result<String, IoError> {
    let wanted = requested.unwrap_or(DEFAULT_SHEET);
    if available.iter().any(|name| name == wanted) {
        return Ok(wanted.to_string());
    }
    match (requested, available) {
        (None, [only]) => Ok(only.clone()),
        _ => Err(IoError::Sheet {
            requested: wanted.to_string(),
            available: available.to_vec(),
        }),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        // Integers without decimals, so a room numbered 101 stays "101"
        Data::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        Data::Float(n) => format!("{}", n),
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(when) => when.format("%d.%m.%y %H:%M").to_string(),
            None => format!("{}", dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Turn raw rows into a roster keyed by header text.
///
/// Returns `None` when no row holds any text. Columns with a blank header are
/// dropped; a repeated header keeps its first column.
fn grid_to_roster(grid: Vec<GridRow>) -> Option<Roster> {
    let header_idx = grid
        .iter()
        .position(|row| row.cells.iter().any(|cell| !cell.trim().is_empty()))?;

    let mut headers = Vec::new();
    let mut columns: Vec<(usize, String)> = Vec::new();
    for (col, raw) in grid[header_idx].cells.iter().enumerate() {
        let header = raw.trim();
        if header.is_empty() {
            continue;
        }
        if headers.iter().any(|h| h == header) {
            log::warn!("duplicate column '{}' ignored", header);
            continue;
        }
        headers.push(header.to_string());
        columns.push((col, header.to_string()));
    }

    let rows = grid
        .into_iter()
        .skip(header_idx + 1)
        .map(|mut row| {
            let cells: HashMap<String, String> = columns
                .iter()
                .filter_map(|(col, header)| {
                    let value = std::mem::take(row.cells.get_mut(*col)?);
                    Some((header.clone(), value))
                })
                .collect();
            RosterRow {
                line: row.line,
                cells,
            }
        })
        .collect();

    Some(Roster { headers, rows })
}
