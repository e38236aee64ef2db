//! # Tabular Encoder
//!
//! Serializes flat records into tab-separated text.
//!
//! ## Format
//!
//! - First line is the header (column names)
//! - One line per record, cells in header order
//! - Columns joined by `\t`, rows joined by `\n`, no trailing newline
//! - Null cells are empty
//! - Backslash, tab, newline and carriage return inside a cell are escaped as
//!   `\\`, `\t`, `\n` and `\r`, so a cell never breaks the grid
//!
//! Fixed-shape records (`TabularRecord`) take their header from the type.
//! Open-ended JSON records (`encode_maps`) take it from the first record and
//! reject any later record whose key set differs.

use crate::primitives::{COLUMN_DELIMITER, FLAT_RECORD_COLUMNS, ROW_DELIMITER};
use crate::{FlatRecord, ShapingError};
use serde_json::Value;
use std::borrow::Cow;

// =============================================================================
// TABULAR RECORD
// =============================================================================

/// A record type with a static column schema.
pub trait TabularRecord {
    /// Column names, in output order.
    const COLUMNS: &'static [&'static str];

    /// Cell values, one per column, in `COLUMNS` order.
    fn cells(&self) -> Vec<Option<&str>>;
}

impl TabularRecord for FlatRecord {
    const COLUMNS: &'static [&'static str] = &FLAT_RECORD_COLUMNS;

    fn cells(&self) -> Vec<Option<&str>> {
        self.values().to_vec()
    }
}

// =============================================================================
// ENCODERS
// =============================================================================

/// Encode fixed-shape records. The header comes from `T::COLUMNS`.
pub fn encode_records<T: TabularRecord>(records: &[T]) -> Result<String, ShapingError> {
    if records.is_empty() {
        return Err(ShapingError::MalformedInput(
            "cannot encode an empty record batch".to_string(),
        ));
    }

    let mut out = String::new();
    push_row(&mut out, T::COLUMNS.iter().map(|c| Some(Cow::Borrowed(*c))));

    for (row, record) in records.iter().enumerate() {
        let cells = record.cells();
        if cells.len() != T::COLUMNS.len() {
            return Err(ShapingError::InconsistentRecordShape {
                row,
                detail: format!(
                    "expected {} cells, found {}",
                    T::COLUMNS.len(),
                    cells.len()
                ),
            });
        }
        out.push(ROW_DELIMITER);
        push_row(&mut out, cells.into_iter().map(|c| c.map(Cow::Borrowed)));
    }

    Ok(out)
}

/// Encode open-ended JSON object records.
///
/// The header is the first record's keys in their stored order. Every later
/// record must carry exactly the same key set.
pub fn encode_maps(records: &[Value]) -> Result<String, ShapingError> {
    let Some(first) = records.first() else {
        return Err(ShapingError::MalformedInput(
            "cannot encode an empty record batch".to_string(),
        ));
    };
    let Some(first) = first.as_object() else {
        return Err(ShapingError::MalformedInput(
            "first record is not an object".to_string(),
        ));
    };
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut out = String::new();
    push_row(&mut out, columns.iter().map(|c| Some(Cow::Borrowed(*c))));

    for (row, record) in records.iter().enumerate() {
        let Some(record) = record.as_object() else {
            return Err(ShapingError::MalformedInput(format!(
                "record {row} is not an object"
            )));
        };
        if record.len() != columns.len() {
            return Err(ShapingError::InconsistentRecordShape {
                row,
                detail: format!("expected {} keys, found {}", columns.len(), record.len()),
            });
        }

        let mut cells = Vec::with_capacity(columns.len());
        for column in &columns {
            let Some(value) = record.get(*column) else {
                return Err(ShapingError::InconsistentRecordShape {
                    row,
                    detail: format!("missing key '{column}'"),
                });
            };
            cells.push(cell_text(value));
        }

        out.push(ROW_DELIMITER);
        push_row(&mut out, cells.into_iter());
    }

    Ok(out)
}

// =============================================================================
// HELPERS
// =============================================================================

fn cell_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        other => Some(Cow::Owned(other.to_string())),
    }
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = Option<Cow<'a, str>>>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(COLUMN_DELIMITER);
        }
        if let Some(cell) = cell {
            push_escaped(out, &cell);
        }
    }
}

fn push_escaped(out: &mut String, cell: &str) {
    for ch in cell.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
