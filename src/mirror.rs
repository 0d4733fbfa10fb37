//! Local CSV mirror of the task table.
//!
//! A flat comma-delimited file, header row first, rewritten wholesale on
//! every accepted save regardless of the remote outcome so a session
//! survives remote failures. Cells that would be interpreted as formulas
//! by a spreadsheet (leading `=`, `+`, `-`, `@`) are neutralized with a
//! leading apostrophe on write and restored on read.

use std::path::Path;

use crate::error::Result;
use crate::lock::{write_atomic_locked, DEFAULT_LOCK_TIMEOUT_MS};
use crate::record::{RawRow, COLUMNS};
use crate::table::TaskTable;

/// Read the task mirror. A missing file yields an empty table.
pub fn read_table(path: &Path) -> Result<TaskTable> {
    let rows = read_rows(path)?;
    Ok(TaskTable::from_raw_rows(&rows))
}

/// Rewrite the task mirror wholesale (atomic, locked).
pub fn write_table(path: &Path, table: &TaskTable) -> Result<()> {
    write_rows(path, &COLUMNS, &table.to_raw_rows())
}

/// Create a schema-only mirror if the file does not exist yet.
/// Returns true when the file was created.
pub fn ensure_table_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    write_table(path, &TaskTable::new())?;
    Ok(true)
}

/// Read a delimited file into loose rows keyed by its header.
/// Missing file yields no rows; short rows leave the tail columns blank.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)?;
    let mut records = parse_csv(&content).into_iter();

    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for record in records {
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let mut row = RawRow::new();
        for (column, cell) in header.iter().zip(record.iter()) {
            row.insert(column.clone(), restore_cell(cell));
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Write loose rows under a fixed column header (atomic, locked).
pub fn write_rows(path: &Path, columns: &[&str], rows: &[RawRow]) -> Result<()> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|column| csv_escape(column))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        let line = columns
            .iter()
            .map(|column| {
                let cell = row.get(*column).map(String::as_str).unwrap_or("");
                csv_escape(cell)
            })
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    let mut data = lines.join("\n");
    data.push('\n');

    write_atomic_locked(path, data.as_bytes(), DEFAULT_LOCK_TIMEOUT_MS)
}

fn should_neutralize(value: &str) -> bool {
    let trimmed = value.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('\'') {
        return false;
    }
    matches!(
        trimmed.chars().next(),
        Some('=') | Some('+') | Some('-') | Some('@')
    )
}

fn neutralize_formula(value: &str) -> String {
    if should_neutralize(value) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

/// Undo `neutralize_formula` when reading a cell back.
fn restore_cell(value: &str) -> String {
    if let Some(rest) = value.strip_prefix('\'') {
        if matches!(
            rest.chars().next(),
            Some('=') | Some('+') | Some('-') | Some('@')
        ) {
            return rest.to_string();
        }
    }
    value.to_string()
}

fn csv_escape(value: &str) -> String {
    let safe = neutralize_formula(value);
    if safe.contains(',') || safe.contains('"') || safe.contains('\n') || safe.contains('\r') {
        format!("\"{}\"", safe.replace('"', "\"\""))
    } else {
        safe
    }
}

/// Split CSV content into records. Quoted cells may contain commas,
/// doubled quotes, and newlines.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => cell.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut cell));
                records.push(std::mem::take(&mut record));
            }
            _ => cell.push(ch),
        }
    }

    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        records.push(record);
    }

    records
}
