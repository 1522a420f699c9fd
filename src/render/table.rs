//! Fixed-width text tables for action results.
//!
//! Every cell is left-justified in a column of constant width; values wider
//! than the column are printed in full and push the rest of the row right.

use serde_json::Value;
use std::io::{self, Write};

/// Width of every table column, in characters.
pub const DEFAULT_COLUMN_WIDTH: usize = 25;

/// Notice printed when there is nothing to show.
pub const NO_DATA: &str = "No data to display.";

/// Returns `true` when a result is falsy and carries nothing worth rendering.
///
/// `Null`, `false`, numeric zero and empty strings, arrays and objects count as empty.
pub fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Textual form of a value: strings without quotes, `Null` as empty text,
/// everything else as JSON.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Turns a result into a sequence of records.
///
/// A mapping becomes its `[key, value]` pairs in insertion order; a lone
/// scalar becomes a single record.
pub fn table_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| Value::Array(vec![Value::String(key), value]))
            .collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    }
}

/// Number of fields a record contributes to a row.
pub fn field_count(record: &Value) -> usize {
    match record {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 1,
    }
}

/// Extracts the cells of one row.
///
/// Mappings are looked up by column label (a missing key gives an empty
/// cell), sequences are taken positionally, and anything else is a single cell.
pub fn record_cells(record: &Value, columns: &[String]) -> Vec<String> {
    match record {
        Value::Object(map) => columns
            .iter()
            .map(|label| map.get(label).map(display_text).unwrap_or_default())
            .collect(),
        Value::Array(items) => items.iter().map(display_text).collect(),
        scalar => vec![display_text(scalar)],
    }
}

fn write_row<S: AsRef<str>>(out: &mut dyn Write, cells: &[S], width: usize) -> io::Result<()> {
    for cell in cells {
        write!(out, "{:<width$}", cell.as_ref(), width = width)?;
    }
    writeln!(out)
}

/// Writes `records` as a table: rule, header, rule, then one line per record.
pub fn render_table(
    out: &mut dyn Write,
    records: &[Value],
    columns: &[String],
    width: usize,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(out, "{}", NO_DATA)?;
        return Ok(());
    }

    let rule = "-".repeat(width * columns.len());
    writeln!(out, "{}", rule)?;
    write_row(out, columns, width)?;
    writeln!(out, "{}", rule)?;
    for record in records {
        write_row(out, &record_cells(record, columns), width)?;
    }
    Ok(())
}
