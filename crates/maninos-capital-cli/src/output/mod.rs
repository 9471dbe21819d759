pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Result fields that hold one object per month, payment or note.
const ROW_KEYS: [&str; 5] = ["rows", "schedule", "months", "entries", "lines"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Split a result object into its scalar fields and its row array, if any.
pub(crate) fn split_rows(result: &Map<String, Value>) -> (Map<String, Value>, Option<&[Value]>) {
    let rows_key = ROW_KEYS
        .iter()
        .find(|k| matches!(result.get(**k), Some(Value::Array(_))));

    let rows = rows_key
        .and_then(|k| result.get(*k))
        .and_then(Value::as_array)
        .map(Vec::as_slice);

    let fields = result
        .iter()
        .filter(|(k, _)| Some(k.as_str()) != rows_key.copied())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    (fields, rows)
}

/// Render a scalar cell; nested values fall back to compact JSON.
pub(crate) fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
