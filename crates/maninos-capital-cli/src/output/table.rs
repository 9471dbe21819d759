use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::split_rows;

/// Format output as tables using the tabled crate.
///
/// The result's scalar fields go in a `Field | Value` table; a row array
/// (schedule months, ledger entries, book lines) follows as its own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => println!("{}", field_table(map)),
        },
        Value::Array(arr) => println!("{}", rows_table(arr)),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let (fields, rows) = split_rows(result);
    println!("{}", field_table(&fields));
    if let Some(rows) = rows {
        println!("\n{}", rows_table(rows));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), format_value(val)]);
    }
    builder.build()
}

fn rows_table(rows: &[Value]) -> Table {
    let mut builder = Builder::default();
    match rows.first() {
        Some(Value::Object(first)) => {
            let headers: Vec<String> = first.keys().cloned().collect();
            builder.push_record(headers.clone());
            for item in rows.iter().filter_map(Value::as_object) {
                builder.push_record(
                    headers
                        .iter()
                        .map(|h| item.get(h).map(format_value).unwrap_or_default()),
                );
            }
        }
        Some(_) => {
            for item in rows {
                builder.push_record([format_value(item)]);
            }
        }
        None => {
            builder.push_record(["(empty)"]);
        }
    }
    builder.build()
}

/// Table cells flatten nested objects to `key=value` pairs.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}={}", format_value(v)))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_terms_flattened() {
        let cell = format_value(&json!({ "monthly_interest": "1000", "term_months": 12 }));
        assert_eq!(cell, "monthly_interest=1000 term_months=12");
    }

    #[test]
    fn test_rows_table_headers() {
        let rows = json!([{ "term": 1, "status": "paid" }, { "term": 2, "status": "pending" }]);
        let rendered = rows_table(rows.as_array().unwrap()).to_string();
        assert!(rendered.contains("status"));
        assert!(rendered.contains("pending"));
    }
}
