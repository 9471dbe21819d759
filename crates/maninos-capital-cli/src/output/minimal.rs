use serde_json::{Map, Value};

use super::format_cell;

/// Key answer fields, most specific first.
const PRIORITY_KEYS: [&str; 6] = [
    "months_to_payoff",
    "next_due_month",
    "total_outstanding",
    "remaining_total",
    "months_paid",
    "total_due",
];

/// Print just the key answer value from the output.
///
/// Each priority key is looked up in the result and then one level down
/// (e.g. `plan.months_to_payoff`, `terms.total_due`); otherwise the first
/// result field is printed.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result_obj else {
        println!("{}", format_cell(result_obj));
        return;
    };

    if let Some(answer) = PRIORITY_KEYS.iter().find_map(|key| lookup(map, key)) {
        println!("{}", format_cell(answer));
    } else if let Some((key, val)) = map.iter().next() {
        println!("{}: {}", key, format_cell(val));
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key)
        .filter(|v| !v.is_null())
        .or_else(|| {
            map.values()
                .filter_map(Value::as_object)
                .find_map(|nested| nested.get(key).filter(|v| !v.is_null()))
        })
}
