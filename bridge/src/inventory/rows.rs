//! Bill query result rows.
//!
//! `ExecuteBillQuery` answers with a JSON array of rows, each row an array of
//! cells in `FieldKeys` order. Business errors come back as a single row
//! holding a `Result.ResponseStatus` object.

use k3_common::InventoryItem;
use serde_json::Value;

use crate::error::{BridgeError, BridgeResult};

/// Map an inventory query response into items.
///
/// Anything other than a top-level array yields no items.
pub fn parse_rows(value: &Value) -> BridgeResult<Vec<InventoryItem>> {
    let Some(rows) = value.as_array() else {
        return Ok(Vec::new());
    };

    if let Some(message) = rejection_message(rows) {
        return Err(BridgeError::Rejected(message));
    }

    Ok(rows.iter().map(parse_row).collect())
}

fn parse_row(row: &Value) -> InventoryItem {
    let cell = |i: usize| row.get(i).unwrap_or(&Value::Null);
    InventoryItem {
        material_code: cell_text(cell(0)),
        material_name: cell_text(cell(1)),
        warehouse_code: cell_text(cell(2)),
        warehouse_name: cell_text(cell(3)),
        quantity: cell_number(cell(4)),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_leading_float(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Parse the longest numeric prefix of `s`, e.g. `"12.5 kg"` -> 12.5.
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .map_or(s.len(), |(i, _)| i);
    let candidate = &s[..end];
    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f64>().ok())
}

/// Error text from the vendor's failure envelope, if the rows are one.
fn rejection_message(rows: &[Value]) -> Option<String> {
    let status = rows
        .first()?
        .get(0)?
        .get("Result")?
        .get("ResponseStatus")?;

    if status.get("IsSuccess").and_then(Value::as_bool) != Some(false) {
        return None;
    }

    let messages: Vec<&str> = status
        .get("Errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("Message").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        let code = status.get("ErrorCode").map_or_else(String::new, Value::to_string);
        Some(format!("request failed (error code {code})"))
    } else {
        Some(messages.join("; "))
    }
}
