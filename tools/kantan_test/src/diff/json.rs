//! Diff of untyped JSON trees (AST dumps, raw IR, config values).
//!
//! Objects compare by key set and per-key value; their key order is ignored.
//! Arrays compare element by element, so order matters. Numbers compare by
//! value: `1` and `1.0` are equal, integers never go through a float.

use serde_json::{Number, Value};

use super::Mismatch;

/// Rendered values longer than this are cut short in messages.
const MAX_RENDERED_LEN: usize = 80;

/// Compare `actual` against `expected`, with `path` naming the root.
pub fn diff_json(path: &str, expected: &Value, actual: &Value) -> Result<(), Mismatch> {
    match (expected, actual) {
        (Value::Object(e), Value::Object(a)) => {
            for (key, e_value) in e {
                let child = format!("{path}.{key}");
                match a.get(key) {
                    Some(a_value) => diff_json(&child, e_value, a_value)?,
                    None => return Err(Mismatch::new(child, render(e_value), "nothing")),
                }
            }
            if let Some((key, a_value)) = a.iter().find(|(key, _)| !e.contains_key(*key)) {
                return Err(Mismatch::new(format!("{path}.{key}"), "nothing", render(a_value)));
            }
            Ok(())
        }
        (Value::Array(e), Value::Array(a)) => {
            for (i, (e_item, a_item)) in e.iter().zip(a).enumerate() {
                diff_json(&element_path(path, i, e_item), e_item, a_item)?;
            }
            if e.len() != a.len() {
                return Err(Mismatch::field(path, "length", e.len(), a.len()));
            }
            Ok(())
        }
        (Value::Number(e), Value::Number(a)) => {
            if numbers_equal(e, a) {
                Ok(())
            } else {
                Err(Mismatch::new(path, e, a))
            }
        }
        (e, a) if e == a => Ok(()),
        (e, a) if type_name(e) != type_name(a) => Err(Mismatch::new(
            path,
            format_args!("{} {}", type_name(e), render(e)),
            format_args!("{} {}", type_name(a), render(a)),
        )),
        (e, a) => Err(Mismatch::new(path, render(e), render(a))),
    }
}

/// `items[2]`, annotated with the node kind when the element has one:
/// `items[2]<func_def>`.
fn element_path(path: &str, index: usize, element: &Value) -> String {
    match kantan_mi::ast::kind_of(element) {
        Some(kind) => format!("{path}[{index}]<{kind}>"),
        None => format!("{path}[{index}]"),
    }
}

#[allow(clippy::float_cmp, reason = "Exact equality is the contract")]
pub fn numbers_equal(expected: &Number, actual: &Number) -> bool {
    if let (Some(e), Some(a)) = (expected.as_i64(), actual.as_i64()) {
        return e == a;
    }
    if let (Some(e), Some(a)) = (expected.as_u64(), actual.as_u64()) {
        return e == a;
    }
    match (expected.as_f64(), actual.as_f64()) {
        (Some(e), Some(a)) => e == a,
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact JSON for a message, shortened when long.
pub fn render(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= MAX_RENDERED_LEN {
        return text;
    }
    let cut: String = text.chars().take(MAX_RENDERED_LEN).collect();
    format!("{cut}...")
}
