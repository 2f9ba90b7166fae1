//! Literal shape classification.
//!
//! Expression text on the right-hand side of an assignment is never
//! evaluated; its *shape* decides the simulated value and type tag.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::value::Value;

const TYPE_STRING: &str = "System.String";
const TYPE_INT: &str = "System.Int32";
const TYPE_DOUBLE: &str = "System.Double";
const TYPE_BOOL: &str = "System.Boolean";
const TYPE_OBJECT: &str = "System.Object";
const TYPE_ARRAY: &str = "System.Array";
const TYPE_HASHTABLE: &str = "System.Collections.Hashtable";

/// Classify an expression by literal shape, first match wins.
///
/// Anything that matches no shape is kept verbatim as a string; that is
/// the simulator's fallback, not an error.
#[must_use]
pub fn classify_literal(raw: &str) -> (Value, SmolStr) {
    let raw = raw.trim();

    if let Some(text) = quoted_text(raw) {
        return (Value::Str(SmolStr::new(text)), SmolStr::new(TYPE_STRING));
    }
    if is_integer(raw) {
        if let Ok(value) = raw.parse::<i64>() {
            return (Value::Int(value), SmolStr::new(TYPE_INT));
        }
    }
    if is_float(raw) {
        if let Ok(value) = raw.parse::<f64>() {
            return (Value::Float(value), SmolStr::new(TYPE_DOUBLE));
        }
    }
    if raw == "$true" {
        return (Value::Bool(true), SmolStr::new(TYPE_BOOL));
    }
    if raw == "$false" {
        return (Value::Bool(false), SmolStr::new(TYPE_BOOL));
    }
    if raw == "$null" {
        return (Value::Null, SmolStr::new(TYPE_OBJECT));
    }
    if let Some(inner) = raw.strip_prefix("@(").and_then(|rest| rest.strip_suffix(')')) {
        let elements = inner
            .split(',')
            .map(|element| SmolStr::new(element.trim()))
            .collect();
        return (Value::Array(elements), SmolStr::new(TYPE_ARRAY));
    }
    if let Some(inner) = raw.strip_prefix("@{").and_then(|rest| rest.strip_suffix('}')) {
        return (
            Value::Table(parse_hashtable(inner)),
            SmolStr::new(TYPE_HASHTABLE),
        );
    }

    (Value::Str(SmolStr::new(raw)), SmolStr::new(TYPE_STRING))
}

/// Scalar-only subset used for property assignment: quoted string,
/// integer or float; anything else keeps the raw text.
#[must_use]
pub fn classify_scalar(raw: &str) -> Value {
    let raw = raw.trim();
    if let Some(text) = quoted_text(raw) {
        return Value::Str(SmolStr::new(text));
    }
    if is_integer(raw) {
        if let Ok(value) = raw.parse::<i64>() {
            return Value::Int(value);
        }
    }
    if is_float(raw) {
        if let Ok(value) = raw.parse::<f64>() {
            return Value::Float(value);
        }
    }
    Value::Str(SmolStr::new(raw))
}

fn quoted_text(raw: &str) -> Option<&str> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        Some(&raw[1..raw.len() - 1])
    } else {
        None
    }
}

fn is_integer(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|byte| byte.is_ascii_digit())
}

fn is_float(raw: &str) -> bool {
    match raw.split_once('.') {
        Some((whole, frac)) => is_integer(whole) && is_integer(frac),
        None => false,
    }
}

/// Hashtable bodies are `key = value` pairs split on `;`. Entries without
/// exactly one `=` are skipped; both sides are trimmed and kept as strings.
fn parse_hashtable(inner: &str) -> IndexMap<SmolStr, Value> {
    let mut fields = IndexMap::new();
    for entry in inner.split(';') {
        let parts: Vec<&str> = entry.split('=').collect();
        let [key, value] = parts.as_slice() else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        fields.insert(SmolStr::new(key), Value::Str(SmolStr::new(value.trim())));
    }
    fields
}
