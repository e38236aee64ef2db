//! # Annotation Normalizer
//!
//! Flattens the values of a document's annotation map into single text values.
//!
//! - Absent, null, empty string, numeric zero and `false` normalize to `None`
//! - Lists are joined with `,` (elements are rendered as scalars, not flattened)
//! - Mappings become their JSON text
//! - Any other scalar is returned in its text form
//!
//! Every input shape has a defined output; normalization never fails.

use crate::primitives::LIST_SEPARATOR;
use serde_json::{Map, Number, Value};

/// Normalize the named attribute of an annotation map.
///
/// Returns `None` when the attribute is absent or falsy.
#[must_use]
pub fn normalize_annotation(annotations: &Map<String, Value>, property: &str) -> Option<String> {
    annotations.get(property).and_then(normalize_value)
}

/// Normalize a single annotation value.
#[must_use]
pub fn normalize_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) if is_zero(n) => None,
        Value::Number(n) => Some(number_text(n)),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(element_text)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Text form of one list element. Null renders empty; nested structures as JSON.
fn element_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Largest magnitude below which every integral `f64` is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Numbers in their shortest text form. Integral floats print without a
/// fractional part (`7.0` becomes `7`).
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

fn is_zero(n: &Number) -> bool {
    if let Some(i) = n.as_i64() {
        return i == 0;
    }
    if let Some(u) = n.as_u64() {
        return u == 0;
    }
    n.as_f64().is_some_and(|f| f == 0.0)
}

// =============================================================================
// TESTS
// =============================================================================
