//! Field-by-field comparison of a response against an expected fragment.
//!
//! The expected document is a partial JSON fragment: only the fields it
//! names are checked. Leaves are compared for equality unless they are
//! matcher directives such as `$NOT.NULL`, `$TYPE.string` or `$GT.3`. A key
//! ending in `.SIZE` checks the length of the array, object or string under
//! the key without the suffix.
//!
//! A missing actual field is reported as a mismatch with `actual: None`;
//! evaluation itself never fails.

mod matcher;
mod report;

use matcher::Matcher;
pub use report::AssertionReport;
use serde_json::Value;

use crate::state::parse_lenient;

/// Compare `actual` against the `expected` fragment.
///
/// Returns one [`AssertionReport`] per mismatching field; an empty vector
/// means every expected field matched.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stepwright::assertion::evaluate;
///
/// let reports = evaluate(
///     &json!({"id": 42, "name": "$NOT.NULL"}),
///     &json!({"id": 7, "name": "Ada", "extra": true}),
/// );
/// assert_eq!(reports.len(), 1);
/// assert_eq!(reports[0].path, "id");
/// assert_eq!(reports[0].expected, json!(42));
/// assert_eq!(reports[0].actual, Some(json!(7)));
/// ```
#[must_use]
pub fn evaluate(expected: &Value, actual: &Value) -> Vec<AssertionReport> {
    let mut reports = Vec::new();
    walk(expected, Some(actual), "", &mut reports);
    reports
}

/// Text form of [`evaluate`]; inputs that are not JSON are compared as strings.
#[must_use]
pub fn evaluate_text(expected: &str, actual: &str) -> Vec<AssertionReport> {
    evaluate(&parse_lenient(expected), &parse_lenient(actual))
}

fn walk(expected: &Value, actual: Option<&Value>, path: &str, reports: &mut Vec<AssertionReport>) {
    match expected {
        Value::Object(fields) => {
            let object = actual.and_then(Value::as_object);
            for (key, want) in fields {
                let field_path = join_key(path, key);
                if let Some(base) = key.strip_suffix(".SIZE") {
                    let target = object.and_then(|o| o.get(base));
                    check_size(want, target, &field_path, reports);
                } else {
                    walk(want, object.and_then(|o| o.get(key)), &field_path, reports);
                }
            }
        }
        Value::Array(items) if items.is_empty() => {
            if !actual.and_then(Value::as_array).is_some_and(Vec::is_empty) {
                reports.push(AssertionReport::new(path, expected, actual));
            }
        }
        Value::Array(items) => {
            let array = actual.and_then(Value::as_array);
            for (index, want) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                walk(want, array.and_then(|a| a.get(index)), &item_path, reports);
            }
        }
        Value::String(text) => {
            let ok = match Matcher::parse(text) {
                Some(matcher) => matcher.check(actual),
                None => actual.is_some_and(|a| a == expected),
            };
            if !ok {
                reports.push(AssertionReport::new(path, expected, actual));
            }
        }
        leaf => {
            if !actual.is_some_and(|a| leaf_eq(leaf, a)) {
                reports.push(AssertionReport::new(path, expected, actual));
            }
        }
    }
}

fn check_size(want: &Value, target: Option<&Value>, path: &str, reports: &mut Vec<AssertionReport>) {
    let size = target.and_then(|value| match value {
        Value::Array(items) => Some(items.len()),
        Value::Object(fields) => Some(fields.len()),
        Value::String(text) => Some(text.chars().count()),
        _ => None,
    });
    let Some(size) = size else {
        reports.push(AssertionReport::new(path, want, target));
        return;
    };
    let size = Value::from(size);
    let ok = match want {
        Value::String(text) => Matcher::parse_numeric(text).is_some_and(|m| m.check(Some(&size))),
        other => leaf_eq(other, &size),
    };
    if !ok {
        reports.push(AssertionReport::new(path, want, Some(&size)));
    }
}

fn leaf_eq(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => {
            a == b || matches!((a.as_f64(), b.as_f64()), (Some(x), Some(y)) if x.to_bits() == y.to_bits())
        }
        _ => expected == actual,
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}
