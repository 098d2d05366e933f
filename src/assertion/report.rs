//! Field-level assertion mismatch reports.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One field of the expected fragment that the actual response did not satisfy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AssertionReport {
    /// Path of the field, e.g. `items[0].id`. Empty for the document root.
    pub path: String,
    /// Expected value or matcher directive, exactly as written.
    pub expected: Value,
    /// Actual value, or `None` when the field is absent.
    pub actual: Option<Value>,
}

impl AssertionReport {
    pub(crate) fn new(path: &str, expected: &Value, actual: Option<&Value>) -> Self {
        Self {
            path: path.to_owned(),
            expected: expected.clone(),
            actual: actual.cloned(),
        }
    }
}

impl fmt::Display for AssertionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "$" } else { &self.path };
        match &self.actual {
            Some(actual) => write!(f, "{path}: expected {}, actual {actual}", self.expected),
            None => write!(f, "{path}: expected {}, actual <missing>", self.expected),
        }
    }
}
