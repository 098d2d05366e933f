//! Matcher directives recognised in expected string values.

use regex::Regex;
use serde_json::Value;

/// JSON type names accepted by `$TYPE.<name>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

impl JsonType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            "null" => Self::Null,
            _ => return None,
        })
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Null => value.is_null(),
        }
    }
}

/// A recognised directive.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Matcher {
    NotNull,
    IsNull,
    Type(JsonType),
    ContainsString(String),
    MatchesString(String),
    Gt(f64),
    Lt(f64),
    Eq(f64),
}

impl Matcher {
    /// Parse `text` as a directive; `None` means it is a plain literal.
    pub(crate) fn parse(text: &str) -> Option<Self> {
        if !text.starts_with('$') {
            return None;
        }
        match text {
            "$NOT.NULL" | "$IS.NOTNULL" => return Some(Self::NotNull),
            "$IS.NULL" => return Some(Self::IsNull),
            _ => {}
        }
        if let Some(name) = text.strip_prefix("$TYPE.") {
            return JsonType::parse(name).map(Self::Type);
        }
        if let Some(needle) = text.strip_prefix("$CONTAINS.STRING:") {
            return Some(Self::ContainsString(needle.to_owned()));
        }
        if let Some(pattern) = text.strip_prefix("$MATCHES.STRING:") {
            return Some(Self::MatchesString(pattern.to_owned()));
        }
        Self::parse_numeric(text)
    }

    /// Parse only the numeric comparisons, as used for `.SIZE` checks.
    pub(crate) fn parse_numeric(text: &str) -> Option<Self> {
        let (ctor, operand): (fn(f64) -> Self, &str) = if let Some(n) = text.strip_prefix("$GT.") {
            (Self::Gt, n)
        } else if let Some(n) = text.strip_prefix("$LT.") {
            (Self::Lt, n)
        } else if let Some(n) = text.strip_prefix("$EQ.") {
            (Self::Eq, n)
        } else {
            return None;
        };
        operand.parse().ok().map(ctor)
    }

    /// Whether `actual` satisfies this directive. `None` means absent.
    pub(crate) fn check(&self, actual: Option<&Value>) -> bool {
        match (self, actual) {
            (Self::IsNull, None | Some(Value::Null)) => true,
            (Self::IsNull, Some(_)) | (_, None) => false,
            (Self::NotNull, Some(value)) => !value.is_null(),
            (Self::Type(kind), Some(value)) => kind.matches(value),
            (Self::ContainsString(needle), Some(Value::String(s))) => s.contains(needle.as_str()),
            (Self::MatchesString(pattern), Some(Value::String(s))) => {
                Regex::new(pattern).is_ok_and(|re| re.is_match(s))
            }
            (Self::Gt(n), Some(value)) => value.as_f64().is_some_and(|v| v > *n),
            (Self::Lt(n), Some(value)) => value.as_f64().is_some_and(|v| v < *n),
            (Self::Eq(n), Some(value)) => value.as_f64().is_some_and(|v| (v - n).abs() < f64::EPSILON),
            (Self::ContainsString(_) | Self::MatchesString(_), Some(_)) => false,
        }
    }
}
