//! Placeholder resolution against completed steps.
//!
//! Templates reference earlier steps with `${$.<step>.<path>}`, for example
//! `${$.create_user.response.id}` or `${$.search.request.query.terms[0]}`.
//! The first segment names a recorded step; the rest walks its
//! `{request, response}` record.
//!
//! [`resolve`] treats its template as JSON text. A placeholder that fills
//! a whole string literal is replaced by the raw JSON value, so
//! `{"id": "${$.create.response.id}"}` becomes `{"id": 42}`. A placeholder
//! embedded in a longer literal contributes the value's text, escaped as
//! string content. Outside string literals the value's JSON is inserted.
//!
//! [`resolve_text`] treats its template as plain text, such as a target URL:
//! strings are inserted verbatim and other values as their JSON text.

mod error;
mod path;

use std::sync::LazyLock;

pub use error::ResolutionError;
use regex::Regex;
use serde_json::Value;

use crate::state::ScenarioExecutionState;

#[expect(
    clippy::expect_used,
    reason = "the placeholder pattern is a constant known to compile"
)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{\$\.([^{}]*)\}").expect("placeholder pattern compiles"));

/// Resolve every step placeholder in the JSON text `template`.
///
/// Strings without step placeholders are returned unchanged, and `${...}`
/// tokens that do not start with `$.` are left alone.
///
/// # Errors
///
/// Returns [`ResolutionError`] when a placeholder names a step that has not
/// been recorded (including the current step and later ones) or a path that
/// does not exist in that step's record.
///
/// # Examples
///
/// ```
/// use stepwright::{
///     resolver::resolve,
///     state::{ScenarioExecutionState, StepExecutionState},
/// };
///
/// let mut state = ScenarioExecutionState::new();
/// let mut create = StepExecutionState::new("create");
/// create.set_response(r#"{"id": 42, "owner": {"name": "Ada"}}"#);
/// state.record(create).expect("first record");
///
/// let body = resolve(r#"{"owner": "${$.create.response.id}"}"#, &state).expect("resolves");
/// assert_eq!(body, r#"{"owner": 42}"#);
///
/// let note = resolve(r#"{"note": "by ${$.create.response.owner}"}"#, &state).expect("resolves");
/// assert_eq!(note, r#"{"note": "by {\"name\":\"Ada\"}"}"#);
/// ```
pub fn resolve(template: &str, state: &ScenarioExecutionState) -> Result<String, ResolutionError> {
    if !PLACEHOLDER.is_match(template) {
        return Ok(template.to_owned());
    }

    let mut out = String::with_capacity(template.len());
    let mut literal = Literal::default();
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(expr)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = lookup(expr.as_str(), state)?;
        let (start, end) = (whole.start(), whole.end());
        literal.scan(&template[last..start], last);
        match literal.opened_at {
            Some(open) if open + 1 == start && template[end..].starts_with('"') => {
                out.push_str(&template[last..open]);
                out.push_str(&value.to_string());
                literal.opened_at = None;
                last = end + 1;
            }
            Some(_) => {
                out.push_str(&template[last..start]);
                out.push_str(&escape(&plain_text(value)));
                last = end;
            }
            None => {
                out.push_str(&template[last..start]);
                out.push_str(&value.to_string());
                last = end;
            }
        }
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Resolve every step placeholder in the plain text `template`.
///
/// # Errors
///
/// See [`resolve`].
///
/// ```
/// use stepwright::{
///     resolver::resolve_text,
///     state::{ScenarioExecutionState, StepExecutionState},
/// };
///
/// let mut state = ScenarioExecutionState::new();
/// let mut create = StepExecutionState::new("create");
/// create.set_response(r#"{"id": 42, "slug": "a\"b"}"#);
/// state.record(create).expect("first record");
///
/// let url = resolve_text("/users/${$.create.response.id}/${$.create.response.slug}", &state)
///     .expect("resolves");
/// assert_eq!(url, r#"/users/42/a"b"#);
/// ```
pub fn resolve_text(template: &str, state: &ScenarioExecutionState) -> Result<String, ResolutionError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(expr)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = lookup(expr.as_str(), state)?;
        out.push_str(&template[last..whole.start()]);
        out.push_str(&plain_text(value));
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// Resolve a JSON template value, returning the resolved JSON text.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_value(
    template: &Value,
    state: &ScenarioExecutionState,
) -> Result<String, ResolutionError> {
    resolve(&template.to_string(), state)
}

/// Tracks whether scanned JSON text is inside a string literal.
#[derive(Default)]
struct Literal {
    opened_at: Option<usize>,
    escaped: bool,
}

impl Literal {
    fn scan(&mut self, text: &str, offset: usize) {
        for (i, c) in text.char_indices() {
            if self.escaped {
                self.escaped = false;
                continue;
            }
            match (c, self.opened_at) {
                ('\\', Some(_)) => self.escaped = true,
                ('"', Some(_)) => self.opened_at = None,
                ('"', None) => self.opened_at = Some(offset + i),
                _ => {}
            }
        }
    }
}

fn lookup<'a>(
    expression: &str,
    state: &'a ScenarioExecutionState,
) -> Result<&'a Value, ResolutionError> {
    let (step, rest) = match expression.split_once('.') {
        Some((step, rest)) => (step, Some(rest)),
        None => (expression, None),
    };
    if step.is_empty() {
        return Err(ResolutionError::InvalidPath(expression.to_owned()));
    }
    let record = state.step(step).ok_or_else(|| ResolutionError::UnknownStep {
        step: step.to_owned(),
        expression: expression.to_owned(),
    })?;
    let Some(rest) = rest else {
        return Ok(record);
    };
    let segments =
        path::parse(rest).ok_or_else(|| ResolutionError::InvalidPath(expression.to_owned()))?;
    path::lookup(record, &segments).ok_or_else(|| ResolutionError::MissingField {
        step: step.to_owned(),
        path: rest.to_owned(),
        expression: expression.to_owned(),
    })
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    let quoted = Value::String(text.to_owned()).to_string();
    quoted[1..quoted.len() - 1].to_owned()
}
