//! Errors raised while resolving placeholders.

use thiserror::Error;

/// A placeholder could not be resolved against the recorded steps.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    /// The referenced step has not completed in this scenario pass.
    #[error("placeholder '{expression}' references step '{step}' which has not run yet")]
    UnknownStep {
        /// Step name taken from the placeholder.
        step: String,
        /// Full placeholder expression.
        expression: String,
    },
    /// The step exists but the path does not lead to a value.
    #[error("placeholder '{expression}' references missing field '{path}' of step '{step}'")]
    MissingField {
        /// Step name taken from the placeholder.
        step: String,
        /// Path below the step record.
        path: String,
        /// Full placeholder expression.
        expression: String,
    },
    /// The placeholder is syntactically unusable.
    #[error("invalid placeholder path '{0}'")]
    InvalidPath(String),
}
