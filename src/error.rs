//! Canonical error and result types for step execution.
//!
//! Every failure raised while running a single step folds into
//! [`StepError`]. The runner turns it into an errored step report instead of
//! propagating it, so callers only see these values inside reports or when
//! driving steps by hand.

use thiserror::Error;

use crate::{backend::BackendError, resolver::ResolutionError, state::StateError};

/// Failure of one step, distinct from an assertion mismatch.
#[derive(Debug, Error)]
pub enum StepError {
    /// A placeholder could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The step could not be recorded in the scenario state.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Result alias used by step execution.
pub type Result<T> = std::result::Result<T, StepError>;
