//! Three-way result for pipeline stages.
//!
//! Stages that can either succeed, decline a single input, or abort the
//! whole build return an [`Outcome`]. Callers pattern-match rather than
//! inspect error values to tell an expected miss from a real failure.

use crate::error::BuilderError;

/// The outcome of one pipeline step.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The step produced a value.
    Success(T),
    /// The step declined this input; the build continues without it.
    SoftSkip {
        /// A human-readable explanation, logged by the caller.
        reason: String,
    },
    /// The step failed and the build must stop.
    Fatal(BuilderError),
}

impl<T> Outcome<T> {
    /// Build a [`Outcome::SoftSkip`] from any displayable reason.
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::SoftSkip {
            reason: reason.into(),
        }
    }
}
