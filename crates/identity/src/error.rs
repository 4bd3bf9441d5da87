//! Identity Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Rule violations found while parsing
//! are plain values ([`Violations`]); they only become an [`Error`] when an
//! identity actually has to be built from the input.

use crate::violation::Violations;
use derive_more::{Display, Error};

/// An identity error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be turned into a canonical identity. Every rule
    /// that was violated is listed.
    #[display("invalid identity: {_0}")]
    InvalidIdentity(#[error(not(source))] Violations),
}

impl ErrorKind {
    /// Wrap a set of violations into an error.
    #[track_caller]
    pub fn invalid(violations: Violations) -> Error {
        exn::Exn::new(Self::InvalidIdentity(violations))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // An identifier is either well-formed or it isn't.
        false
    }
}
