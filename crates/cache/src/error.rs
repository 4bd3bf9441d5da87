//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

use tubesync_identity::RemoteKind;

use crate::guard::Collision;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A write would break a unique constraint of the store.
    #[display("constraint violation")]
    Constraint,
    /// A stored value could not be converted to or from its model.
    #[display("invalid cache data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// A record or identity of one kind was used where another was needed.
    #[display("expected a {expected} record, found a {found} record")]
    KindMismatch { expected: RemoteKind, found: RemoteKind },
    /// Two entities in one batch share a hash or id. The batch was not
    /// attached.
    #[display("duplicate entity: {_0}")]
    DuplicateEntity(#[error(not(source))] Collision),
    /// Two junction rows in one batch link the same owner and child.
    #[display("duplicate association: {_0}")]
    DuplicateAssociation(#[error(not(source))] Collision),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // SQLITE_BUSY and friends surface as `Database`. Everything else is
        // a bug in the input or in the store.
        matches!(self, Self::Database)
    }
}
