//! Aggregated rule violations.
//!
//! Parsing and validation never stop at the first problem: every rule an
//! input breaks is collected into [`Violations`] so the caller can report
//! them all at once.

use derive_more::Display;
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use std::ops::Deref;

use crate::kind::{IdentityFamily, IdentityType};

/// The part of an identifier a [`Rule`] was checked against.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    #[display("video id")]
    VideoId,
    #[display("channel id")]
    ChannelId,
    #[display("channel handle")]
    ChannelHandle,
    #[display("playlist id")]
    PlaylistId,
    #[display("playlist index")]
    PlaylistIndex,
    #[display("start time")]
    StartTime,
    #[display("channel tab")]
    Tab,
    #[display("comment id")]
    CommentId,
    #[display("language code")]
    LanguageCode,
    #[display("url")]
    Url,
}

/// A single structural rule.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Rule {
    #[display("must not be empty")]
    Empty,
    #[display("must be {expected} characters long, found {actual}")]
    ExactLength { expected: usize, actual: usize },
    #[display("must be between {min} and {max} characters long, found {actual}")]
    LengthRange { min: usize, max: usize, actual: usize },
    #[display("must only contain A-Z, a-z, 0-9, '-' or '_'")]
    Alphabet,
    #[display("must only contain letters, digits, '.', '-' or '_'")]
    HandleAlphabet,
    #[display("must start with {_0:?}")]
    Prefix(&'static str),
    #[display("must be a positive integer, found {_0:?}")]
    PositiveInteger(String),
    #[display("not a recognized timestamp: {_0:?}")]
    Timestamp(String),
    #[display("unknown value {_0:?}")]
    Unknown(String),
    #[display("relative url without a base url")]
    Relative,
    #[display("unsupported scheme {_0:?}")]
    Scheme(String),
    #[display("missing host")]
    MissingHost,
}

/// One reason an input was rejected.
///
/// The three variants are the whole error taxonomy of this crate: either
/// nothing matched at all, something matched but is malformed, or it matched
/// a different family than the caller asked for.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Violation {
    #[display("unsupported identity: {_0:?}")]
    UnsupportedIdentity(String),
    #[display("invalid {field}: {rule}")]
    InvalidStructure { field: Field, rule: Rule },
    #[display("expected a {expected} identity, found a {found}")]
    AmbiguousKindMismatch {
        expected: IdentityFamily,
        found: IdentityType,
    },
}
impl Violation {
    pub(crate) fn structure(field: Field, rule: Rule) -> Self {
        Self::InvalidStructure { field, rule }
    }
}

/// Non-empty collection of [`Violation`]s, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);
impl Violations {
    /// Returns `Ok(())` when nothing was violated.
    pub(crate) fn check(violations: Vec<Violation>) -> Result<(), Self> {
        match violations.is_empty() {
            true => Ok(()),
            false => Err(Self(violations)),
        }
    }

    pub(crate) fn single(violation: Violation) -> Self {
        Self(vec![violation])
    }

    /// Whether any violation concerns `field`.
    pub fn concerns(&self, field: Field) -> bool {
        self.0
            .iter()
            .any(|v| matches!(v, Violation::InvalidStructure { field: f, .. } if *f == field))
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.0
    }
}
impl Deref for Violations {
    type Target = [Violation];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl FmtDisplay for Violations {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}
impl std::error::Error for Violations {}
