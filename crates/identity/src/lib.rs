//! Canonical addressing for YouTube resources.
//!
//! The same video can reach the application as a bare ID, a watch URL, a
//! `youtu.be` link, an embed, a Shorts link or any of a dozen older forms.
//! This crate turns all of them into one canonical URL and a 64-bit hash of
//! that URL, which the cache uses as its lookup and de-duplication key.
//!
//! - [`classify`] recognizes the surface form without validating it.
//! - [`parse`] extracts every component and builds the canonical URL,
//!   reporting all [`Violations`] at once on failure.
//! - [`validate`] checks bare IDs structurally.
//! - [`RemoteIdentity`] is the immutable address handed to the cache, also
//!   for media (images, streams, captions) addressed by URL.

mod classify;
mod consts;
pub mod error;
mod identity;
mod kind;
mod parse;
mod timestamp;
mod url;
mod validate;
mod violation;

pub use crate::classify::classify;
pub use crate::identity::{RemoteIdentity, hash};
pub use crate::kind::{ChannelTab, IdentityFamily, IdentityType, RemoteKind};
pub use crate::parse::{IdentityParts, ParsedIdentity, parse};
pub use crate::timestamp::parse_timestamp;
pub use crate::validate::validate;
pub use crate::violation::{Field, Rule, Violation, Violations};
