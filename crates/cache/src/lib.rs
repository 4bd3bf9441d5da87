//! Content-addressable cache of YouTube metadata.
//!
//! Every remote object (video, channel, image, stream, caption) is stored at
//! most once, keyed by the hash of its canonical URL. Provider records are
//! mapped to entities, reconciled against what is already stored, and
//! attached to a caller-owned [`UnitOfWork`]. The caller commits it through a
//! [`StorageGateway`] whenever it sees fit.
//!
//! # Architecture
//! - [`Synchronizer`] resolves batches of [`CommonRecord`]s to [`CacheResult`]s:
//!   one bulk lookup per kind, stale rows refreshed in place, missing rows
//!   created. Child media are synchronized and linked through
//!   [`Synchronizer::synchronize_children`].
//! - [`DuplicateGuard`] refuses to attach anything that would break the
//!   one-row-per-hash rule.
//! - [`Repository`] is the SQLite gateway; the schema lives in
//!   `migrations/` and is applied by [`Database`] on connect.

mod association;
mod common;
mod db;
mod entity;
pub mod error;
mod gateway;
mod guard;
mod mapper;
#[cfg(any(test, feature = "mock"))]
mod memory;
mod models;
mod repo;
mod result;
mod session;
mod staleness;
mod sync;

pub use crate::association::{AssociationKind, AssociationRow};
pub use crate::common::{CommonCaption, CommonChannel, CommonImage, CommonRecord, CommonStream, CommonVideo, Detail};
pub use crate::db::{DEFAULT_MAX_CONNECTIONS, Database};
pub use crate::entity::{
    CacheEntity, CaptionEntity, ChannelEntity, EntityKind, EntityMeta, ImageEntity, StreamEntity, VideoEntity,
};
pub use crate::gateway::{CommitReceipt, GatewayHandle, StorageGateway};
pub use crate::guard::{Collision, CollisionKey, CollisionMember, DuplicateGuard};
pub use crate::mapper::Mapper;
#[cfg(any(test, feature = "mock"))]
pub use crate::memory::MemoryGateway;
pub use crate::repo::Repository;
pub use crate::result::{CacheResult, CacheStatus};
pub use crate::session::UnitOfWork;
pub use crate::staleness::{Staleness, TtlPolicy};
pub use crate::sync::{Completion, Synchronizer};
