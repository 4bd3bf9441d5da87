//! The storage seam.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::{CacheEntity, EntityKind};
use crate::error::Result;
use crate::session::UnitOfWork;

pub type GatewayHandle = Arc<dyn StorageGateway>;

/// Persistent storage for entities and their associations.
///
/// The synchronization engine only ever reads through this trait. Writing
/// is the caller's job: sync into a [`UnitOfWork`], then [`commit`] it.
///
/// [`commit`]: StorageGateway::commit
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Every stored entity of `kind` whose hash is in `hashes`, in one query.
    async fn fetch_by_hashes(&self, kind: EntityKind, hashes: &[i64]) -> Result<Vec<CacheEntity>>;

    /// Write everything in `uow` atomically: new entities are inserted,
    /// updated entities are written back by id and junction rows are linked
    /// by hash. Duplicate junction rows are ignored.
    async fn commit(&self, uow: UnitOfWork) -> Result<CommitReceipt>;
}

/// What a commit wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub(crate) inserted: HashMap<(EntityKind, i64), i64>,
    pub(crate) updated: usize,
    pub(crate) associations: u64,
}
impl CommitReceipt {
    /// The id assigned to the new entity of `kind` with `hash`.
    pub fn id_of(&self, kind: EntityKind, hash: i64) -> Option<i64> {
        self.inserted.get(&(kind, hash)).copied()
    }

    pub fn inserted(&self) -> usize {
        self.inserted.len()
    }

    pub fn updated(&self) -> usize {
        self.updated
    }

    /// Junction rows actually created, excluding ones that already existed.
    pub fn associations(&self) -> u64 {
        self.associations
    }
}
