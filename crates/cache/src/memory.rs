//! In-memory storage gateway for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::association::{AssociationKind, AssociationRow};
use crate::entity::{CacheEntity, EntityKind};
use crate::error::{ErrorKind, Result};
use crate::gateway::{CommitReceipt, StorageGateway};
use crate::result::CacheStatus;
use crate::session::UnitOfWork;

#[derive(Debug, Default)]
struct Tables {
    rows: BTreeMap<EntityKind, Vec<CacheEntity>>,
    associations: Vec<AssociationRow>,
    queries: HashMap<EntityKind, usize>,
    next_id: i64,
}
impl Tables {
    fn find(&self, kind: EntityKind, hash: i64) -> Option<&CacheEntity> {
        self.rows.get(&kind)?.iter().find(|row| row.hash() == hash)
    }

    fn assign_id(&mut self, entity: &mut CacheEntity) -> i64 {
        self.next_id += 1;
        entity.meta_mut().id = self.next_id;
        self.next_id
    }
}

/// Storage gateway backed by plain collections behind a [`RwLock`].
///
/// Enforces the same unique constraints as the SQLite schema (one row per
/// hash per kind, one junction row per owner and child) and counts the
/// lookup queries it receives per kind, so tests can assert on batching.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entity` directly, bypassing any unit of work. Returns it with
    /// its assigned id.
    ///
    /// Panics if a row with the same hash already exists: if test setup is
    /// wrong, then the test should not pass.
    pub async fn seed(&self, mut entity: CacheEntity) -> CacheEntity {
        let mut tables = self.tables.write().await;
        if tables.find(entity.kind(), entity.hash()).is_some() {
            panic!("MemoryGateway::seed: duplicate {} hash {}", entity.kind(), entity.hash());
        }
        tables.assign_id(&mut entity);
        tables.rows.entry(entity.kind()).or_default().push(entity.clone());
        entity
    }

    /// Number of `fetch_by_hashes` calls received for `kind`.
    pub async fn queries(&self, kind: EntityKind) -> usize {
        self.tables.read().await.queries.get(&kind).copied().unwrap_or_default()
    }

    pub async fn rows(&self, kind: EntityKind) -> Vec<CacheEntity> {
        self.tables.read().await.rows.get(&kind).cloned().unwrap_or_default()
    }

    pub async fn associations(&self, kind: AssociationKind) -> Vec<AssociationRow> {
        let tables = self.tables.read().await;
        tables.associations.iter().filter(|row| row.kind == kind).cloned().collect()
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn fetch_by_hashes(&self, kind: EntityKind, hashes: &[i64]) -> Result<Vec<CacheEntity>> {
        let mut tables = self.tables.write().await;
        *tables.queries.entry(kind).or_default() += 1;
        let rows = tables.rows.get(&kind).map(Vec::as_slice).unwrap_or_default();
        Ok(rows.iter().filter(|row| hashes.contains(&row.hash())).cloned().collect())
    }

    async fn commit(&self, uow: UnitOfWork) -> Result<CommitReceipt> {
        let mut tables = self.tables.write().await;
        let (entries, associations) = uow.into_parts();
        // Validate everything first: a failed commit leaves no trace.
        for (entity, status) in &entries {
            let stored = tables.find(entity.kind(), entity.hash());
            match status {
                CacheStatus::New if stored.is_some() => exn::bail!(ErrorKind::Constraint),
                CacheStatus::Updated if stored.map(CacheEntity::id) != Some(entity.id()) => {
                    exn::bail!(ErrorKind::InvalidData("updated entity is not stored"))
                },
                _ => {},
            }
        }
        let mut receipt = CommitReceipt::default();
        for (mut entity, status) in entries {
            match status {
                CacheStatus::New => {
                    let id = tables.assign_id(&mut entity);
                    receipt.inserted.insert(entity.key(), id);
                    tables.rows.entry(entity.kind()).or_default().push(entity);
                },
                CacheStatus::Updated => {
                    if let Some(row) = tables
                        .rows
                        .get_mut(&entity.kind())
                        .and_then(|rows| rows.iter_mut().find(|row| row.id() == entity.id()))
                    {
                        *row = entity;
                        receipt.updated += 1;
                    }
                },
                CacheStatus::Existed | CacheStatus::Error => {},
            }
        }
        for mut row in associations {
            let owner = tables.find(row.kind.owner(), row.owner_hash).map(CacheEntity::id);
            let child = tables.find(row.kind.child(), row.child_hash).map(CacheEntity::id);
            // Same as the SQL join: an unknown side links nothing.
            let (Some(owner_id), Some(child_id)) = (owner, child) else {
                continue;
            };
            if tables
                .associations
                .iter()
                .any(|existing| existing.kind == row.kind && existing.owner_id == owner_id && existing.child_id == child_id)
            {
                continue;
            }
            tables.next_id += 1;
            row.id = tables.next_id;
            row.owner_id = owner_id;
            row.child_id = child_id;
            tables.associations.push(row);
            receipt.associations += 1;
        }
        Ok(receipt)
    }
}
