//! Last line of defence before anything is attached.
//!
//! The store enforces unique hashes and unique junction pairs too, but only
//! at commit time and without saying which records collided.

use derive_more::Display;
use std::collections::HashMap;
use std::fmt::{Display as FmtDisplay, Formatter, Result as FmtResult};
use tracing::error;

use crate::association::AssociationRow;
use crate::entity::{CacheEntity, EntityKind};
use crate::error::{ErrorKind, Result};
use crate::result::CacheStatus;

/// The value two or more rows share.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKey {
    #[display("hash {_0}")]
    Hash(i64),
    #[display("id {_0}")]
    Id(i64),
    #[display("owner {owner} / child {child}")]
    Pair { owner: i64, child: i64 },
}

/// One of the rows involved in an entity collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionMember {
    pub absolute_url: String,
    pub status: CacheStatus,
}

/// Everything known about a collision, for the log and the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub table: &'static str,
    pub key: CollisionKey,
    /// The colliding entities, in batch order. Empty for association
    /// collisions.
    pub members: Vec<CollisionMember>,
    /// Junction rows involved: the duplicates themselves for association
    /// collisions, or the rows that reference a colliding image.
    pub references: Vec<AssociationRow>,
}
impl FmtDisplay for Collision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {} is shared by", self.table, self.key)?;
        match self.members.is_empty() {
            true => write!(f, " {} rows", self.references.len())?,
            false => {
                for (i, member) in self.members.iter().enumerate() {
                    let separator = if i == 0 { " " } else { ", " };
                    write!(f, "{separator}{} ({:?})", member.absolute_url, member.status)?;
                }
                if !self.references.is_empty() {
                    write!(f, "; referenced by {} association rows", self.references.len())?;
                }
            },
        }
        Ok(())
    }
}

pub struct DuplicateGuard;

impl DuplicateGuard {
    /// Per entity kind, no two entities may share a hash or a non-zero id.
    /// Per association kind, no two rows may link the same owner and child.
    ///
    /// The first collision found is logged and returned; it is always fatal
    /// for the batch.
    pub fn check(entities: &[(&CacheEntity, CacheStatus)], associations: &[AssociationRow]) -> Result<()> {
        if let Some(collision) = Self::entity_collision(entities, associations) {
            error!(%collision, "refusing to attach duplicate entities");
            exn::bail!(ErrorKind::DuplicateEntity(collision));
        }
        if let Some(collision) = Self::association_collision(associations) {
            error!(%collision, "refusing to attach duplicate associations");
            exn::bail!(ErrorKind::DuplicateAssociation(collision));
        }
        Ok(())
    }

    fn entity_collision(
        entities: &[(&CacheEntity, CacheStatus)],
        associations: &[AssociationRow],
    ) -> Option<Collision> {
        let mut by_hash: HashMap<(EntityKind, i64), Vec<usize>> = HashMap::new();
        let mut by_id: HashMap<(EntityKind, i64), Vec<usize>> = HashMap::new();
        for (i, (entity, _)) in entities.iter().enumerate() {
            by_hash.entry(entity.key()).or_default().push(i);
            if entity.id() != 0 {
                by_id.entry((entity.kind(), entity.id())).or_default().push(i);
            }
        }
        // Report in batch order so the same input always names the same collision.
        for (entity, _) in entities {
            let (kind, key, indices) = match by_hash.get(&entity.key()) {
                Some(indices) if indices.len() > 1 => (entity.kind(), CollisionKey::Hash(entity.hash()), indices),
                _ => match by_id.get(&(entity.kind(), entity.id())) {
                    Some(indices) if indices.len() > 1 => (entity.kind(), CollisionKey::Id(entity.id()), indices),
                    _ => continue,
                },
            };
            let members = indices
                .iter()
                .map(|&i| CollisionMember {
                    absolute_url: entities[i].0.absolute_url().to_string(),
                    status: entities[i].1,
                })
                .collect();
            let references = match kind {
                EntityKind::Image => {
                    let hashes: Vec<i64> = indices.iter().map(|&i| entities[i].0.hash()).collect();
                    associations
                        .iter()
                        .filter(|row| row.kind.child() == EntityKind::Image && hashes.contains(&row.child_hash))
                        .cloned()
                        .collect()
                },
                _ => Vec::new(),
            };
            return Some(Collision {
                table: kind.table(),
                key,
                members,
                references,
            });
        }
        None
    }

    fn association_collision(associations: &[AssociationRow]) -> Option<Collision> {
        let mut seen = HashMap::new();
        for row in associations {
            if let Some(first) = seen.insert(row.pair(), row) {
                return Some(Collision {
                    table: row.kind.table(),
                    key: CollisionKey::Pair {
                        owner: row.owner_hash,
                        child: row.child_hash,
                    },
                    members: Vec::new(),
                    references: associations.iter().filter(|other| other.pair() == first.pair()).cloned().collect(),
                });
            }
        }
        None
    }
}
