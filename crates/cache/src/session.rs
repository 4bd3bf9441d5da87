//! The caller-owned set of pending writes.

use std::collections::HashMap;
use tracing::trace;

use crate::association::AssociationRow;
use crate::entity::{CacheEntity, EntityKind};
use crate::result::CacheStatus;

/// Entities and junction rows attached for the next commit.
///
/// Nothing here touches storage. The engine only ever attaches; the caller
/// decides when (and whether) to hand the unit of work to
/// [`StorageGateway::commit`](crate::StorageGateway::commit).
#[derive(Debug, Default, Clone)]
pub struct UnitOfWork {
    entries: Vec<(CacheEntity, CacheStatus)>,
    index: HashMap<(EntityKind, i64), usize>,
    associations: Vec<AssociationRow>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `entity` for writing.
    ///
    /// Only [`New`](CacheStatus::New) and [`Updated`](CacheStatus::Updated)
    /// entities are written; anything else is ignored. Attaching an entity
    /// that is already tracked replaces it, and a `New` entity stays `New`.
    pub fn attach(&mut self, entity: CacheEntity, status: CacheStatus) {
        if !status.is_pending() {
            trace!(kind = %entity.kind(), hash = entity.hash(), ?status, "not attaching entity");
            return;
        }
        match self.index.get(&entity.key()).copied() {
            Some(position) => {
                let (tracked, tracked_status) = &mut self.entries[position];
                if *tracked_status != CacheStatus::New {
                    *tracked_status = status;
                }
                *tracked = entity;
            },
            None => {
                self.index.insert(entity.key(), self.entries.len());
                self.entries.push((entity, status));
            },
        }
    }

    pub fn attach_association(&mut self, row: AssociationRow) {
        self.associations.push(row);
    }

    /// The tracked entity of `kind` with `hash`, if any.
    pub fn tracked(&self, kind: EntityKind, hash: i64) -> Option<(&CacheEntity, CacheStatus)> {
        self.index.get(&(kind, hash)).map(|&i| {
            let (entity, status) = &self.entries[i];
            (entity, *status)
        })
    }

    /// Tracked entities in attach order.
    pub fn entries(&self) -> impl Iterator<Item = (&CacheEntity, CacheStatus)> {
        self.entries.iter().map(|(entity, status)| (entity, *status))
    }

    pub fn associations(&self) -> &[AssociationRow] {
        &self.associations
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.associations.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<(CacheEntity, CacheStatus)>, Vec<AssociationRow>) {
        (self.entries, self.associations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CommonImage, CommonRecord};
    use crate::mapper::Mapper;
    use time::UtcDateTime;
    use tubesync_identity::RemoteIdentity;

    fn image(quality: &str) -> CacheEntity {
        let mut common = CommonImage::new(RemoteIdentity::image("https://yt3.ggpht.com/a=s88", None).unwrap());
        common.quality = Some(quality.to_string());
        Mapper::create(&CommonRecord::Image(common), UtcDateTime::now())
    }

    #[test]
    fn test_reattach_replaces_and_stays_new() {
        let mut uow = UnitOfWork::new();
        assert!(uow.is_empty());
        uow.attach(image("low"), CacheStatus::New);
        uow.attach(image("high"), CacheStatus::Updated);
        assert_eq!(uow.entries().count(), 1);
        let (entity, status) = uow.tracked(EntityKind::Image, image("x").hash()).unwrap();
        assert_eq!(status, CacheStatus::New);
        let CacheEntity::Image(entity) = entity else { panic!("expected an image") };
        assert_eq!(entity.quality.as_deref(), Some("high"));
    }

    #[test]
    fn test_existing_entities_are_not_tracked() {
        let mut uow = UnitOfWork::new();
        uow.attach(image("low"), CacheStatus::Existed);
        uow.attach(image("low"), CacheStatus::Error);
        assert!(uow.is_empty());
    }
}
