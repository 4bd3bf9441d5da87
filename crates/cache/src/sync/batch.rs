//! Shared prepare → guard → apply pipeline.

use std::collections::{BTreeMap, HashMap, HashSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::association::AssociationRow;
use crate::common::CommonRecord;
use crate::entity::{CacheEntity, EntityKind};
use crate::error::{ErrorKind, Result};
use crate::guard::DuplicateGuard;
use crate::mapper::Mapper;
use crate::result::{CacheResult, CacheStatus};
use crate::session::UnitOfWork;
use crate::staleness::Staleness;
use crate::sync::Synchronizer;

type Key = (EntityKind, i64);

/// A resolved batch that has not touched the unit of work yet.
pub(super) struct Batch {
    pub(super) results: Vec<CacheResult>,
    /// New and updated entities, one per key.
    pending: Vec<(CacheEntity, CacheStatus)>,
}

impl Batch {
    /// Everything that would be tracked after [`apply`](Self::apply) must be
    /// free of duplicates.
    pub(super) fn guard(&self, uow: &UnitOfWork, associations: &[AssociationRow]) -> Result<()> {
        let replaced: HashSet<Key> = self.pending.iter().map(|(entity, _)| entity.key()).collect();
        let mut entities: Vec<(&CacheEntity, CacheStatus)> =
            uow.entries().filter(|(entity, _)| !replaced.contains(&entity.key())).collect();
        entities.extend(self.pending.iter().map(|(entity, status)| (entity, *status)));
        let mut rows = uow.associations().to_vec();
        rows.extend_from_slice(associations);
        DuplicateGuard::check(&entities, &rows)
    }

    pub(super) fn apply(self, uow: &mut UnitOfWork, associations: Vec<AssociationRow>) -> Vec<CacheResult> {
        debug!(
            entities = self.pending.len(),
            associations = associations.len(),
            "attaching to unit of work"
        );
        for (entity, status) in self.pending {
            uow.attach(entity, status);
        }
        for row in associations {
            uow.attach_association(row);
        }
        self.results
    }
}

impl Synchronizer {
    /// Resolve every record to an entity and a status. `None` when
    /// cancelled.
    pub(super) async fn prepare(
        &self,
        uow: &UnitOfWork,
        commons: Vec<CommonRecord>,
        staleness: &(impl Staleness + ?Sized),
        cancel: &CancellationToken,
    ) -> Result<Option<Batch>> {
        // Distinct records by key, first occurrence wins.
        let mut index: HashMap<Key, usize> = HashMap::new();
        let mut distinct: Vec<(Key, CommonRecord)> = Vec::new();
        let mut inputs = Vec::with_capacity(commons.len());
        for common in commons {
            let expected = common.kind();
            match EntityKind::try_from(common.identity().kind()) {
                Ok(kind) if kind == expected => {
                    let key = (kind, common.identity().hash());
                    let slot = *index.entry(key).or_insert_with(|| {
                        distinct.push((key, common.clone()));
                        distinct.len() - 1
                    });
                    inputs.push((common, Ok(slot)));
                },
                _ => {
                    trace!(identity = common.identity().canonical_url(), "identity kind does not match record");
                    let error = exn::Exn::from(ErrorKind::KindMismatch {
                        expected: expected.remote(),
                        found: common.identity().kind(),
                    });
                    inputs.push((common, Err(error)));
                },
            }
        }

        if cancel.is_cancelled() {
            return Ok(None);
        }
        let mut found: HashMap<Key, (CacheEntity, Option<CacheStatus>)> = HashMap::new();
        let mut wanted: BTreeMap<EntityKind, Vec<i64>> = BTreeMap::new();
        for ((kind, hash), _) in &distinct {
            match uow.tracked(*kind, *hash) {
                Some((entity, status)) => {
                    found.insert((*kind, *hash), (entity.clone(), Some(status)));
                },
                None => wanted.entry(*kind).or_default().push(*hash),
            }
        }
        let tracked_count = found.len();
        for (kind, hashes) in &wanted {
            let stored = self.gateway.fetch_by_hashes(*kind, hashes).await?;
            let checked: Vec<_> = stored.iter().map(|entity| (entity, CacheStatus::Existed)).collect();
            DuplicateGuard::check(&checked, &[])?;
            for entity in stored {
                if index.contains_key(&entity.key()) {
                    found.insert(entity.key(), (entity, None));
                }
            }
        }
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let now = (self.now)();
        let (mut fresh, mut stale, mut unsaved) = (0usize, 0usize, 0usize);
        let mut resolved = Vec::with_capacity(distinct.len());
        let mut pending = Vec::new();
        for (key, common) in &distinct {
            let (entity, status, changed) = match found.remove(key) {
                None => {
                    unsaved += 1;
                    (Mapper::create(common, now), CacheStatus::New, true)
                },
                Some((mut entity, tracked)) if staleness.is_stale(&entity) => {
                    stale += 1;
                    Mapper::update(&mut entity, common, now)?;
                    (entity, tracked.unwrap_or(CacheStatus::Updated), true)
                },
                Some((entity, tracked)) => {
                    fresh += 1;
                    (entity, tracked.unwrap_or(CacheStatus::Existed), false)
                },
            };
            trace!(kind = %key.0, hash = key.1, ?status, "resolved record");
            if changed {
                pending.push((entity.clone(), status));
            }
            resolved.push((entity, status));
        }
        debug!(
            fresh,
            stale,
            unsaved,
            tracked = tracked_count,
            rejected = inputs.len() - inputs.iter().filter(|(_, slot)| slot.is_ok()).count(),
            "partitioned batch"
        );

        let results = inputs
            .into_iter()
            .map(|(common, slot)| match slot {
                Ok(slot) => {
                    let (entity, status) = &resolved[slot];
                    CacheResult::synced(*status, entity.clone(), common)
                },
                Err(error) => CacheResult::rejected(common, error),
            })
            .collect();
        Ok(Some(Batch { results, pending }))
    }
}
