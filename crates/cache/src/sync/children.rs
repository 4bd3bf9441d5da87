use std::collections::HashSet;
use std::ops::Range;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::association::{AssociationKind, AssociationRow};
use crate::common::CommonRecord;
use crate::entity::CacheEntity;
use crate::error::Result;
use crate::result::{CacheResult, CacheStatus};
use crate::session::UnitOfWork;
use crate::staleness::Staleness;
use crate::sync::{Completion, Synchronizer};

impl Synchronizer {
    /// Synchronize the children `parents` list for `association` in one
    /// batch, and link every newly created child to its parent.
    ///
    /// Returns one child list per parent, in parent order. Each list holds
    /// one result per distinct child. Parents that failed, or that are not
    /// owners of `association`, get an empty list.
    #[instrument(skip_all, fields(parents = parents.len(), %association))]
    pub async fn synchronize_children(
        &self,
        uow: &mut UnitOfWork,
        parents: &[CacheResult],
        association: AssociationKind,
        staleness: &(impl Staleness + ?Sized),
        cancel: &CancellationToken,
    ) -> Result<Completion<Vec<Vec<CacheResult>>>> {
        let mut spans: Vec<Option<(&CacheEntity, Range<usize>)>> = Vec::with_capacity(parents.len());
        let mut commons: Vec<CommonRecord> = Vec::new();
        for parent in parents {
            let Some((owner, children)) = owned_children(parent, association) else {
                spans.push(None);
                continue;
            };
            let start = commons.len();
            let mut seen = HashSet::new();
            commons.extend(children.into_iter().filter(|child| seen.insert(child.identity().hash())));
            spans.push(Some((owner, start..commons.len())));
        }
        debug!(children = commons.len(), "collected child records");

        let Some(batch) = self.prepare(uow, commons, staleness, cancel).await? else {
            debug!("cancelled before attaching");
            return Ok(Completion::Cancelled);
        };

        let mut linked: HashSet<_> = uow.associations().iter().map(AssociationRow::pair).collect();
        let mut associations = Vec::new();
        for (owner, range) in spans.iter().flatten() {
            for result in &batch.results[range.clone()] {
                let Some(child) = result.entity.as_ref().filter(|_| result.status == CacheStatus::New) else {
                    continue;
                };
                let row = AssociationRow::new(association, owner, child);
                if linked.insert(row.pair()) {
                    associations.push(row);
                }
            }
        }
        batch.guard(uow, &associations)?;
        if cancel.is_cancelled() {
            debug!("cancelled before attaching");
            return Ok(Completion::Cancelled);
        }

        let mut results = batch.apply(uow, associations).into_iter();
        let lists = spans
            .into_iter()
            .map(|span| match span {
                Some((_, range)) => results.by_ref().take(range.len()).collect(),
                None => Vec::new(),
            })
            .collect();
        Ok(Completion::Done(lists))
    }
}

/// The owner entity and its listed children, or `None` (with a warning) when
/// the parent cannot own children of `association`.
fn owned_children(parent: &CacheResult, association: AssociationKind) -> Option<(&CacheEntity, Vec<CommonRecord>)> {
    let identity = parent.identity.canonical_url();
    let (Some(owner), Some(common)) = (parent.entity.as_ref(), parent.common.as_ref()) else {
        warn!(identity, status = ?parent.status, "skipping children of unresolved parent");
        return None;
    };
    if parent.is_error() || owner.kind() != association.owner() {
        warn!(identity, kind = %owner.kind(), "skipping children of parent");
        return None;
    }
    let children = association.children(common);
    if children.is_none() {
        warn!(identity, "parent record does not list {association} children");
    }
    children.map(|children| (owner, children))
}
