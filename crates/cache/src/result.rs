use std::sync::Arc;
use tubesync_identity::RemoteIdentity;

use crate::common::CommonRecord;
use crate::entity::CacheEntity;
use crate::error::Error;

/// What synchronizing one record did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// A fresh row already existed; nothing is written.
    Existed,
    /// A stale row was refreshed in place.
    Updated,
    /// No row existed; one will be inserted on commit.
    New,
    /// The record could not be synchronized.
    Error,
}
impl CacheStatus {
    /// Whether an entity with this status is written on commit.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::New | Self::Updated)
    }
}

/// Outcome for one input record.
///
/// `entity` is present unless `status` is [`CacheStatus::Error`], in which
/// case `error` says why.
#[derive(Debug, Clone)]
pub struct CacheResult {
    pub status: CacheStatus,
    pub identity: RemoteIdentity,
    pub entity: Option<CacheEntity>,
    pub common: Option<CommonRecord>,
    pub error: Option<Arc<Error>>,
}
impl CacheResult {
    pub(crate) fn synced(status: CacheStatus, entity: CacheEntity, common: CommonRecord) -> Self {
        Self {
            status,
            identity: common.identity().clone(),
            entity: Some(entity),
            common: Some(common),
            error: None,
        }
    }

    pub(crate) fn rejected(common: CommonRecord, error: Error) -> Self {
        Self {
            status: CacheStatus::Error,
            identity: common.identity().clone(),
            entity: None,
            common: Some(common),
            error: Some(Arc::new(error)),
        }
    }

    /// A record that never made it to the cache, such as a failed upstream
    /// fetch. Passed as a parent, it gets no children.
    pub fn failed(identity: RemoteIdentity, error: Error) -> Self {
        Self {
            status: CacheStatus::Error,
            identity,
            entity: None,
            common: None,
            error: Some(Arc::new(error)),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CacheStatus::Error
    }
}
