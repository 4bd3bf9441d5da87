//! The synchronization engine.
//!
//! Reconciles freshly fetched provider records against the store:
//!
//! 1. Records are de-duplicated by identity hash.
//! 2. Stored rows are fetched in bulk, one query per kind. Entities the unit
//!    of work already tracks count as found.
//! 3. Found rows are split into fresh and stale by the [`Staleness`] policy.
//! 4. Stale rows are updated in place, missing rows are created.
//! 5. The [`DuplicateGuard`](crate::DuplicateGuard) checks the batch.
//! 6. New and updated entities are attached to the caller's [`UnitOfWork`].
//!
//! The engine never commits. Cancellation is checked before the fetch,
//! after it, and right before attaching; a cancelled call leaves the unit of
//! work exactly as it was.

mod batch;
mod children;

use time::UtcDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::common::CommonRecord;
use crate::error::Result;
use crate::gateway::GatewayHandle;
use crate::result::CacheResult;
use crate::session::UnitOfWork;
use crate::staleness::Staleness;

/// Outcome of an engine call that was not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    Done(T),
    /// The token was cancelled; nothing was attached.
    Cancelled,
}
impl<T> Completion<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

/// Entry point of the engine. Cheap to clone, safe to share: all state lives
/// in the gateway and in each call's unit of work.
#[derive(Clone)]
pub struct Synchronizer {
    gateway: GatewayHandle,
    now: fn() -> UtcDateTime,
}

impl Synchronizer {
    pub fn new(gateway: GatewayHandle) -> Self {
        Self {
            gateway,
            now: UtcDateTime::now,
        }
    }

    /// Replace the clock used to stamp `created_at` and `last_synced_at`.
    pub fn with_clock(self, now: fn() -> UtcDateTime) -> Self {
        Self { now, ..self }
    }

    pub fn gateway(&self) -> &GatewayHandle {
        &self.gateway
    }

    /// Synchronize `commons` into `uow`.
    ///
    /// Returns one [`CacheResult`] per input, in input order; duplicates
    /// resolve to the same entity. A record whose identity is of another kind
    /// than the record itself gets an error result without failing the batch.
    /// Storage errors and duplicate guard violations fail the whole call and
    /// leave `uow` untouched.
    #[instrument(skip_all, fields(records = commons.len()))]
    pub async fn synchronize(
        &self,
        uow: &mut UnitOfWork,
        commons: Vec<CommonRecord>,
        staleness: &(impl Staleness + ?Sized),
        cancel: &CancellationToken,
    ) -> Result<Completion<Vec<CacheResult>>> {
        let Some(batch) = self.prepare(uow, commons, staleness, cancel).await? else {
            debug!("cancelled before attaching");
            return Ok(Completion::Cancelled);
        };
        batch.guard(uow, &[])?;
        if cancel.is_cancelled() {
            debug!("cancelled before attaching");
            return Ok(Completion::Cancelled);
        }
        Ok(Completion::Done(batch.apply(uow, Vec::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CommonImage, CommonVideo};
    use crate::entity::{CacheEntity, EntityKind};
    use crate::error::ErrorKind;
    use crate::gateway::StorageGateway;
    use crate::guard::CollisionKey;
    use crate::mapper::Mapper;
    use crate::memory::MemoryGateway;
    use crate::result::CacheStatus;
    use crate::staleness::TtlPolicy;
    use std::sync::Arc;
    use time::Duration;
    use tubesync_identity::RemoteIdentity;

    const THUMBNAIL: &str = "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg";

    fn never(_: &CacheEntity) -> bool {
        false
    }

    fn always(_: &CacheEntity) -> bool {
        true
    }

    fn setup() -> (Arc<MemoryGateway>, Synchronizer) {
        let gateway = Arc::new(MemoryGateway::new());
        let sync = Synchronizer::new(gateway.clone());
        (gateway, sync)
    }

    fn thumbnail(url: &str) -> CommonRecord {
        CommonImage::sized(RemoteIdentity::image(url, None).unwrap(), 480, 360).into()
    }

    fn video(title: &str) -> CommonRecord {
        CommonVideo::new(RemoteIdentity::video("dQw4w9WgXcQ").unwrap(), title).into()
    }

    #[tokio::test]
    async fn test_new_rows() {
        let (gateway, sync) = setup();
        let mut uow = UnitOfWork::new();
        let results = sync
            .synchronize(&mut uow, vec![video("Never Gonna Give You Up")], &never, &CancellationToken::new())
            .await
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.status, CacheStatus::New);
        let entity = result.entity.as_ref().unwrap();
        assert_eq!(entity.created_at(), entity.last_synced_at());
        assert_eq!(uow.entries().count(), 1);
        // Attached, not committed.
        assert!(gateway.rows(EntityKind::Video).await.is_empty());
    }

    #[tokio::test]
    async fn test_same_image_five_times() {
        let (gateway, sync) = setup();
        let mut uow = UnitOfWork::new();
        let commons = vec![
            thumbnail(THUMBNAIL),
            thumbnail("http://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"),
            thumbnail("https://i3.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"),
            thumbnail("//i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"),
            thumbnail(THUMBNAIL),
        ];
        let results = sync
            .synchronize(&mut uow, commons, &never, &CancellationToken::new())
            .await
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.status == CacheStatus::New));
        assert_eq!(gateway.queries(EntityKind::Image).await, 1);
        let receipt = gateway.commit(uow).await.unwrap();
        assert_eq!(receipt.inserted(), 1);
        let stored = gateway.rows(EntityKind::Image).await;
        assert_eq!(stored.len(), 1);
        for result in &results {
            let entity = result.entity.as_ref().unwrap();
            assert_eq!(receipt.id_of(EntityKind::Image, entity.hash()), Some(stored[0].id()));
        }
    }

    #[tokio::test]
    async fn test_stale_row_is_updated_in_place() {
        let (gateway, sync) = setup();
        let synced = UtcDateTime::now() - Duration::days(3);
        let seeded = gateway.seed(Mapper::create(&video("Old title"), synced)).await;
        let mut uow = UnitOfWork::new();
        let results = sync
            .synchronize(&mut uow, vec![video("New title")], &TtlPolicy::default(), &CancellationToken::new())
            .await
            .unwrap()
            .done()
            .unwrap();
        let result = &results[0];
        assert_eq!(result.status, CacheStatus::Updated);
        let entity = result.entity.as_ref().unwrap();
        assert_eq!(entity.id(), seeded.id());
        assert_eq!(entity.hash(), seeded.hash());
        assert_eq!(entity.absolute_url(), seeded.absolute_url());
        assert_eq!(entity.created_at(), synced);
        assert!(entity.last_synced_at() > synced);
        let CacheEntity::Video(video) = entity else { panic!("expected a video") };
        assert_eq!(video.title, "New title");

        gateway.commit(uow).await.unwrap();
        let stored = gateway.rows(EntityKind::Video).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(&stored[0], entity);
    }

    #[tokio::test]
    async fn test_fresh_rows_existed_and_idempotent() {
        let (gateway, sync) = setup();
        let cancel = CancellationToken::new();
        let commons = || vec![video("Never Gonna Give You Up"), thumbnail(THUMBNAIL)];
        let mut first = UnitOfWork::new();
        sync.synchronize(&mut first, commons(), &never, &cancel).await.unwrap();
        gateway.commit(first).await.unwrap();

        for _ in 0..2 {
            let mut uow = UnitOfWork::new();
            let results = sync.synchronize(&mut uow, commons(), &never, &cancel).await.unwrap().done().unwrap();
            assert!(results.iter().all(|r| r.status == CacheStatus::Existed));
            assert!(uow.is_empty());
            assert_eq!(gateway.commit(uow).await.unwrap().inserted(), 0);
        }
        assert_eq!(gateway.rows(EntityKind::Video).await.len(), 1);
        assert_eq!(gateway.rows(EntityKind::Image).await.len(), 1);
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let (_, sync) = setup();
        let mut uow = UnitOfWork::new();
        let commons = vec![
            thumbnail("https://i.ytimg.com/vi/aaaaaaaaaaa/0.jpg"),
            video("Never Gonna Give You Up"),
            thumbnail("https://i.ytimg.com/vi/bbbbbbbbbbb/0.jpg"),
            thumbnail("https://i.ytimg.com/vi/aaaaaaaaaaa/0.jpg"),
        ];
        let expected: Vec<_> = commons.iter().map(|c| c.identity().hash()).collect();
        let results = sync
            .synchronize(&mut uow, commons, &never, &CancellationToken::new())
            .await
            .unwrap()
            .done()
            .unwrap();
        let hashes: Vec<_> = results.iter().map(|r| r.entity.as_ref().unwrap().hash()).collect();
        assert_eq!(hashes, expected);
        assert_eq!(uow.entries().count(), 3);
    }

    #[tokio::test]
    async fn test_mismatched_identity_is_a_per_item_error() {
        let (_, sync) = setup();
        let mut uow = UnitOfWork::new();
        let wrong = CommonImage::new(RemoteIdentity::video("dQw4w9WgXcQ").unwrap());
        let results = sync
            .synchronize(
                &mut uow,
                vec![wrong.into(), thumbnail(THUMBNAIL)],
                &never,
                &CancellationToken::new(),
            )
            .await
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(results[0].status, CacheStatus::Error);
        assert!(results[0].entity.is_none());
        assert!(matches!(&***results[0].error.as_ref().unwrap(), ErrorKind::KindMismatch { .. }));
        assert_eq!(results[1].status, CacheStatus::New);
        assert_eq!(uow.entries().count(), 1);
    }

    #[tokio::test]
    async fn test_tracked_entities_count_as_found() {
        let (gateway, sync) = setup();
        let cancel = CancellationToken::new();
        let mut uow = UnitOfWork::new();
        sync.synchronize(&mut uow, vec![thumbnail(THUMBNAIL)], &never, &cancel).await.unwrap();
        let results = sync
            .synchronize(&mut uow, vec![thumbnail(THUMBNAIL)], &never, &cancel)
            .await
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(results[0].status, CacheStatus::New);
        assert_eq!(gateway.queries(EntityKind::Image).await, 1);
        assert_eq!(uow.entries().count(), 1);

        // A stale tracked entity is refreshed and stays new.
        let mut full = CommonImage::new(RemoteIdentity::image(THUMBNAIL, None).unwrap());
        full.quality = Some("hqdefault".to_string());
        sync.synchronize(&mut uow, vec![full.into()], &always, &cancel).await.unwrap();
        let (tracked, status) = uow.tracked(EntityKind::Image, results[0].identity.hash()).unwrap();
        assert_eq!(status, CacheStatus::New);
        let CacheEntity::Image(image) = tracked else { panic!("expected an image") };
        assert_eq!(image.quality.as_deref(), Some("hqdefault"));
        assert_eq!(image.width, Some(480));
    }

    #[tokio::test]
    async fn test_duplicate_id_aborts_the_batch() {
        let (gateway, sync) = setup();
        let seeded = gateway
            .seed(Mapper::create(&video("Never Gonna Give You Up"), UtcDateTime::now()))
            .await;
        let other = CommonVideo::new(RemoteIdentity::video("aaaaaaaaaaa").unwrap(), "Other");
        let mut clash = Mapper::create(&other.into(), UtcDateTime::now());
        clash.meta_mut().id = seeded.id();
        let mut uow = UnitOfWork::new();
        uow.attach(clash, CacheStatus::Updated);

        let error = sync
            .synchronize(&mut uow, vec![video("Refreshed")], &always, &CancellationToken::new())
            .await
            .unwrap_err();
        let ErrorKind::DuplicateEntity(collision) = &*error else {
            panic!("expected a duplicate entity error, got {error:?}");
        };
        assert_eq!(collision.key, CollisionKey::Id(seeded.id()));
        assert_eq!(collision.members.len(), 2);
        // Untouched: only the entity attached by hand.
        assert_eq!(uow.entries().count(), 1);
        let (tracked, _) = uow.entries().next().unwrap();
        assert_ne!(tracked.hash(), seeded.hash());
    }

    #[tokio::test]
    async fn test_cancelled_before_fetch() {
        let (gateway, sync) = setup();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut uow = UnitOfWork::new();
        let completion = sync.synchronize(&mut uow, vec![thumbnail(THUMBNAIL)], &never, &cancel).await.unwrap();
        assert!(completion.is_cancelled());
        assert!(uow.is_empty());
        assert_eq!(gateway.queries(EntityKind::Image).await, 0);
    }

    #[tokio::test]
    async fn test_clock_is_injectable() {
        fn epoch() -> UtcDateTime {
            UtcDateTime::from_unix_timestamp(1_700_000_000).unwrap()
        }
        let (_, sync) = setup();
        let sync = sync.with_clock(epoch);
        let mut uow = UnitOfWork::new();
        let results = sync
            .synchronize(&mut uow, vec![thumbnail(THUMBNAIL)], &never, &CancellationToken::new())
            .await
            .unwrap()
            .done()
            .unwrap();
        assert_eq!(results[0].entity.as_ref().unwrap().created_at(), epoch());
    }
}
