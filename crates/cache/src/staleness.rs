use std::time::Duration;
use time::UtcDateTime;

use crate::entity::{CacheEntity, EntityKind};

/// Decides whether a stored row should be refreshed.
pub trait Staleness: Sync {
    fn is_stale(&self, entity: &CacheEntity) -> bool;
}

impl<F> Staleness for F
where
    F: Fn(&CacheEntity) -> bool + Sync,
{
    fn is_stale(&self, entity: &CacheEntity) -> bool {
        self(entity)
    }
}

/// Per-kind time-to-live measured from `last_synced_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub video: Duration,
    pub channel: Duration,
    pub image: Duration,
    pub stream: Duration,
    pub caption: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            video: Duration::from_secs(60 * 60),
            channel: Duration::from_secs(24 * 60 * 60),
            image: Duration::from_secs(7 * 24 * 60 * 60),
            // Stream URLs expire upstream after a few hours.
            stream: Duration::from_secs(30 * 60),
            caption: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl TtlPolicy {
    pub fn ttl(&self, kind: EntityKind) -> Duration {
        match kind {
            EntityKind::Video => self.video,
            EntityKind::Channel => self.channel,
            EntityKind::Image => self.image,
            EntityKind::Stream => self.stream,
            EntityKind::Caption => self.caption,
        }
    }

    /// Stale once strictly more than the kind's TTL has passed since the
    /// last sync.
    pub fn is_stale_at(&self, entity: &CacheEntity, now: UtcDateTime) -> bool {
        let age = (now - entity.last_synced_at()).whole_seconds();
        let ttl = i64::try_from(self.ttl(entity.kind()).as_secs()).unwrap_or(i64::MAX);
        age > ttl
    }
}

impl Staleness for TtlPolicy {
    fn is_stale(&self, entity: &CacheEntity) -> bool {
        self.is_stale_at(entity, UtcDateTime::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CommonImage, CommonRecord};
    use crate::mapper::Mapper;
    use rstest::rstest;
    use tubesync_identity::RemoteIdentity;

    #[rstest]
    #[case(0, false)]
    #[case(604_800, false)]
    #[case(604_801, true)]
    fn test_image_ttl(#[case] age_seconds: i64, #[case] stale: bool) {
        let synced = UtcDateTime::now();
        let common = CommonImage::new(RemoteIdentity::image("https://i.ytimg.com/vi/dQw4w9WgXcQ/0.jpg", None).unwrap());
        let entity = Mapper::create(&CommonRecord::Image(common), synced);
        let now = synced + time::Duration::seconds(age_seconds);
        assert_eq!(TtlPolicy::default().is_stale_at(&entity, now), stale);
    }

    #[test]
    fn test_closures_are_policies() {
        let common = CommonImage::new(RemoteIdentity::image("https://i.ytimg.com/vi/dQw4w9WgXcQ/0.jpg", None).unwrap());
        let entity = Mapper::create(&CommonRecord::Image(common), UtcDateTime::now());
        let always = |_: &CacheEntity| true;
        assert!(always.is_stale(&entity));
        assert!(!TtlPolicy::default().is_stale(&entity));
    }
}
