//! Common record → entity mapping.

use time::UtcDateTime;

use crate::common::{CommonChannel, CommonRecord, Detail};
use crate::entity::{CacheEntity, CaptionEntity, ChannelEntity, EntityMeta, ImageEntity, StreamEntity, VideoEntity};
use crate::error::{ErrorKind, Result};

/// Builds and refreshes entities from provider records.
pub struct Mapper;

impl Mapper {
    /// A new, not yet persisted entity: `id` is zero and
    /// `created_at == last_synced_at == now`.
    pub fn create(common: &CommonRecord, now: UtcDateTime) -> CacheEntity {
        let meta = EntityMeta::new(common.identity(), now);
        let has_details = common.detail() == Detail::Full;
        match common {
            CommonRecord::Video(c) => CacheEntity::Video(VideoEntity {
                meta,
                video_id: c.identity.short_id().unwrap_or_default().to_string(),
                title: c.title.clone(),
                description: c.description.clone(),
                channel_hash: c.channel.as_ref().map(|channel| channel.hash()),
                author: c.author.clone(),
                length_seconds: c.length_seconds,
                view_count: c.view_count,
                like_count: c.like_count,
                published_at: c.published_at,
                is_live: c.is_live,
                is_upcoming: c.is_upcoming,
                has_details,
            }),
            CommonRecord::Channel(c) => {
                let (channel_id, handle) = channel_names(c);
                CacheEntity::Channel(ChannelEntity {
                    meta,
                    channel_id,
                    handle,
                    name: c.name.clone(),
                    description: c.description.clone(),
                    subscriber_count: c.subscriber_count,
                    is_verified: c.is_verified,
                    has_details,
                })
            },
            CommonRecord::Image(c) => CacheEntity::Image(ImageEntity {
                meta,
                width: c.width,
                height: c.height,
                quality: c.quality.clone(),
            }),
            CommonRecord::Stream(c) => CacheEntity::Stream(StreamEntity {
                meta,
                video_id: c.video_id.clone(),
                itag: c.itag,
                mime_type: c.mime_type.clone(),
                bitrate: c.bitrate,
                width: c.width,
                height: c.height,
                fps: c.fps,
                quality_label: c.quality_label.clone(),
                content_length: c.content_length,
                is_adaptive: c.is_adaptive,
            }),
            CommonRecord::Caption(c) => CacheEntity::Caption(CaptionEntity {
                meta,
                video_id: c.video_id.clone(),
                language_code: c.language_code.clone(),
                label: c.label.clone(),
                is_auto_generated: c.is_auto_generated,
            }),
        }
    }

    /// Refresh the mutable fields of `entity` from `common` and stamp
    /// `last_synced_at`.
    ///
    /// Optional fields are only overwritten when `common` has a value, so a
    /// summary never erases what a full-detail fetch stored. The address
    /// (`id`, `hash`, `absolute_url`) and `created_at` are left alone.
    pub fn update(entity: &mut CacheEntity, common: &CommonRecord, now: UtcDateTime) -> Result<()> {
        let full = common.detail() == Detail::Full;
        match (&mut *entity, common) {
            (CacheEntity::Video(e), CommonRecord::Video(c)) => {
                e.title.clone_from(&c.title);
                merge(&mut e.description, &c.description);
                merge(&mut e.channel_hash, &c.channel.as_ref().map(|channel| channel.hash()));
                merge(&mut e.author, &c.author);
                merge(&mut e.length_seconds, &c.length_seconds);
                merge(&mut e.view_count, &c.view_count);
                merge(&mut e.like_count, &c.like_count);
                merge(&mut e.published_at, &c.published_at);
                e.is_live = c.is_live;
                e.is_upcoming = c.is_upcoming;
                e.has_details |= full;
            },
            (CacheEntity::Channel(e), CommonRecord::Channel(c)) => {
                let (channel_id, handle) = channel_names(c);
                merge(&mut e.channel_id, &channel_id);
                merge(&mut e.handle, &handle);
                e.name.clone_from(&c.name);
                merge(&mut e.description, &c.description);
                merge(&mut e.subscriber_count, &c.subscriber_count);
                e.is_verified = c.is_verified;
                e.has_details |= full;
            },
            (CacheEntity::Image(e), CommonRecord::Image(c)) => {
                merge(&mut e.width, &c.width);
                merge(&mut e.height, &c.height);
                merge(&mut e.quality, &c.quality);
            },
            (CacheEntity::Stream(e), CommonRecord::Stream(c)) => {
                e.mime_type.clone_from(&c.mime_type);
                merge(&mut e.bitrate, &c.bitrate);
                merge(&mut e.width, &c.width);
                merge(&mut e.height, &c.height);
                merge(&mut e.fps, &c.fps);
                merge(&mut e.quality_label, &c.quality_label);
                merge(&mut e.content_length, &c.content_length);
                e.is_adaptive = c.is_adaptive;
            },
            (CacheEntity::Caption(e), CommonRecord::Caption(c)) => {
                e.label.clone_from(&c.label);
                e.is_auto_generated = c.is_auto_generated;
            },
            (entity, common) => exn::bail!(ErrorKind::KindMismatch {
                expected: entity.kind().remote(),
                found: common.kind().remote(),
            }),
        }
        entity.meta_mut().last_synced_at = now;
        Ok(())
    }
}

fn merge<T: Clone>(target: &mut Option<T>, incoming: &Option<T>) {
    if let Some(value) = incoming {
        *target = Some(value.clone());
    }
}

/// Channel ID and handle, from the identity plus whatever the record adds.
fn channel_names(common: &CommonChannel) -> (Option<String>, Option<String>) {
    match common.identity.short_id() {
        Some(handle) if handle.starts_with('@') => (None, Some(handle[1..].to_string())),
        Some(channel_id) => (Some(channel_id.to_string()), common.handle.clone()),
        None => (None, common.handle.clone()),
    }
}
