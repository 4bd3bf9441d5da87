//! Persisted entities.
//!
//! Every entity carries an [`EntityMeta`] whose `id`, `hash` and
//! `absolute_url` can only be set by this crate: once a row exists its
//! address never changes. The kind-specific fields are plain data.

use derive_more::Display;
use time::UtcDateTime;
use tubesync_identity::{RemoteIdentity, RemoteKind};

/// The five kinds of resource that are persisted.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    #[display("video")]
    Video,
    #[display("channel")]
    Channel,
    #[display("image")]
    Image,
    #[display("stream")]
    Stream,
    #[display("caption")]
    Caption,
}
impl EntityKind {
    pub const ALL: [Self; 5] = [Self::Video, Self::Channel, Self::Image, Self::Stream, Self::Caption];

    /// Name of the table rows of this kind are stored in.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Video => "videos",
            Self::Channel => "channels",
            Self::Image => "images",
            Self::Stream => "streams",
            Self::Caption => "captions",
        }
    }

    pub fn remote(&self) -> RemoteKind {
        match self {
            Self::Video => RemoteKind::Video,
            Self::Channel => RemoteKind::Channel,
            Self::Image => RemoteKind::Image,
            Self::Stream => RemoteKind::Stream,
            Self::Caption => RemoteKind::Caption,
        }
    }
}
impl TryFrom<RemoteKind> for EntityKind {
    type Error = RemoteKind;
    fn try_from(kind: RemoteKind) -> Result<Self, Self::Error> {
        Ok(match kind {
            RemoteKind::Video => Self::Video,
            RemoteKind::Channel => Self::Channel,
            RemoteKind::Image => Self::Image,
            RemoteKind::Stream => Self::Stream,
            RemoteKind::Caption => Self::Caption,
            RemoteKind::Comment => return Err(kind),
        })
    }
}

/// Columns shared by every table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMeta {
    /// Zero until the row has been committed.
    pub(crate) id: i64,
    pub(crate) hash: i64,
    pub(crate) absolute_url: String,
    pub(crate) created_at: UtcDateTime,
    pub(crate) last_synced_at: UtcDateTime,
}
impl EntityMeta {
    pub(crate) fn new(identity: &RemoteIdentity, now: UtcDateTime) -> Self {
        Self {
            id: 0,
            hash: identity.hash(),
            absolute_url: identity.canonical_url().to_string(),
            created_at: now,
            last_synced_at: now,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn hash(&self) -> i64 {
        self.hash
    }

    pub fn absolute_url(&self) -> &str {
        &self.absolute_url
    }

    pub fn created_at(&self) -> UtcDateTime {
        self.created_at
    }

    pub fn last_synced_at(&self) -> UtcDateTime {
        self.last_synced_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntity {
    pub(crate) meta: EntityMeta,
    pub video_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Hash of the uploading channel's identity.
    pub channel_hash: Option<i64>,
    pub author: Option<String>,
    pub length_seconds: Option<u64>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub published_at: Option<UtcDateTime>,
    pub is_live: bool,
    pub is_upcoming: bool,
    /// Whether a full-detail record has ever been synced.
    pub has_details: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntity {
    pub(crate) meta: EntityMeta,
    pub channel_id: Option<String>,
    /// Without the leading `@`.
    pub handle: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub subscriber_count: Option<u64>,
    pub is_verified: bool,
    pub has_details: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntity {
    pub(crate) meta: EntityMeta,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntity {
    pub(crate) meta: EntityMeta,
    pub video_id: String,
    pub itag: u32,
    pub mime_type: String,
    pub bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub quality_label: Option<String>,
    pub content_length: Option<u64>,
    pub is_adaptive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEntity {
    pub(crate) meta: EntityMeta,
    pub video_id: String,
    pub language_code: String,
    pub label: String,
    pub is_auto_generated: bool,
}

/// A persisted (or about to be persisted) row of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntity {
    Video(VideoEntity),
    Channel(ChannelEntity),
    Image(ImageEntity),
    Stream(StreamEntity),
    Caption(CaptionEntity),
}
impl CacheEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Video(_) => EntityKind::Video,
            Self::Channel(_) => EntityKind::Channel,
            Self::Image(_) => EntityKind::Image,
            Self::Stream(_) => EntityKind::Stream,
            Self::Caption(_) => EntityKind::Caption,
        }
    }

    pub fn meta(&self) -> &EntityMeta {
        match self {
            Self::Video(e) => &e.meta,
            Self::Channel(e) => &e.meta,
            Self::Image(e) => &e.meta,
            Self::Stream(e) => &e.meta,
            Self::Caption(e) => &e.meta,
        }
    }

    pub(crate) fn meta_mut(&mut self) -> &mut EntityMeta {
        match self {
            Self::Video(e) => &mut e.meta,
            Self::Channel(e) => &mut e.meta,
            Self::Image(e) => &mut e.meta,
            Self::Stream(e) => &mut e.meta,
            Self::Caption(e) => &mut e.meta,
        }
    }

    pub fn id(&self) -> i64 {
        self.meta().id
    }

    pub fn hash(&self) -> i64 {
        self.meta().hash
    }

    pub fn absolute_url(&self) -> &str {
        &self.meta().absolute_url
    }

    pub fn created_at(&self) -> UtcDateTime {
        self.meta().created_at
    }

    pub fn last_synced_at(&self) -> UtcDateTime {
        self.meta().last_synced_at
    }

    /// Lookup key within a unit of work or a batch.
    pub(crate) fn key(&self) -> (EntityKind, i64) {
        (self.kind(), self.hash())
    }
}
