//! Provider records, as fetched from the API.
//!
//! A common record is what the provider said about a resource at fetch time.
//! It is never persisted as is: the [`Mapper`](crate::Mapper) folds it into
//! a [`CacheEntity`](crate::CacheEntity).

use time::UtcDateTime;
use tubesync_identity::RemoteIdentity;

use crate::entity::EntityKind;

/// How much the provider returned.
///
/// Listings (search results, channel uploads) return summaries. Only the
/// resource's own endpoint returns full details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Detail {
    #[default]
    Summary,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonVideo {
    pub identity: RemoteIdentity,
    pub detail: Detail,
    pub title: String,
    pub description: Option<String>,
    pub channel: Option<RemoteIdentity>,
    pub author: Option<String>,
    pub length_seconds: Option<u64>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub published_at: Option<UtcDateTime>,
    pub is_live: bool,
    pub is_upcoming: bool,
    pub thumbnails: Vec<CommonImage>,
    pub streams: Vec<CommonStream>,
    pub captions: Vec<CommonCaption>,
}
impl CommonVideo {
    pub fn new(identity: RemoteIdentity, title: impl Into<String>) -> Self {
        Self {
            identity,
            detail: Detail::Summary,
            title: title.into(),
            description: None,
            channel: None,
            author: None,
            length_seconds: None,
            view_count: None,
            like_count: None,
            published_at: None,
            is_live: false,
            is_upcoming: false,
            thumbnails: Vec::new(),
            streams: Vec::new(),
            captions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonChannel {
    pub identity: RemoteIdentity,
    pub detail: Detail,
    pub name: String,
    /// Handle without `@`, when the identity is a channel ID.
    pub handle: Option<String>,
    pub description: Option<String>,
    pub subscriber_count: Option<u64>,
    pub is_verified: bool,
    pub avatars: Vec<CommonImage>,
    pub banners: Vec<CommonImage>,
}
impl CommonChannel {
    pub fn new(identity: RemoteIdentity, name: impl Into<String>) -> Self {
        Self {
            identity,
            detail: Detail::Summary,
            name: name.into(),
            handle: None,
            description: None,
            subscriber_count: None,
            is_verified: false,
            avatars: Vec::new(),
            banners: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonImage {
    pub identity: RemoteIdentity,
    pub detail: Detail,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Provider quality label (`maxres`, `hqdefault`, …).
    pub quality: Option<String>,
}
impl CommonImage {
    pub fn new(identity: RemoteIdentity) -> Self {
        Self {
            identity,
            detail: Detail::Full,
            width: None,
            height: None,
            quality: None,
        }
    }

    pub fn sized(identity: RemoteIdentity, width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::new(identity)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonStream {
    pub identity: RemoteIdentity,
    pub detail: Detail,
    pub video_id: String,
    pub itag: u32,
    pub mime_type: String,
    pub bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub quality_label: Option<String>,
    pub content_length: Option<u64>,
    /// Audio-only or video-only (DASH) rather than muxed.
    pub is_adaptive: bool,
}
impl CommonStream {
    pub fn new(identity: RemoteIdentity, video_id: impl Into<String>, itag: u32, mime_type: impl Into<String>) -> Self {
        Self {
            identity,
            detail: Detail::Full,
            video_id: video_id.into(),
            itag,
            mime_type: mime_type.into(),
            bitrate: None,
            width: None,
            height: None,
            fps: None,
            quality_label: None,
            content_length: None,
            is_adaptive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonCaption {
    pub identity: RemoteIdentity,
    pub detail: Detail,
    pub video_id: String,
    pub language_code: String,
    pub label: String,
    pub is_auto_generated: bool,
}
impl CommonCaption {
    pub fn new(
        identity: RemoteIdentity,
        video_id: impl Into<String>,
        language_code: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            detail: Detail::Full,
            video_id: video_id.into(),
            language_code: language_code.into(),
            label: label.into(),
            is_auto_generated: false,
        }
    }
}

/// A provider record of any persisted kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonRecord {
    Video(CommonVideo),
    Channel(CommonChannel),
    Image(CommonImage),
    Stream(CommonStream),
    Caption(CommonCaption),
}
impl CommonRecord {
    /// The kind of entity this record maps to.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Video(_) => EntityKind::Video,
            Self::Channel(_) => EntityKind::Channel,
            Self::Image(_) => EntityKind::Image,
            Self::Stream(_) => EntityKind::Stream,
            Self::Caption(_) => EntityKind::Caption,
        }
    }

    pub fn identity(&self) -> &RemoteIdentity {
        match self {
            Self::Video(c) => &c.identity,
            Self::Channel(c) => &c.identity,
            Self::Image(c) => &c.identity,
            Self::Stream(c) => &c.identity,
            Self::Caption(c) => &c.identity,
        }
    }

    pub fn detail(&self) -> Detail {
        match self {
            Self::Video(c) => c.detail,
            Self::Channel(c) => c.detail,
            Self::Image(c) => c.detail,
            Self::Stream(c) => c.detail,
            Self::Caption(c) => c.detail,
        }
    }
}
impl From<CommonVideo> for CommonRecord {
    fn from(value: CommonVideo) -> Self {
        Self::Video(value)
    }
}
impl From<CommonChannel> for CommonRecord {
    fn from(value: CommonChannel) -> Self {
        Self::Channel(value)
    }
}
impl From<CommonImage> for CommonRecord {
    fn from(value: CommonImage) -> Self {
        Self::Image(value)
    }
}
impl From<CommonStream> for CommonRecord {
    fn from(value: CommonStream) -> Self {
        Self::Stream(value)
    }
}
impl From<CommonCaption> for CommonRecord {
    fn from(value: CommonCaption) -> Self {
        Self::Caption(value)
    }
}
