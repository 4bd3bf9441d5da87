//! Many-to-many links between owners and their media.

use derive_more::Display;

use crate::common::CommonRecord;
use crate::entity::{CacheEntity, EntityKind};

/// A junction table.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssociationKind {
    #[display("channel avatar")]
    ChannelAvatar,
    #[display("channel banner")]
    ChannelBanner,
    #[display("video thumbnail")]
    VideoThumbnail,
    #[display("video stream")]
    VideoStream,
    #[display("video caption")]
    VideoCaption,
}
impl AssociationKind {
    pub const ALL: [Self; 5] = [
        Self::ChannelAvatar,
        Self::ChannelBanner,
        Self::VideoThumbnail,
        Self::VideoStream,
        Self::VideoCaption,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Self::ChannelAvatar => "channel_avatars",
            Self::ChannelBanner => "channel_banners",
            Self::VideoThumbnail => "video_thumbnails",
            Self::VideoStream => "video_streams",
            Self::VideoCaption => "video_captions",
        }
    }

    pub fn owner(&self) -> EntityKind {
        match self {
            Self::ChannelAvatar | Self::ChannelBanner => EntityKind::Channel,
            Self::VideoThumbnail | Self::VideoStream | Self::VideoCaption => EntityKind::Video,
        }
    }

    pub fn child(&self) -> EntityKind {
        match self {
            Self::ChannelAvatar | Self::ChannelBanner | Self::VideoThumbnail => EntityKind::Image,
            Self::VideoStream => EntityKind::Stream,
            Self::VideoCaption => EntityKind::Caption,
        }
    }

    /// The child records `owner` lists for this association, or `None` when
    /// `owner` is the wrong kind of record.
    pub fn children(&self, owner: &CommonRecord) -> Option<Vec<CommonRecord>> {
        let records = match (self, owner) {
            (Self::ChannelAvatar, CommonRecord::Channel(c)) => to_records(&c.avatars),
            (Self::ChannelBanner, CommonRecord::Channel(c)) => to_records(&c.banners),
            (Self::VideoThumbnail, CommonRecord::Video(v)) => to_records(&v.thumbnails),
            (Self::VideoStream, CommonRecord::Video(v)) => to_records(&v.streams),
            (Self::VideoCaption, CommonRecord::Video(v)) => to_records(&v.captions),
            _ => return None,
        };
        Some(records)
    }
}

fn to_records<T: Clone + Into<CommonRecord>>(children: &[T]) -> Vec<CommonRecord> {
    children.iter().cloned().map(Into::into).collect()
}

/// One junction row.
///
/// Owner and child are carried by hash as well as by id: either side may be a
/// new entity whose id is only known once the unit of work is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationRow {
    pub kind: AssociationKind,
    /// Zero until committed.
    pub id: i64,
    pub owner_id: i64,
    pub owner_hash: i64,
    pub child_id: i64,
    pub child_hash: i64,
}
impl AssociationRow {
    pub fn new(kind: AssociationKind, owner: &CacheEntity, child: &CacheEntity) -> Self {
        Self {
            kind,
            id: 0,
            owner_id: owner.id(),
            owner_hash: owner.hash(),
            child_id: child.id(),
            child_hash: child.hash(),
        }
    }

    pub(crate) fn pair(&self) -> (AssociationKind, i64, i64) {
        (self.kind, self.owner_hash, self.child_hash)
    }
}
