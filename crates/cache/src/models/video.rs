use crate::entity::VideoEntity;
use crate::error::Error;
use crate::models::{MetaColumns, signed, timestamp, unsigned};

#[derive(sqlx::FromRow)]
pub(crate) struct VideoRow {
    #[sqlx(flatten)]
    pub(crate) meta: MetaColumns,
    pub(crate) video_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) channel_hash: Option<i64>,
    pub(crate) author: Option<String>,
    pub(crate) length_seconds: Option<i64>,
    pub(crate) view_count: Option<i64>,
    pub(crate) like_count: Option<i64>,
    pub(crate) published_at: Option<i64>,
    pub(crate) is_live: bool,
    pub(crate) is_upcoming: bool,
    pub(crate) has_details: bool,
}
impl TryFrom<&VideoEntity> for VideoRow {
    type Error = Error;
    fn try_from(video: &VideoEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: MetaColumns::try_from(&video.meta)?,
            video_id: video.video_id.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            channel_hash: video.channel_hash,
            author: video.author.clone(),
            length_seconds: signed(video.length_seconds, "length seconds")?,
            view_count: signed(video.view_count, "view count")?,
            like_count: signed(video.like_count, "like count")?,
            published_at: video.published_at.map(|at| at.unix_timestamp()),
            is_live: video.is_live,
            is_upcoming: video.is_upcoming,
            has_details: video.has_details,
        })
    }
}
impl TryFrom<VideoRow> for VideoEntity {
    type Error = Error;
    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: row.meta.try_into()?,
            video_id: row.video_id,
            title: row.title,
            description: row.description,
            channel_hash: row.channel_hash,
            author: row.author,
            length_seconds: unsigned(row.length_seconds, "length seconds")?,
            view_count: unsigned(row.view_count, "view count")?,
            like_count: unsigned(row.like_count, "like count")?,
            published_at: row.published_at.map(|at| timestamp(at, "published at")).transpose()?,
            is_live: row.is_live,
            is_upcoming: row.is_upcoming,
            has_details: row.has_details,
        })
    }
}
