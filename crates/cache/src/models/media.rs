use exn::ResultExt;

use crate::entity::{CaptionEntity, ImageEntity, StreamEntity};
use crate::error::{Error, ErrorKind};
use crate::models::{MetaColumns, signed, unsigned};

#[derive(sqlx::FromRow)]
pub(crate) struct ImageRow {
    #[sqlx(flatten)]
    pub(crate) meta: MetaColumns,
    pub(crate) width: Option<i64>,
    pub(crate) height: Option<i64>,
    pub(crate) quality: Option<String>,
}
impl TryFrom<&ImageEntity> for ImageRow {
    type Error = Error;
    fn try_from(image: &ImageEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: MetaColumns::try_from(&image.meta)?,
            width: image.width.map(i64::from),
            height: image.height.map(i64::from),
            quality: image.quality.clone(),
        })
    }
}
impl TryFrom<ImageRow> for ImageEntity {
    type Error = Error;
    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: row.meta.try_into()?,
            width: unsigned(row.width, "image width")?,
            height: unsigned(row.height, "image height")?,
            quality: row.quality,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct StreamRow {
    #[sqlx(flatten)]
    pub(crate) meta: MetaColumns,
    pub(crate) video_id: String,
    pub(crate) itag: i64,
    pub(crate) mime_type: String,
    pub(crate) bitrate: Option<i64>,
    pub(crate) width: Option<i64>,
    pub(crate) height: Option<i64>,
    pub(crate) fps: Option<i64>,
    pub(crate) quality_label: Option<String>,
    pub(crate) content_length: Option<i64>,
    pub(crate) is_adaptive: bool,
}
impl TryFrom<&StreamEntity> for StreamRow {
    type Error = Error;
    fn try_from(stream: &StreamEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: MetaColumns::try_from(&stream.meta)?,
            video_id: stream.video_id.clone(),
            itag: i64::from(stream.itag),
            mime_type: stream.mime_type.clone(),
            bitrate: signed(stream.bitrate, "bitrate")?,
            width: stream.width.map(i64::from),
            height: stream.height.map(i64::from),
            fps: stream.fps.map(i64::from),
            quality_label: stream.quality_label.clone(),
            content_length: signed(stream.content_length, "content length")?,
            is_adaptive: stream.is_adaptive,
        })
    }
}
impl TryFrom<StreamRow> for StreamEntity {
    type Error = Error;
    fn try_from(row: StreamRow) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: row.meta.try_into()?,
            video_id: row.video_id,
            itag: u32::try_from(row.itag).or_raise(|| ErrorKind::InvalidData("itag"))?,
            mime_type: row.mime_type,
            bitrate: unsigned(row.bitrate, "bitrate")?,
            width: unsigned(row.width, "stream width")?,
            height: unsigned(row.height, "stream height")?,
            fps: unsigned(row.fps, "fps")?,
            quality_label: row.quality_label,
            content_length: unsigned(row.content_length, "content length")?,
            is_adaptive: row.is_adaptive,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct CaptionRow {
    #[sqlx(flatten)]
    pub(crate) meta: MetaColumns,
    pub(crate) video_id: String,
    pub(crate) language_code: String,
    pub(crate) label: String,
    pub(crate) is_auto_generated: bool,
}
impl TryFrom<&CaptionEntity> for CaptionRow {
    type Error = Error;
    fn try_from(caption: &CaptionEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: MetaColumns::try_from(&caption.meta)?,
            video_id: caption.video_id.clone(),
            language_code: caption.language_code.clone(),
            label: caption.label.clone(),
            is_auto_generated: caption.is_auto_generated,
        })
    }
}
impl TryFrom<CaptionRow> for CaptionEntity {
    type Error = Error;
    fn try_from(row: CaptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: row.meta.try_into()?,
            video_id: row.video_id,
            language_code: row.language_code,
            label: row.label,
            is_auto_generated: row.is_auto_generated,
        })
    }
}
