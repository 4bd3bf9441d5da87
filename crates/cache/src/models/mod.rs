mod channel;
mod media;
mod video;

pub(crate) use self::channel::ChannelRow;
pub(crate) use self::media::{CaptionRow, ImageRow, StreamRow};
pub(crate) use self::video::VideoRow;

use exn::ResultExt;
use time::UtcDateTime;

use crate::entity::EntityMeta;
use crate::error::{ErrorKind, Result};

/// The columns every table shares, as stored. Sync timestamps are unix
/// nanoseconds.
#[derive(sqlx::FromRow)]
pub(crate) struct MetaColumns {
    pub(crate) id: i64,
    pub(crate) hash: i64,
    pub(crate) absolute_url: String,
    pub(crate) created_at: i64,
    pub(crate) last_synced_at: i64,
}
impl TryFrom<&EntityMeta> for MetaColumns {
    type Error = crate::error::Error;
    fn try_from(meta: &EntityMeta) -> Result<Self> {
        Ok(Self {
            id: meta.id,
            hash: meta.hash,
            absolute_url: meta.absolute_url.clone(),
            created_at: nanos(meta.created_at, "created at")?,
            last_synced_at: nanos(meta.last_synced_at, "last synced at")?,
        })
    }
}
impl TryFrom<MetaColumns> for EntityMeta {
    type Error = crate::error::Error;
    fn try_from(row: MetaColumns) -> Result<Self> {
        Ok(Self {
            id: row.id,
            hash: row.hash,
            absolute_url: row.absolute_url,
            created_at: from_nanos(row.created_at, "created at")?,
            last_synced_at: from_nanos(row.last_synced_at, "last synced at")?,
        })
    }
}

pub(crate) fn timestamp(value: i64, field: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(value).or_raise(|| ErrorKind::InvalidData(field))
}

fn nanos(at: UtcDateTime, field: &'static str) -> Result<i64> {
    i64::try_from(at.unix_timestamp_nanos()).or_raise(|| ErrorKind::InvalidData(field))
}

fn from_nanos(value: i64, field: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp_nanos(i128::from(value)).or_raise(|| ErrorKind::InvalidData(field))
}

pub(crate) fn signed(value: Option<u64>, field: &'static str) -> Result<Option<i64>> {
    value.map(|v| i64::try_from(v).or_raise(|| ErrorKind::InvalidData(field))).transpose()
}

pub(crate) fn unsigned<T: TryFrom<i64>>(value: Option<i64>, field: &'static str) -> Result<Option<T>>
where
    T::Error: std::error::Error + Send + Sync + 'static,
{
    value.map(|v| T::try_from(v).or_raise(|| ErrorKind::InvalidData(field))).transpose()
}
