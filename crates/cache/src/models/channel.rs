use crate::entity::ChannelEntity;
use crate::error::Error;
use crate::models::{MetaColumns, signed, unsigned};

#[derive(sqlx::FromRow)]
pub(crate) struct ChannelRow {
    #[sqlx(flatten)]
    pub(crate) meta: MetaColumns,
    pub(crate) channel_id: Option<String>,
    pub(crate) handle: Option<String>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) subscriber_count: Option<i64>,
    pub(crate) is_verified: bool,
    pub(crate) has_details: bool,
}
impl TryFrom<&ChannelEntity> for ChannelRow {
    type Error = Error;
    fn try_from(channel: &ChannelEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: MetaColumns::try_from(&channel.meta)?,
            channel_id: channel.channel_id.clone(),
            handle: channel.handle.clone(),
            name: channel.name.clone(),
            description: channel.description.clone(),
            subscriber_count: signed(channel.subscriber_count, "subscriber count")?,
            is_verified: channel.is_verified,
            has_details: channel.has_details,
        })
    }
}
impl TryFrom<ChannelRow> for ChannelEntity {
    type Error = Error;
    fn try_from(row: ChannelRow) -> Result<Self, Self::Error> {
        Ok(Self {
            meta: row.meta.try_into()?,
            channel_id: row.channel_id,
            handle: row.handle,
            name: row.name,
            description: row.description,
            subscriber_count: unsigned(row.subscriber_count, "subscriber count")?,
            is_verified: row.is_verified,
            has_details: row.has_details,
        })
    }
}
