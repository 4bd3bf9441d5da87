//! SQLite storage gateway.
//!
//! Lookups go through `json_each` so a whole hash set is one query no matter
//! how large it is. Commits run in a single transaction: new rows are
//! inserted first so that junction rows can be linked by hash afterwards.

use async_trait::async_trait;
use exn::ResultExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, instrument};

use crate::Database;
use crate::association::AssociationKind;
use crate::entity::{CacheEntity, CaptionEntity, ChannelEntity, EntityKind, ImageEntity, StreamEntity, VideoEntity};
use crate::error::{ErrorKind, Result};
use crate::gateway::{CommitReceipt, StorageGateway};
use crate::models::{CaptionRow, ChannelRow, ImageRow, StreamRow, VideoRow};
use crate::result::CacheStatus;
use crate::session::UnitOfWork;

/// Repository for every entity table and junction table in the cache
/// database.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            dry_run: false,
        }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool. A dry-run
    /// repository reads normally and commits nothing.
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    /// Number of stored rows of `kind`.
    pub async fn count(&self, kind: EntityKind) -> Result<i64> {
        let query = format!("SELECT COUNT(*) FROM {}", kind.table());
        sqlx::query_scalar::<_, i64>(&query).fetch_one(&self.pool).await.or_raise(|| ErrorKind::Database)
    }

    /// Number of stored junction rows of `kind`.
    pub async fn count_associations(&self, kind: AssociationKind) -> Result<i64> {
        let query = format!("SELECT COUNT(*) FROM {}", kind.table());
        sqlx::query_scalar::<_, i64>(&query).fetch_one(&self.pool).await.or_raise(|| ErrorKind::Database)
    }

    async fn fetch_rows<R>(&self, query: &'static str, hashes: &str) -> Result<Vec<R>>
    where
        R: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
    {
        sqlx::query_as(query)
            .bind(hashes)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }
}

#[async_trait]
impl StorageGateway for Repository {
    #[instrument(skip_all, fields(kind = %kind, hashes = hashes.len()))]
    async fn fetch_by_hashes(&self, kind: EntityKind, hashes: &[i64]) -> Result<Vec<CacheEntity>> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }
        let hashes = serde_json::to_string(hashes).or_raise(|| ErrorKind::InvalidData("hash set"))?;
        let entities = match kind {
            EntityKind::Video => self
                .fetch_rows::<VideoRow>(include_str!("../queries/fetch_videos.sql"), &hashes)
                .await?
                .into_iter()
                .map(|row| VideoEntity::try_from(row).map(CacheEntity::Video))
                .collect::<Result<Vec<_>>>()?,
            EntityKind::Channel => self
                .fetch_rows::<ChannelRow>(include_str!("../queries/fetch_channels.sql"), &hashes)
                .await?
                .into_iter()
                .map(|row| ChannelEntity::try_from(row).map(CacheEntity::Channel))
                .collect::<Result<Vec<_>>>()?,
            EntityKind::Image => self
                .fetch_rows::<ImageRow>(include_str!("../queries/fetch_images.sql"), &hashes)
                .await?
                .into_iter()
                .map(|row| ImageEntity::try_from(row).map(CacheEntity::Image))
                .collect::<Result<Vec<_>>>()?,
            EntityKind::Stream => self
                .fetch_rows::<StreamRow>(include_str!("../queries/fetch_streams.sql"), &hashes)
                .await?
                .into_iter()
                .map(|row| StreamEntity::try_from(row).map(CacheEntity::Stream))
                .collect::<Result<Vec<_>>>()?,
            EntityKind::Caption => self
                .fetch_rows::<CaptionRow>(include_str!("../queries/fetch_captions.sql"), &hashes)
                .await?
                .into_iter()
                .map(|row| CaptionEntity::try_from(row).map(CacheEntity::Caption))
                .collect::<Result<Vec<_>>>()?,
        };
        debug!(found = entities.len(), "fetched stored entities");
        Ok(entities)
    }

    #[instrument(skip_all, fields(dry_run = self.dry_run))]
    async fn commit(&self, uow: UnitOfWork) -> Result<CommitReceipt> {
        let mut receipt = CommitReceipt::default();
        if self.dry_run || uow.is_empty() {
            return Ok(receipt);
        }
        let (entries, associations) = uow.into_parts();
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for (entity, status) in &entries {
            match status {
                CacheStatus::New => {
                    let id = insert(&mut tx, entity).await?;
                    receipt.inserted.insert(entity.key(), id);
                },
                CacheStatus::Updated => {
                    update(&mut tx, entity).await?;
                    receipt.updated += 1;
                },
                CacheStatus::Existed | CacheStatus::Error => {},
            }
        }
        for row in &associations {
            let linked = sqlx::query(link_query(row.kind))
                .bind(row.owner_hash)
                .bind(row.child_hash)
                .execute(&mut *tx)
                .await;
            receipt.associations += write(linked)?.rows_affected();
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        debug!(
            inserted = receipt.inserted(),
            updated = receipt.updated(),
            associations = receipt.associations(),
            "committed unit of work"
        );
        Ok(receipt)
    }
}

/// Unique violations are the caller's problem, anything else is the database's.
fn write<T>(result: sqlx::Result<T>) -> Result<T> {
    let constraint = matches!(&result, Err(sqlx::Error::Database(e)) if e.is_unique_violation());
    result.or_raise(|| match constraint {
        true => ErrorKind::Constraint,
        false => ErrorKind::Database,
    })
}

fn link_query(kind: AssociationKind) -> &'static str {
    match kind {
        AssociationKind::ChannelAvatar => include_str!("../queries/link_channel_avatars.sql"),
        AssociationKind::ChannelBanner => include_str!("../queries/link_channel_banners.sql"),
        AssociationKind::VideoThumbnail => include_str!("../queries/link_video_thumbnails.sql"),
        AssociationKind::VideoStream => include_str!("../queries/link_video_streams.sql"),
        AssociationKind::VideoCaption => include_str!("../queries/link_video_captions.sql"),
    }
}

async fn insert(conn: &mut SqliteConnection, entity: &CacheEntity) -> Result<i64> {
    let inserted = match entity {
        CacheEntity::Video(video) => {
            let row = VideoRow::try_from(video)?;
            sqlx::query_scalar::<_, i64>(include_str!("../queries/insert_video.sql"))
                .bind(row.meta.hash)
                .bind(row.meta.absolute_url)
                .bind(row.meta.created_at)
                .bind(row.meta.last_synced_at)
                .bind(row.video_id)
                .bind(row.title)
                .bind(row.description)
                .bind(row.channel_hash)
                .bind(row.author)
                .bind(row.length_seconds)
                .bind(row.view_count)
                .bind(row.like_count)
                .bind(row.published_at)
                .bind(row.is_live)
                .bind(row.is_upcoming)
                .bind(row.has_details)
                .fetch_one(&mut *conn)
                .await
        },
        CacheEntity::Channel(channel) => {
            let row = ChannelRow::try_from(channel)?;
            sqlx::query_scalar::<_, i64>(include_str!("../queries/insert_channel.sql"))
                .bind(row.meta.hash)
                .bind(row.meta.absolute_url)
                .bind(row.meta.created_at)
                .bind(row.meta.last_synced_at)
                .bind(row.channel_id)
                .bind(row.handle)
                .bind(row.name)
                .bind(row.description)
                .bind(row.subscriber_count)
                .bind(row.is_verified)
                .bind(row.has_details)
                .fetch_one(&mut *conn)
                .await
        },
        CacheEntity::Image(image) => {
            let row = ImageRow::try_from(image)?;
            sqlx::query_scalar::<_, i64>(include_str!("../queries/insert_image.sql"))
                .bind(row.meta.hash)
                .bind(row.meta.absolute_url)
                .bind(row.meta.created_at)
                .bind(row.meta.last_synced_at)
                .bind(row.width)
                .bind(row.height)
                .bind(row.quality)
                .fetch_one(&mut *conn)
                .await
        },
        CacheEntity::Stream(stream) => {
            let row = StreamRow::try_from(stream)?;
            sqlx::query_scalar::<_, i64>(include_str!("../queries/insert_stream.sql"))
                .bind(row.meta.hash)
                .bind(row.meta.absolute_url)
                .bind(row.meta.created_at)
                .bind(row.meta.last_synced_at)
                .bind(row.video_id)
                .bind(row.itag)
                .bind(row.mime_type)
                .bind(row.bitrate)
                .bind(row.width)
                .bind(row.height)
                .bind(row.fps)
                .bind(row.quality_label)
                .bind(row.content_length)
                .bind(row.is_adaptive)
                .fetch_one(&mut *conn)
                .await
        },
        CacheEntity::Caption(caption) => {
            let row = CaptionRow::try_from(caption)?;
            sqlx::query_scalar::<_, i64>(include_str!("../queries/insert_caption.sql"))
                .bind(row.meta.hash)
                .bind(row.meta.absolute_url)
                .bind(row.meta.created_at)
                .bind(row.meta.last_synced_at)
                .bind(row.video_id)
                .bind(row.language_code)
                .bind(row.label)
                .bind(row.is_auto_generated)
                .fetch_one(&mut *conn)
                .await
        },
    };
    write(inserted)
}

async fn update(conn: &mut SqliteConnection, entity: &CacheEntity) -> Result<()> {
    if entity.id() == 0 {
        exn::bail!(ErrorKind::InvalidData("updated entity has no id"));
    }
    let updated = match entity {
        CacheEntity::Video(video) => {
            let row = VideoRow::try_from(video)?;
            sqlx::query(include_str!("../queries/update_video.sql"))
                .bind(row.meta.last_synced_at)
                .bind(row.title)
                .bind(row.description)
                .bind(row.channel_hash)
                .bind(row.author)
                .bind(row.length_seconds)
                .bind(row.view_count)
                .bind(row.like_count)
                .bind(row.published_at)
                .bind(row.is_live)
                .bind(row.is_upcoming)
                .bind(row.has_details)
                .bind(row.meta.id)
                .execute(&mut *conn)
                .await
        },
        CacheEntity::Channel(channel) => {
            let row = ChannelRow::try_from(channel)?;
            sqlx::query(include_str!("../queries/update_channel.sql"))
                .bind(row.meta.last_synced_at)
                .bind(row.channel_id)
                .bind(row.handle)
                .bind(row.name)
                .bind(row.description)
                .bind(row.subscriber_count)
                .bind(row.is_verified)
                .bind(row.has_details)
                .bind(row.meta.id)
                .execute(&mut *conn)
                .await
        },
        CacheEntity::Image(image) => {
            let row = ImageRow::try_from(image)?;
            sqlx::query(include_str!("../queries/update_image.sql"))
                .bind(row.meta.last_synced_at)
                .bind(row.width)
                .bind(row.height)
                .bind(row.quality)
                .bind(row.meta.id)
                .execute(&mut *conn)
                .await
        },
        CacheEntity::Stream(stream) => {
            let row = StreamRow::try_from(stream)?;
            sqlx::query(include_str!("../queries/update_stream.sql"))
                .bind(row.meta.last_synced_at)
                .bind(row.mime_type)
                .bind(row.bitrate)
                .bind(row.width)
                .bind(row.height)
                .bind(row.fps)
                .bind(row.quality_label)
                .bind(row.content_length)
                .bind(row.is_adaptive)
                .bind(row.meta.id)
                .execute(&mut *conn)
                .await
        },
        CacheEntity::Caption(caption) => {
            let row = CaptionRow::try_from(caption)?;
            sqlx::query(include_str!("../queries/update_caption.sql"))
                .bind(row.meta.last_synced_at)
                .bind(row.label)
                .bind(row.is_auto_generated)
                .bind(row.meta.id)
                .execute(&mut *conn)
                .await
        },
    };
    if write(updated)?.rows_affected() == 0 {
        exn::bail!(ErrorKind::InvalidData("updated entity is not stored"));
    }
    Ok(())
}
