//! Database operations for weibo-repost
//!
//! The repository reads candidate posts for a platform and records the
//! latest publish outcome per (post, platform) pair. SQLite runs in
//! autocommit mode, so every upsert is committed before the call
//! returns.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;
use tracing::info;

use crate::error::{Result, StorageError};
use crate::types::{PostStatus, PostStatusRecord, PublishOutcome, SocialPlatform, WeiboPost};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database at `db_path` and run migrations.
    pub async fn new(db_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StorageError::IoError)?;
        }

        // Forward slashes for the SQLite URL, mode=rwc to create the
        // file on first use.
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(StorageError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(StorageError::MigrationError)?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool. Used by tests running against
    /// `sqlite::memory:`.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Close the pool. The run holds exactly one pool, released here on
    /// every exit path.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Fetch one batch of posts still unpublished on `platform`.
    ///
    /// A post is eligible if it has no status row for the platform or
    /// the row's status is not `completed`, so failed posts stay in the
    /// queue for the next run. Eligible posts are ordered by publish
    /// time ascending and paginated with offset/limit:
    /// `offset = (batch_number - 1) * batch_size`.
    pub async fn fetch_candidates(
        &self,
        platform: SocialPlatform,
        batch_number: u32,
        batch_size: u32,
    ) -> Result<Vec<WeiboPost>> {
        // i64 before multiplying: a large --batch value must page empty,
        // not overflow u32.
        let offset = (batch_number.max(1) as i64 - 1) * batch_size as i64;

        info!(
            platform = platform.as_str(),
            batch_number, batch_size, offset, "fetching candidate posts"
        );

        let rows = sqlx::query(
            r#"
            SELECT w.id, w.content, w.original_pictures, w.publish_time
            FROM weibo w
            LEFT JOIN posts p ON w.id = p.weibo_id AND p.social_platform = ?
            WHERE p.status IS NULL OR p.status <> 'completed'
            ORDER BY w.publish_time ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(platform.as_str())
        .bind(batch_size as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::SqlxError)?;

        Ok(rows
            .iter()
            .map(|r| WeiboPost {
                id: r.get("id"),
                content: r.get("content"),
                original_pictures: r.get("original_pictures"),
                publish_time: r.get("publish_time"),
            })
            .collect())
    }

    /// Write or overwrite the status row for `(weibo_id, platform)`.
    ///
    /// The error column stays SQL NULL when the outcome has no error
    /// (never an empty string), and the timestamp is assigned by the
    /// database on every write. Only the latest outcome is kept.
    pub async fn upsert_status(
        &self,
        weibo_id: i64,
        platform: SocialPlatform,
        outcome: &PublishOutcome,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (weibo_id, social_platform, status, errors, timestamp)
            VALUES (?, ?, ?, ?, unixepoch())
            ON CONFLICT(weibo_id, social_platform) DO UPDATE SET
                status = excluded.status,
                errors = excluded.errors,
                timestamp = unixepoch()
            "#,
        )
        .bind(weibo_id)
        .bind(platform.as_str())
        .bind(outcome.status.as_str())
        .bind(outcome.error.as_deref().filter(|e| !e.is_empty()))
        .execute(&self.pool)
        .await
        .map_err(StorageError::SqlxError)?;

        Ok(())
    }

    /// Read back the latest recorded outcome for a (post, platform) pair.
    pub async fn status_for(
        &self,
        weibo_id: i64,
        platform: SocialPlatform,
    ) -> Result<Option<PostStatusRecord>> {
        let row = sqlx::query(
            r#"
            SELECT weibo_id, social_platform, status, errors, timestamp
            FROM posts
            WHERE weibo_id = ? AND social_platform = ?
            "#,
        )
        .bind(weibo_id)
        .bind(platform.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::SqlxError)?;

        Ok(row.map(|r| PostStatusRecord {
            weibo_id: r.get("weibo_id"),
            social_platform: r.get("social_platform"),
            status: PostStatus::parse(&r.get::<String, _>("status"))
                .unwrap_or(PostStatus::Failed),
            errors: r.get("errors"),
            timestamp: r.get("timestamp"),
        }))
    }

    /// Insert a post into the content table.
    ///
    /// The content table is owned by the upstream ingester; this exists
    /// for seeding test fixtures and ad-hoc imports.
    pub async fn insert_post(&self, post: &WeiboPost) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO weibo (id, content, original_pictures, publish_time)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(post.id)
        .bind(&post.content)
        .bind(&post.original_pictures)
        .bind(post.publish_time)
        .execute(&self.pool)
        .await
        .map_err(StorageError::SqlxError)?;

        Ok(())
    }
}
