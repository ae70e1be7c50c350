use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use crate::db::DbConnection;
use crate::storage::traits::{DiaryPostStorage, NewDiaryPost, PostPage};
use shared::DiaryPost;

/// SQLite-backed diary post repository
#[derive(Clone)]
pub struct SqliteDiaryPostRepository {
    db: DbConnection,
}

impl SqliteDiaryPostRepository {
    /// Create a new SQLite diary post repository
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_post(row: &SqliteRow) -> Result<DiaryPost> {
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(DiaryPost {
            id: row.try_get("id")?,
            panda_name: row.try_get("panda_name")?,
            comment: row.try_get("comment")?,
            image_filename: row.try_get("image_filename")?,
            created_at,
        })
    }

    fn rows_to_posts(rows: Vec<SqliteRow>) -> Result<Vec<DiaryPost>> {
        rows.iter().map(Self::row_to_post).collect()
    }

    fn offset(page: u32, size: u32) -> i64 {
        i64::from(page) * i64::from(size)
    }
}

#[async_trait]
impl DiaryPostStorage for SqliteDiaryPostRepository {
    async fn save(&self, post: &NewDiaryPost) -> Result<DiaryPost> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO diary_posts (panda_name, comment, image_filename, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&post.panda_name)
        .bind(&post.comment)
        .bind(&post.image_filename)
        .bind(created_at)
        .execute(self.db.pool())
        .await?;

        let id = result.last_insert_rowid();
        debug!("stored diary post {} for {}", id, post.panda_name);

        Ok(DiaryPost {
            id,
            panda_name: post.panda_name.clone(),
            comment: post.comment.clone(),
            image_filename: post.image_filename.clone(),
            created_at,
        })
    }

    async fn find_all(&self, page: u32, size: u32) -> Result<PostPage> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM diary_posts")
            .fetch_one(self.db.pool())
            .await?;

        let rows = sqlx::query(
            "SELECT id, panda_name, comment, image_filename, created_at
             FROM diary_posts
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(i64::from(size))
        .bind(Self::offset(page, size))
        .fetch_all(self.db.pool())
        .await?;

        Ok(PostPage { posts: Self::rows_to_posts(rows)?, total })
    }

    async fn find_by_panda_name(&self, name: &str, page: u32, size: u32) -> Result<PostPage> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM diary_posts WHERE panda_name = ?")
            .bind(name)
            .fetch_one(self.db.pool())
            .await?;

        let rows = sqlx::query(
            "SELECT id, panda_name, comment, image_filename, created_at
             FROM diary_posts
             WHERE panda_name = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(name)
        .bind(i64::from(size))
        .bind(Self::offset(page, size))
        .fetch_all(self.db.pool())
        .await?;

        Ok(PostPage { posts: Self::rows_to_posts(rows)?, total })
    }

    async fn find_by_panda_name_containing_ignore_case(&self, q: &str, page: u32, size: u32) -> Result<PostPage> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM diary_posts WHERE lower(panda_name) LIKE '%' || lower(?) || '%'",
        )
        .bind(q)
        .fetch_one(self.db.pool())
        .await?;

        let rows = sqlx::query(
            "SELECT id, panda_name, comment, image_filename, created_at
             FROM diary_posts
             WHERE lower(panda_name) LIKE '%' || lower(?) || '%'
             ORDER BY created_at DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(q)
        .bind(i64::from(size))
        .bind(Self::offset(page, size))
        .fetch_all(self.db.pool())
        .await?;

        Ok(PostPage { posts: Self::rows_to_posts(rows)?, total })
    }
}
