use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    ImportRow, MetricsSnapshotRow, NewImport, NewPost, NewSnapshot, PostRow, RecomputeRunRow,
    RecomputeStatus, UserRow,
};
use crate::store::Store;

/// Postgres caps a statement at 65535 bind parameters; a snapshot row binds 11.
const SNAPSHOT_INSERT_CHUNK: usize = 5_000;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_user(&self, username: &str) -> Result<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE
            SET username = EXCLUDED.username
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert user '{username}'"))
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to look up user '{username}'"))
    }

    async fn insert_import(&self, import: NewImport) -> Result<ImportRow> {
        sqlx::query_as::<_, ImportRow>(
            r#"
            INSERT INTO imports (id, user_id, file_name, row_count, source)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(import.user_id)
        .bind(&import.file_name)
        .bind(import.row_count)
        .bind(&import.source)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create import record")
    }

    async fn upsert_post(&self, post: NewPost) -> Result<PostRow> {
        sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts
                (id, user_id, x_post_id, text, posted_at, char_count, word_count,
                 has_link, hashtag_count, mention_count, format_tag, has_media)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE)
            ON CONFLICT (x_post_id) DO UPDATE
            SET text = EXCLUDED.text,
                posted_at = EXCLUDED.posted_at,
                char_count = EXCLUDED.char_count,
                word_count = EXCLUDED.word_count,
                has_link = EXCLUDED.has_link,
                hashtag_count = EXCLUDED.hashtag_count,
                mention_count = EXCLUDED.mention_count,
                format_tag = EXCLUDED.format_tag,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.user_id)
        .bind(&post.x_post_id)
        .bind(&post.text)
        .bind(post.posted_at)
        .bind(post.char_count)
        .bind(post.word_count)
        .bind(post.has_link)
        .bind(post.hashtag_count)
        .bind(post.mention_count)
        .bind(&post.format_tag)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert post {}", post.x_post_id))
    }

    async fn insert_snapshots(&self, snapshots: &[NewSnapshot]) -> Result<u64> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0u64;
        for chunk in snapshots.chunks(SNAPSHOT_INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO metrics_snapshots \
                 (id, post_id, import_id, captured_at, likes, reposts, replies, quotes, \
                  impressions, engagement_rate, clicks) ",
            );
            builder.push_values(chunk, |mut row, s| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(s.post_id)
                    .push_bind(s.import_id)
                    .push_bind(s.captured_at)
                    .push_bind(s.likes)
                    .push_bind(s.reposts)
                    .push_bind(s.replies)
                    .push_bind(s.quotes)
                    .push_bind(s.impressions)
                    .push_bind(s.engagement_rate)
                    .push_bind(s.clicks);
            });
            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .context("Failed to insert metrics snapshots")?;
            written += result.rows_affected();
            debug!(chunk = chunk.len(), "Inserted snapshot chunk");
        }
        tx.commit().await?;

        info!("Inserted {written} metrics snapshots");
        Ok(written)
    }

    async fn start_recompute_run(&self) -> Result<RecomputeRunRow> {
        sqlx::query_as::<_, RecomputeRunRow>(
            "INSERT INTO recompute_runs (id, status) VALUES ($1, $2) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(RecomputeStatus::Started.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to record recompute start")
    }

    async fn finish_recompute_run(
        &self,
        run_id: Uuid,
        status: RecomputeStatus,
        error: Option<String>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE recompute_runs
            SET status = $1, error = $2, finished_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(error)
        .bind(run_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to record recompute run {run_id} as {status}"))?;
        Ok(())
    }

    async fn list_imports(&self, user_id: Uuid, limit: i64) -> Result<Vec<ImportRow>> {
        Ok(sqlx::query_as::<_, ImportRow>(
            "SELECT * FROM imports WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_post_snapshots(
        &self,
        x_post_id: &str,
    ) -> Result<Option<(PostRow, Vec<MetricsSnapshotRow>)>> {
        let post: Option<PostRow> =
            sqlx::query_as("SELECT * FROM posts WHERE x_post_id = $1")
                .bind(x_post_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(post) = post else {
            return Ok(None);
        };

        let snapshots = sqlx::query_as::<_, MetricsSnapshotRow>(
            "SELECT * FROM metrics_snapshots WHERE post_id = $1 ORDER BY captured_at ASC",
        )
        .bind(post.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((post, snapshots)))
    }

    async fn list_recompute_runs(&self, limit: i64) -> Result<Vec<RecomputeRunRow>> {
        Ok(sqlx::query_as::<_, RecomputeRunRow>(
            "SELECT * FROM recompute_runs ORDER BY started_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}
