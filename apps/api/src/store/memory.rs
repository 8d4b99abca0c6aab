//! In-memory `Store` used by the pipeline and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    ImportRow, MetricsSnapshotRow, NewImport, NewPost, NewSnapshot, PostRow, RecomputeRunRow,
    RecomputeStatus, UserRow,
};
use crate::store::Store;

#[derive(Default)]
struct Tables {
    users: Vec<UserRow>,
    imports: Vec<ImportRow>,
    posts: Vec<PostRow>,
    snapshots: Vec<MetricsSnapshotRow>,
    runs: Vec<RecomputeRunRow>,
    upsert_order: Vec<(String, String)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub fail_user_upsert: AtomicBool,
    pub fail_snapshot_insert: AtomicBool,
    pub fail_recompute_start: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn users(&self) -> Vec<UserRow> {
        self.tables.lock().await.users.clone()
    }

    pub async fn imports(&self) -> Vec<ImportRow> {
        self.tables.lock().await.imports.clone()
    }

    pub async fn posts(&self) -> Vec<PostRow> {
        self.tables.lock().await.posts.clone()
    }

    pub async fn snapshots(&self) -> Vec<MetricsSnapshotRow> {
        self.tables.lock().await.snapshots.clone()
    }

    pub async fn runs(&self) -> Vec<RecomputeRunRow> {
        self.tables.lock().await.runs.clone()
    }

    /// `(x_post_id, text)` of every post upsert, in the order they landed.
    pub async fn upsert_order(&self) -> Vec<(String, String)> {
        self.tables.lock().await.upsert_order.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_user(&self, username: &str) -> Result<UserRow> {
        if self.fail_user_upsert.load(Ordering::SeqCst) {
            bail!("connection refused");
        }
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.iter().find(|u| u.username == username) {
            return Ok(user.clone());
        }
        let user = UserRow {
            id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserRow>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_import(&self, import: NewImport) -> Result<ImportRow> {
        let row = ImportRow {
            id: Uuid::new_v4(),
            user_id: import.user_id,
            file_name: import.file_name,
            row_count: import.row_count,
            source: import.source,
            created_at: Utc::now(),
        };
        self.tables.lock().await.imports.push(row.clone());
        Ok(row)
    }

    async fn upsert_post(&self, post: NewPost) -> Result<PostRow> {
        // Yield so rows in one batch genuinely interleave.
        tokio::task::yield_now().await;

        let mut tables = self.tables.lock().await;
        tables
            .upsert_order
            .push((post.x_post_id.clone(), post.text.clone()));
        let now = Utc::now();
        if let Some(existing) = tables
            .posts
            .iter_mut()
            .find(|p| p.x_post_id == post.x_post_id)
        {
            existing.text = post.text;
            existing.posted_at = post.posted_at;
            existing.char_count = post.char_count;
            existing.word_count = post.word_count;
            existing.has_link = post.has_link;
            existing.hashtag_count = post.hashtag_count;
            existing.mention_count = post.mention_count;
            existing.format_tag = post.format_tag;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let row = PostRow {
            id: Uuid::new_v4(),
            user_id: post.user_id,
            x_post_id: post.x_post_id,
            text: post.text,
            posted_at: post.posted_at,
            char_count: post.char_count,
            word_count: post.word_count,
            has_link: post.has_link,
            hashtag_count: post.hashtag_count,
            mention_count: post.mention_count,
            format_tag: post.format_tag,
            has_media: false,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(row.clone());
        Ok(row)
    }

    async fn insert_snapshots(&self, snapshots: &[NewSnapshot]) -> Result<u64> {
        if self.fail_snapshot_insert.load(Ordering::SeqCst) {
            bail!("disk full");
        }
        let mut tables = self.tables.lock().await;
        for s in snapshots {
            tables.snapshots.push(MetricsSnapshotRow {
                id: Uuid::new_v4(),
                post_id: s.post_id,
                import_id: s.import_id,
                captured_at: s.captured_at,
                likes: s.likes,
                reposts: s.reposts,
                replies: s.replies,
                quotes: s.quotes,
                impressions: s.impressions,
                engagement_rate: s.engagement_rate,
                clicks: s.clicks,
            });
        }
        Ok(snapshots.len() as u64)
    }

    async fn start_recompute_run(&self) -> Result<RecomputeRunRow> {
        if self.fail_recompute_start.load(Ordering::SeqCst) {
            bail!("recompute_runs unavailable");
        }
        let run = RecomputeRunRow {
            id: Uuid::new_v4(),
            status: RecomputeStatus::Started.as_str().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        };
        self.tables.lock().await.runs.push(run.clone());
        Ok(run)
    }

    async fn finish_recompute_run(
        &self,
        run_id: Uuid,
        status: RecomputeStatus,
        error: Option<String>,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let Some(run) = tables.runs.iter_mut().find(|r| r.id == run_id) else {
            bail!("recompute run {run_id} not found");
        };
        run.status = status.as_str().to_string();
        run.error = error;
        run.finished_at = Some(Utc::now());
        Ok(())
    }

    async fn list_imports(&self, user_id: Uuid, limit: i64) -> Result<Vec<ImportRow>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .imports
            .iter()
            .rev()
            .filter(|i| i.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_post_snapshots(
        &self,
        x_post_id: &str,
    ) -> Result<Option<(PostRow, Vec<MetricsSnapshotRow>)>> {
        let tables = self.tables.lock().await;
        let Some(post) = tables.posts.iter().find(|p| p.x_post_id == x_post_id) else {
            return Ok(None);
        };
        let snapshots = tables
            .snapshots
            .iter()
            .filter(|s| s.post_id == post.id)
            .cloned()
            .collect();
        Ok(Some((post.clone(), snapshots)))
    }

    async fn list_recompute_runs(&self, limit: i64) -> Result<Vec<RecomputeRunRow>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .runs
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
