//! Persistence collaborator.
//!
//! `Store` is the narrow datastore interface the import pipeline and the
//! recompute job talk to. `AppState` carries it as `Arc<dyn Store>`;
//! production uses [`PgStore`], tests use the in-memory store.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    ImportRow, MetricsSnapshotRow, NewImport, NewPost, NewSnapshot, PostRow, RecomputeRunRow,
    RecomputeStatus, UserRow,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the user with `username`, creating it on first use.
    async fn upsert_user(&self, username: &str) -> Result<UserRow>;

    /// Read-only lookup; `None` until the first import creates the user.
    async fn find_user(&self, username: &str) -> Result<Option<UserRow>>;

    async fn insert_import(&self, import: NewImport) -> Result<ImportRow>;

    /// Inserts or overwrites the post keyed by `x_post_id`. Creation sets
    /// `has_media = false`; conflicts keep it.
    async fn upsert_post(&self, post: NewPost) -> Result<PostRow>;

    /// Persists all snapshots of an import in one write. Returns rows written.
    async fn insert_snapshots(&self, snapshots: &[NewSnapshot]) -> Result<u64>;

    async fn start_recompute_run(&self) -> Result<RecomputeRunRow>;

    async fn finish_recompute_run(
        &self,
        run_id: Uuid,
        status: RecomputeStatus,
        error: Option<String>,
    ) -> Result<()>;

    /// Newest first.
    async fn list_imports(&self, user_id: Uuid, limit: i64) -> Result<Vec<ImportRow>>;

    /// The post and its snapshots, oldest first. `None` for unknown ids.
    async fn list_post_snapshots(
        &self,
        x_post_id: &str,
    ) -> Result<Option<(PostRow, Vec<MetricsSnapshotRow>)>>;

    /// Newest first.
    async fn list_recompute_runs(&self, limit: i64) -> Result<Vec<RecomputeRunRow>>;
}
