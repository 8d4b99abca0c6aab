//! Import Orchestrator: persists a mapped CSV submission.
//!
//! Steps: gate the mapping, resolve the owner, open an Import record, then
//! walk the rows in fixed-size batches. Each batch is partitioned by
//! external post id: partitions upsert concurrently, rows sharing an id run
//! in input order so the last row wins deterministically. Snapshots from
//! every batch are written in one batch insert, then the recompute job runs.
//! Writes already flushed are not rolled back when a later step fails.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::ingest::classifier::FormatClassifier;
use crate::ingest::timestamps::parse_instant;
use crate::mapping::{validate, FieldMapping, MappedRow, SynonymTable};
use crate::models::{ImportRow, NewImport, NewPost, NewSnapshot};
use crate::recompute::{Recompute, RecomputeOutcome};
use crate::store::Store;

/// Substitutable pipeline defaults.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub batch_size: usize,
    /// Stored on every Import record.
    pub source: String,
    pub synonyms: SynonymTable,
    pub classifier: FormatClassifier,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            source: "csv".to_string(),
            synonyms: SynonymTable::default(),
            classifier: FormatClassifier::default(),
        }
    }
}

/// Resolved identity every import is attributed to.
#[derive(Debug, Clone)]
pub struct Owner {
    pub username: String,
}

/// `{ success: true, importId, snapshotCount, recompute }` or
/// `{ success: false, error }` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImportOutcome {
    #[serde(rename_all = "camelCase")]
    Completed {
        success: bool,
        import_id: Uuid,
        snapshot_count: usize,
        recompute: RecomputeOutcome,
    },
    Failed { success: bool, error: String },
}

impl ImportOutcome {
    fn failed(error: impl Into<String>) -> Self {
        ImportOutcome::Failed {
            success: false,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImportOutcome::Completed { .. })
    }
}

/// A row that passed the skip checks, ready to persist.
struct AcceptedRow {
    index: usize,
    post: NewPost,
    metrics: MappedRow,
}

pub struct ImportOrchestrator {
    store: Arc<dyn Store>,
    recompute: Arc<dyn Recompute>,
    owner: Owner,
    settings: Arc<ImportSettings>,
}

impl ImportOrchestrator {
    pub fn new(
        store: Arc<dyn Store>,
        recompute: Arc<dyn Recompute>,
        owner: Owner,
        settings: Arc<ImportSettings>,
    ) -> Self {
        Self {
            store,
            recompute,
            owner,
            settings,
        }
    }

    /// Runs the whole import. Never returns an error: every failure is
    /// folded into [`ImportOutcome::Failed`] with a single message.
    pub async fn import(
        &self,
        file_name: Option<String>,
        mapping: &FieldMapping,
        rows: Vec<MappedRow>,
    ) -> ImportOutcome {
        let validation = validate(mapping);
        if !validation.is_submittable() {
            debug!(?validation, "Rejected import mapping");
            return ImportOutcome::failed(validation.failure_message().unwrap_or_default());
        }

        match self.run(file_name, rows).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Import failed: {e:#}");
                ImportOutcome::failed(format!("{e:#}"))
            }
        }
    }

    async fn run(&self, file_name: Option<String>, rows: Vec<MappedRow>) -> Result<ImportOutcome> {
        let user = self
            .store
            .upsert_user(&self.owner.username)
            .await
            .context("Failed to resolve import owner")?;

        let row_count = i32::try_from(rows.len()).context("Too many rows in one import")?;
        let import = self
            .store
            .insert_import(NewImport {
                user_id: user.id,
                file_name,
                row_count,
                source: self.settings.source.clone(),
            })
            .await?;
        info!(import_id = %import.id, rows = row_count, "Import started");

        let batch_size = self.settings.batch_size.max(1);
        let mut snapshots: Vec<(usize, NewSnapshot)> = Vec::with_capacity(rows.len());
        for (batch_no, batch) in rows.chunks(batch_size).enumerate() {
            let offset = batch_no * batch_size;
            let accepted: Vec<AcceptedRow> = batch
                .iter()
                .enumerate()
                .filter_map(|(i, row)| self.accept(offset + i, row, user.id))
                .collect();
            debug!(
                import_id = %import.id,
                batch = batch_no,
                accepted = accepted.len(),
                "Processing batch"
            );

            let partitions = partition_by_post_id(accepted);
            let results = join_all(
                partitions
                    .into_iter()
                    .map(|partition| self.upsert_partition(partition, &import)),
            )
            .await;
            for result in results {
                snapshots.extend(result?);
            }
        }

        snapshots.sort_by_key(|(index, _)| *index);
        let snapshots: Vec<NewSnapshot> = snapshots.into_iter().map(|(_, s)| s).collect();
        self.store
            .insert_snapshots(&snapshots)
            .await
            .with_context(|| format!("Failed to store snapshots for import {}", import.id))?;
        info!(
            import_id = %import.id,
            snapshots = snapshots.len(),
            "Import committed"
        );

        let recompute = self.recompute.run().await;
        if !recompute.is_success() {
            warn!(import_id = %import.id, ?recompute, "Recompute failed after import");
        }

        Ok(ImportOutcome::Completed {
            success: true,
            import_id: import.id,
            snapshot_count: snapshots.len(),
            recompute,
        })
    }

    /// Applies the row skip rules: no post id, no createdAt, or a createdAt
    /// that is not a valid instant. Blank strings count as absent.
    fn accept(&self, index: usize, row: &MappedRow, user_id: Uuid) -> Option<AcceptedRow> {
        let (Some(x_post_id), Some(created_at)) =
            (non_blank(&row.post_id), non_blank(&row.created_at))
        else {
            debug!(row = index, "Skipping row without post id or createdAt");
            return None;
        };
        let Some(posted_at) = parse_instant(created_at) else {
            debug!(row = index, created_at = %created_at, "Skipping row with invalid createdAt");
            return None;
        };

        let text = row.text.clone().unwrap_or_default();
        let features = self.settings.classifier.analyze(&text);
        Some(AcceptedRow {
            index,
            post: NewPost {
                user_id,
                x_post_id: x_post_id.to_string(),
                text,
                posted_at,
                char_count: saturating_i32(features.char_count),
                word_count: saturating_i32(features.word_count),
                has_link: features.has_link,
                hashtag_count: saturating_i32(features.hashtag_count),
                mention_count: saturating_i32(features.mention_count),
                format_tag: features.format_tag,
            },
            metrics: row.clone(),
        })
    }

    async fn upsert_partition(
        &self,
        partition: Vec<AcceptedRow>,
        import: &ImportRow,
    ) -> Result<Vec<(usize, NewSnapshot)>> {
        let mut out = Vec::with_capacity(partition.len());
        for row in partition {
            let post = self.store.upsert_post(row.post).await?;
            out.push((
                row.index,
                snapshot_for(&row.metrics, post.id, import.id, import.created_at),
            ));
        }
        Ok(out)
    }
}

/// Groups rows by external id, keeping first-appearance order of ids and
/// input order within each group.
fn partition_by_post_id(rows: Vec<AcceptedRow>) -> Vec<Vec<AcceptedRow>> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut partitions: Vec<Vec<AcceptedRow>> = Vec::new();
    for row in rows {
        match slots.get(&row.post.x_post_id) {
            Some(&slot) => partitions[slot].push(row),
            None => {
                slots.insert(row.post.x_post_id.clone(), partitions.len());
                partitions.push(vec![row]);
            }
        }
    }
    partitions
}

/// Missing metrics are stored as 0. Count metrics round to whole numbers.
fn snapshot_for(
    metrics: &MappedRow,
    post_id: Uuid,
    import_id: Uuid,
    captured_at: DateTime<Utc>,
) -> NewSnapshot {
    let count = |v: Option<f64>| v.map(|n| n.round() as i64).unwrap_or(0);
    NewSnapshot {
        post_id,
        import_id,
        captured_at,
        likes: count(metrics.likes),
        reposts: count(metrics.reposts),
        replies: count(metrics.replies),
        quotes: count(metrics.quotes),
        impressions: count(metrics.impressions),
        engagement_rate: metrics.engagement_rate.unwrap_or(0.0),
        clicks: count(metrics.clicks),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
