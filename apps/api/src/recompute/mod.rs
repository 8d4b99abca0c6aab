//! Recompute collaborator: invoked once per import after the import is
//! committed. Every invocation leaves an audit row that moves
//! STARTED -> SUCCESS | FAILED.
//!
//! The work step is an [`AggregateJob`]. No aggregates exist yet, so the
//! default job is a no-op bracketed by audit records.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::RecomputeStatus;
use crate::store::Store;

/// `{ success: true, runId }` or `{ success: false, error }` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecomputeOutcome {
    #[serde(rename_all = "camelCase")]
    Completed { success: bool, run_id: Uuid },
    Failed { success: bool, error: String },
}

impl RecomputeOutcome {
    pub fn completed(run_id: Uuid) -> Self {
        RecomputeOutcome::Completed {
            success: true,
            run_id,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        RecomputeOutcome::Failed {
            success: false,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RecomputeOutcome::Completed { .. })
    }
}

/// Swap implementations without touching the import pipeline.
#[async_trait]
pub trait Recompute: Send + Sync {
    async fn run(&self) -> RecomputeOutcome;
}

/// The unit of work a recompute run performs. An error marks the run FAILED.
#[async_trait]
pub trait AggregateJob: Send + Sync {
    async fn recompute(&self, run_id: Uuid) -> Result<()>;
}

/// Placeholder job until dashboard aggregates exist.
pub struct NoopAggregates;

#[async_trait]
impl AggregateJob for NoopAggregates {
    async fn recompute(&self, _run_id: Uuid) -> Result<()> {
        Ok(())
    }
}

/// Default recompute job: audit-logged through the store.
pub struct AuditedRecompute {
    store: Arc<dyn Store>,
    job: Arc<dyn AggregateJob>,
}

impl AuditedRecompute {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_job(store, Arc::new(NoopAggregates))
    }

    pub fn with_job(store: Arc<dyn Store>, job: Arc<dyn AggregateJob>) -> Self {
        Self { store, job }
    }
}

#[async_trait]
impl Recompute for AuditedRecompute {
    async fn run(&self) -> RecomputeOutcome {
        let run = match self.store.start_recompute_run().await {
            Ok(run) => run,
            Err(e) => {
                warn!("Recompute could not start: {e:#}");
                return RecomputeOutcome::failed(format!("{e:#}"));
            }
        };
        info!(run_id = %run.id, "Recompute started");

        let (status, error) = match self.job.recompute(run.id).await {
            Ok(()) => (RecomputeStatus::Success, None),
            Err(e) => (RecomputeStatus::Failed, Some(format!("{e:#}"))),
        };

        if let Err(e) = self
            .store
            .finish_recompute_run(run.id, status, error.clone())
            .await
        {
            warn!(run_id = %run.id, "Recompute status not recorded: {e:#}");
            return RecomputeOutcome::failed(format!("{e:#}"));
        }

        match error {
            None => {
                info!(run_id = %run.id, "Recompute finished");
                RecomputeOutcome::completed(run.id)
            }
            Some(message) => {
                warn!(run_id = %run.id, "Recompute failed: {message}");
                RecomputeOutcome::failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_run_records_started_then_success() {
        let store = Arc::new(MemoryStore::new());
        let job = AuditedRecompute::new(store.clone());

        let outcome = job.run().await;
        let RecomputeOutcome::Completed { run_id, .. } = outcome else {
            panic!("expected success, got {outcome:?}");
        };

        let runs = store.runs().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, run_id);
        assert_eq!(runs[0].status, "SUCCESS");
        assert!(runs[0].finished_at.is_some());
        assert!(runs[0].error.is_none());
    }

    #[tokio::test]
    async fn test_each_run_appends_an_audit_row() {
        let store = Arc::new(MemoryStore::new());
        let job = AuditedRecompute::new(store.clone());
        job.run().await;
        job.run().await;
        assert_eq!(store.runs().await.len(), 2);
    }

    struct BrokenAggregates;

    #[async_trait]
    impl AggregateJob for BrokenAggregates {
        async fn recompute(&self, _run_id: Uuid) -> Result<()> {
            anyhow::bail!("aggregate table locked")
        }
    }

    #[tokio::test]
    async fn test_failing_job_records_failed_run() {
        let store = Arc::new(MemoryStore::new());
        let job = AuditedRecompute::with_job(store.clone(), Arc::new(BrokenAggregates));

        let outcome = job.run().await;
        assert_eq!(outcome, RecomputeOutcome::failed("aggregate table locked"));

        let runs = store.runs().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, "FAILED");
        assert_eq!(runs[0].error.as_deref(), Some("aggregate table locked"));
        assert!(runs[0].finished_at.is_some());
    }

    #[tokio::test]
    async fn test_start_failure_reports_error() {
        let store = Arc::new(MemoryStore::new());
        store.fail_recompute_start.store(true, Ordering::SeqCst);
        let job = AuditedRecompute::new(store.clone());

        let outcome = job.run().await;
        assert!(!outcome.is_success());
        assert!(store.runs().await.is_empty());
    }

    #[test]
    fn test_outcome_wire_shape() {
        let id = Uuid::new_v4();
        let ok = serde_json::to_value(RecomputeOutcome::completed(id)).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["runId"], id.to_string());

        let err = serde_json::to_value(RecomputeOutcome::failed("boom")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "boom");
    }
}
