use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecomputeStatus {
    Started,
    Success,
    Failed,
}

impl RecomputeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecomputeStatus::Started => "STARTED",
            RecomputeStatus::Success => "SUCCESS",
            RecomputeStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RecomputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record of one recompute invocation.
/// `status` is stored as text; see [`RecomputeStatus::as_str`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecomputeRunRow {
    pub id: Uuid,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}
