use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One CSV submission. Immutable after creation; its `created_at` is the
/// capture time of every snapshot it produced.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ImportRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: Option<String>,
    pub row_count: i32,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewImport {
    pub user_id: Uuid,
    pub file_name: Option<String>,
    pub row_count: i32,
    pub source: String,
}
