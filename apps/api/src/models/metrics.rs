use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Point-in-time metrics for one post, produced by one import.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MetricsSnapshotRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub import_id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub likes: i64,
    pub reposts: i64,
    pub replies: i64,
    pub quotes: i64,
    pub impressions: i64,
    pub engagement_rate: f64,
    pub clicks: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub post_id: Uuid,
    pub import_id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub likes: i64,
    pub reposts: i64,
    pub replies: i64,
    pub quotes: i64,
    pub impressions: i64,
    pub engagement_rate: f64,
    pub clicks: i64,
}
