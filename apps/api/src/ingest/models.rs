use serde::{Deserialize, Serialize};

use crate::mapping::{FieldMapping, MappedRow, MappingValidation, RawRow};
use crate::models::{MetricsSnapshotRow, PostRow};

/// Submission boundary payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    pub mapping: FieldMapping,
    #[serde(default)]
    pub rows: Vec<MappedRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub file_name: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub suggested_mapping: FieldMapping,
    pub validation: MappingValidation,
    /// The first rows typed through the suggested mapping.
    pub preview: Vec<MappedRow>,
}

#[derive(Debug, Deserialize)]
pub struct MapRequest {
    pub mapping: FieldMapping,
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub validation: MappingValidation,
    pub rows: Vec<MappedRow>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn clamped(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 500)
    }
}

#[derive(Debug, Serialize)]
pub struct PostHistoryResponse {
    pub post: PostRow,
    pub snapshots: Vec<MetricsSnapshotRow>,
}
