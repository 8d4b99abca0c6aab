use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::fields::{FieldKey, FieldMapping};

/// One CSV data row keyed by header, as produced by the parser.
pub type RawRow = BTreeMap<String, String>;

/// A CSV row typed against the canonical schema. Transient: only the posts
/// and snapshots derived from it are persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedRow {
    pub post_id: Option<String>,
    pub text: Option<String>,
    pub created_at: Option<String>,
    pub likes: Option<f64>,
    pub reposts: Option<f64>,
    pub replies: Option<f64>,
    pub quotes: Option<f64>,
    pub impressions: Option<f64>,
    pub engagement_rate: Option<f64>,
    pub clicks: Option<f64>,
}

/// Types one raw row through the confirmed mapping. Total: unmapped fields,
/// missing cells, blank cells and uncoercible numbers all become `None`.
pub fn map_row(raw: &RawRow, mapping: &FieldMapping) -> MappedRow {
    let string = |key: FieldKey| cell(raw, mapping, key).map(str::to_string);
    let number = |key: FieldKey| cell(raw, mapping, key).and_then(coerce_number);

    MappedRow {
        post_id: string(FieldKey::PostId),
        text: string(FieldKey::Text),
        created_at: string(FieldKey::CreatedAt),
        likes: number(FieldKey::Likes),
        reposts: number(FieldKey::Reposts),
        replies: number(FieldKey::Replies),
        quotes: number(FieldKey::Quotes),
        impressions: number(FieldKey::Impressions),
        engagement_rate: number(FieldKey::EngagementRate),
        clicks: number(FieldKey::Clicks),
    }
}

fn cell<'a>(raw: &'a RawRow, mapping: &FieldMapping, key: FieldKey) -> Option<&'a str> {
    let header = mapping.get(key)?;
    raw.get(header).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Strips thousands separators and percent signs, then parses a finite
/// decimal. `"12.3%"` is `12.3`, not `0.123`.
pub fn coerce_number(value: &str) -> Option<f64> {
    let cleaned: String = value.chars().filter(|c| *c != ',' && *c != '%').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}
