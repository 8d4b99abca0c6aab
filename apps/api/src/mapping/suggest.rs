//! Field Suggester: proposes a CSV header for each canonical field from a
//! static synonym table.
//!
//! Matching runs in two passes per field:
//! 1. exact: a normalised header equals a synonym;
//! 2. fuzzy: a normalised header contains a synonym, or a synonym contains it.
//!
//! Within a pass the synonym list order outranks header order: the first
//! synonym that matches any header wins, and among headers matching that
//! synonym the earliest header wins. Suggestions are computed per field and
//! never deduplicated across fields; collisions surface in validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::fields::{FieldKey, FieldMapping};
use crate::mapping::normalize::normalize_header;

/// Ordered synonym phrases per canonical field. Phrases are already in
/// normalised form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymTable {
    entries: BTreeMap<FieldKey, Vec<String>>,
}

impl SynonymTable {
    pub fn new(entries: BTreeMap<FieldKey, Vec<String>>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, phrases)| {
                let phrases = phrases
                    .iter()
                    .map(|p| normalize_header(p))
                    .filter(|p| !p.is_empty())
                    .collect();
                (key, phrases)
            })
            .collect();
        Self { entries }
    }

    pub fn synonyms(&self, key: FieldKey) -> &[String] {
        self.entries.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        let table: [(FieldKey, &[&str]); 10] = [
            (
                FieldKey::PostId,
                &["post id", "tweet id", "id", "post url", "tweet permalink", "permalink"],
            ),
            (
                FieldKey::Text,
                &["text", "post text", "tweet text", "content", "body", "message"],
            ),
            (
                FieldKey::CreatedAt,
                &["created at", "date", "time", "timestamp", "posted at", "published at"],
            ),
            (FieldKey::Likes, &["likes", "like", "favorites", "favourites"]),
            (
                FieldKey::Reposts,
                &["reposts", "retweets", "repost", "retweet", "shares"],
            ),
            (FieldKey::Replies, &["replies", "reply", "comments"]),
            (FieldKey::Quotes, &["quotes", "quote tweets", "quote"]),
            (FieldKey::Impressions, &["impressions", "views", "reach"]),
            (
                FieldKey::EngagementRate,
                &["engagement rate", "engagement rate %", "engagement"],
            ),
            (FieldKey::Clicks, &["clicks", "link clicks", "url clicks", "click"]),
        ];

        Self::new(
            table
                .into_iter()
                .map(|(key, phrases)| (key, phrases.iter().map(|p| p.to_string()).collect()))
                .collect(),
        )
    }
}

/// Suggests the best-matching header for one field, or `None`.
/// The returned value is always one of `headers`, verbatim.
pub fn suggest(table: &SynonymTable, key: FieldKey, headers: &[String]) -> Option<String> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    suggest_normalized(table.synonyms(key), headers, &normalized)
}

/// Runs [`suggest`] independently for every canonical field.
pub fn suggest_mapping(table: &SynonymTable, headers: &[String]) -> FieldMapping {
    let mut mapping = FieldMapping::default();
    for key in FieldKey::ALL {
        mapping.set(key, suggest(table, key, headers));
    }
    mapping
}

fn suggest_normalized(
    synonyms: &[String],
    headers: &[String],
    normalized: &[String],
) -> Option<String> {
    let exact = |syn: &String, norm: &String| norm == syn;
    let fuzzy = |syn: &String, norm: &String| {
        !norm.is_empty() && (norm.contains(syn.as_str()) || syn.contains(norm.as_str()))
    };

    first_match(synonyms, headers, normalized, exact)
        .or_else(|| first_match(synonyms, headers, normalized, fuzzy))
}

fn first_match<F>(
    synonyms: &[String],
    headers: &[String],
    normalized: &[String],
    matches: F,
) -> Option<String>
where
    F: Fn(&String, &String) -> bool,
{
    synonyms.iter().find_map(|syn| {
        normalized
            .iter()
            .position(|norm| matches(syn, norm))
            .map(|idx| headers[idx].clone())
    })
}
