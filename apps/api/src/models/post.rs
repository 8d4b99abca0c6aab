use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A post keyed by its external id. Re-imports overwrite text, derived
/// features and tag; there is no edit history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub x_post_id: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
    pub char_count: i32,
    pub word_count: i32,
    pub has_link: bool,
    pub hashtag_count: i32,
    pub mention_count: i32,
    pub format_tag: String,
    /// Not derivable from CSV; false on creation, never touched by upserts.
    pub has_media: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub x_post_id: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
    pub char_count: i32,
    pub word_count: i32,
    pub has_link: bool,
    pub hashtag_count: i32,
    pub mention_count: i32,
    pub format_tag: String,
}
