use serde::{Deserialize, Deserializer, Serialize};

/// The canonical target schema. Every import maps onto exactly these keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    PostId,
    Text,
    CreatedAt,
    Likes,
    Reposts,
    Replies,
    Quotes,
    Impressions,
    EngagementRate,
    Clicks,
}

impl FieldKey {
    pub const ALL: [FieldKey; 10] = [
        FieldKey::PostId,
        FieldKey::Text,
        FieldKey::CreatedAt,
        FieldKey::Likes,
        FieldKey::Reposts,
        FieldKey::Replies,
        FieldKey::Quotes,
        FieldKey::Impressions,
        FieldKey::EngagementRate,
        FieldKey::Clicks,
    ];

    /// Fields that must be mapped before a submission is accepted.
    pub const REQUIRED: [FieldKey; 3] = [FieldKey::PostId, FieldKey::Text, FieldKey::CreatedAt];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::PostId => "postId",
            FieldKey::Text => "text",
            FieldKey::CreatedAt => "createdAt",
            FieldKey::Likes => "likes",
            FieldKey::Reposts => "reposts",
            FieldKey::Replies => "replies",
            FieldKey::Quotes => "quotes",
            FieldKey::Impressions => "impressions",
            FieldKey::EngagementRate => "engagementRate",
            FieldKey::Clicks => "clicks",
        }
    }
}

/// User-confirmed association from each canonical field to a CSV header.
/// `None` is the "ignore" choice; an empty string on the wire means the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub likes: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub reposts: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub replies: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quotes: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub impressions: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub engagement_rate: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub clicks: Option<String>,
}

impl FieldMapping {
    fn slot(&self, key: FieldKey) -> &Option<String> {
        match key {
            FieldKey::PostId => &self.post_id,
            FieldKey::Text => &self.text,
            FieldKey::CreatedAt => &self.created_at,
            FieldKey::Likes => &self.likes,
            FieldKey::Reposts => &self.reposts,
            FieldKey::Replies => &self.replies,
            FieldKey::Quotes => &self.quotes,
            FieldKey::Impressions => &self.impressions,
            FieldKey::EngagementRate => &self.engagement_rate,
            FieldKey::Clicks => &self.clicks,
        }
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut Option<String> {
        match key {
            FieldKey::PostId => &mut self.post_id,
            FieldKey::Text => &mut self.text,
            FieldKey::CreatedAt => &mut self.created_at,
            FieldKey::Likes => &mut self.likes,
            FieldKey::Reposts => &mut self.reposts,
            FieldKey::Replies => &mut self.replies,
            FieldKey::Quotes => &mut self.quotes,
            FieldKey::Impressions => &mut self.impressions,
            FieldKey::EngagementRate => &mut self.engagement_rate,
            FieldKey::Clicks => &mut self.clicks,
        }
    }

    /// The chosen header for `key`, treating blank strings as unmapped.
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.slot(key).as_deref().filter(|h| !h.is_empty())
    }

    pub fn set(&mut self, key: FieldKey, header: Option<String>) {
        *self.slot_mut(key) = header.filter(|h| !h.is_empty());
    }

    /// Chosen headers in canonical field order, unmapped fields skipped.
    pub fn chosen_headers(&self) -> impl Iterator<Item = (FieldKey, &str)> + '_ {
        FieldKey::ALL
            .into_iter()
            .filter_map(move |key| self.get(key).map(|h| (key, h)))
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
