use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::mapping::fields::{FieldKey, FieldMapping};

/// Result of the submission gate. Pure; never mutates the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingValidation {
    pub required_ok: bool,
    pub has_duplicates: bool,
}

impl MappingValidation {
    pub fn is_submittable(&self) -> bool {
        self.required_ok && !self.has_duplicates
    }

    /// User-facing reason the mapping is blocked, if it is.
    pub fn failure_message(&self) -> Option<String> {
        match (self.required_ok, self.has_duplicates) {
            (true, false) => None,
            (false, false) => Some(format!(
                "Map the required fields: {}",
                required_list()
            )),
            (true, true) => {
                Some("Each CSV column can be mapped to at most one field".to_string())
            }
            (false, true) => Some(format!(
                "Map the required fields ({}) and assign each CSV column to at most one field",
                required_list()
            )),
        }
    }
}

fn required_list() -> String {
    FieldKey::REQUIRED
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `required_ok`: postId, text and createdAt all have a chosen header.
/// `has_duplicates`: two or more fields point at the same header.
pub fn validate(mapping: &FieldMapping) -> MappingValidation {
    let required_ok = FieldKey::REQUIRED
        .iter()
        .all(|key| mapping.get(*key).is_some());

    let chosen: Vec<&str> = mapping.chosen_headers().map(|(_, h)| h).collect();
    let distinct: HashSet<&str> = chosen.iter().copied().collect();

    MappingValidation {
        required_ok,
        has_duplicates: distinct.len() < chosen.len(),
    }
}
