use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ImageId, PromptId};

/// One model-generated image competing under a prompt.
///
/// The model label is the information hidden from end users; it must never
/// leak through candidate payloads or image URLs. The impression count only
/// ever increases, by exactly 1 per selection event the image participates in,
/// and is mutated exclusively by the selection engine's accounting step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCandidate {
    pub id: ImageId,
    pub prompt_id: PromptId,
    pub model_name: String,
    pub image_path: String,
    pub impression_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewImage {
    pub prompt_id: PromptId,
    pub model_name: String,
    pub image_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewImage {
    pub fn normalize(mut self) -> Self {
        self.model_name = self.model_name.trim().to_string();
        self.image_path = self.image_path.trim().to_string();
        self
    }
}
