use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ImageId, PromptId, VoteId};

/// A recorded preference: which of the shown images the user picked.
///
/// `chosen_model` and `shown_models` are derived server-side from image ids
/// so clients only ever handle anonymized references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub prompt_id: PromptId,
    pub image_id: ImageId,
    pub chosen_model: String,
    pub shown_models: Vec<String>,
    pub session_id: String,
    pub metadata: VoteMetadata,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVote {
    pub prompt_id: PromptId,
    pub image_id: ImageId,
    pub chosen_model: String,
    pub shown_models: Vec<String>,
    pub session_id: String,
    pub metadata: VoteMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request-scoped context captured alongside a vote. All fields are
/// best-effort; a vote is valid without any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}
