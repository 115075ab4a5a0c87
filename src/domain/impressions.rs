use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ImageId, ImpressionId, PromptId};

/// One observed-selection event, kept for auditability. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Impression {
    pub id: ImpressionId,
    pub prompt_id: PromptId,
    pub image_id: ImageId,
    pub model_name: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewImpression {
    pub prompt_id: PromptId,
    pub image_id: ImageId,
    pub model_name: String,
    pub occurred_at: DateTime<Utc>,
}
