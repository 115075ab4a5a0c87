use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::PromptId;

/// Minimum number of images a prompt must own before it is shown for voting.
pub const MIN_DISPLAY_IMAGES: usize = 4;

/// A text challenge shared by all competing models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    pub slug: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrompt {
    pub slug: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewPrompt {
    pub fn normalize(mut self) -> Self {
        self.slug = self.slug.trim().to_string();
        self.text = self.text.trim().to_string();
        self
    }
}
