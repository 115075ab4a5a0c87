use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::application::errors::AppError;
use crate::domain::ids::{ImageId, PromptId};
use crate::domain::repositories::{ImageRepository, VoteRepository};
use crate::domain::votes::{NewVote, Vote, VoteMetadata};

/// A vote as submitted by the request layer: anonymized image references
/// only, model labels are resolved server-side.
#[derive(Debug)]
pub struct VoteSubmission {
    pub prompt_id: PromptId,
    pub image_id: ImageId,
    pub shown_images: Vec<ImageId>,
    pub session_id: String,
    pub metadata: VoteMetadata,
}

#[derive(Clone)]
pub struct VoteService {
    images: Arc<dyn ImageRepository>,
    votes: Arc<dyn VoteRepository>,
}

impl VoteService {
    pub fn new(images: Arc<dyn ImageRepository>, votes: Arc<dyn VoteRepository>) -> Self {
        Self { images, votes }
    }

    /// Validates and persists one vote. The chosen image must belong to the
    /// prompt and be among the shown set.
    #[tracing::instrument(skip(self, submission))]
    pub async fn submit(&self, submission: VoteSubmission) -> Result<Vote, AppError> {
        if submission.session_id.trim().is_empty() {
            return Err(AppError::validation("session_id must not be empty"));
        }
        if submission.shown_images.is_empty() {
            return Err(AppError::validation("shown_images must not be empty"));
        }
        let distinct: BTreeSet<ImageId> = submission.shown_images.iter().copied().collect();
        if distinct.len() != submission.shown_images.len() {
            return Err(AppError::validation("shown_images contains duplicates"));
        }
        if !distinct.contains(&submission.image_id) {
            return Err(AppError::validation(
                "chosen image was not among the shown images",
            ));
        }

        let mut chosen_model = None;
        let mut shown_models = Vec::with_capacity(submission.shown_images.len());
        for image_id in &submission.shown_images {
            let image = self.images.get(*image_id).await.map_err(|err| match err {
                crate::domain::RepositoryError::NotFound => {
                    AppError::validation("unknown image in shown_images")
                }
                other => AppError::from(other),
            })?;
            if image.prompt_id != submission.prompt_id {
                return Err(AppError::validation(
                    "shown image does not belong to this prompt",
                ));
            }
            if image.id == submission.image_id {
                chosen_model = Some(image.model_name.clone());
            }
            shown_models.push(image.model_name);
        }

        let Some(chosen_model) = chosen_model else {
            // Unreachable given the membership check above, but don't panic
            // on a persistence-path invariant.
            return Err(AppError::internal("chosen image resolution failed"));
        };

        let vote = self
            .votes
            .insert(NewVote {
                prompt_id: submission.prompt_id,
                image_id: submission.image_id,
                chosen_model,
                shown_models,
                session_id: submission.session_id,
                metadata: submission.metadata,
                created_at: None,
            })
            .await?;

        info!(
            vote_id = %vote.id,
            prompt_id = %vote.prompt_id,
            model = %vote.chosen_model,
            "vote recorded"
        );

        Ok(vote)
    }
}
