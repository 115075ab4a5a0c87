use std::sync::Arc;

use tracing::debug;

use crate::domain::RepositoryError;
use crate::domain::ids::PromptId;
use crate::domain::images::ImageCandidate;
use crate::domain::repositories::ImageRepository;
use crate::domain::selection::plan_selection;

/// Fair selection engine: picks the candidates to show for a prompt and
/// accounts for the choice.
///
/// The caller gates on "prompt owns enough images"; when fewer candidates
/// exist than requested, all of them are returned and still accounted for.
/// The returned list is already position-shuffled and its impression
/// increments are durable before this returns, so a result is never handed
/// out whose accounting did not complete.
#[derive(Clone)]
pub struct SelectionService {
    images: Arc<dyn ImageRepository>,
}

impl SelectionService {
    pub fn new(images: Arc<dyn ImageRepository>) -> Self {
        Self { images }
    }

    #[tracing::instrument(skip(self))]
    pub async fn select_fair_images(
        &self,
        prompt_id: PromptId,
        count: usize,
    ) -> Result<Vec<ImageCandidate>, RepositoryError> {
        let candidates = self.images.list_for_prompt(prompt_id).await?;
        let available = candidates.len();

        let selected = {
            let mut rng = rand::rng();
            plan_selection(candidates, count, &mut rng)
        };

        self.images.record_impressions(prompt_id, &selected).await?;

        debug!(
            available,
            selected = selected.len(),
            "fair selection recorded"
        );

        Ok(selected)
    }
}
