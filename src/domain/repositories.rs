use async_trait::async_trait;

use crate::domain::RepositoryError;
use crate::domain::ids::{ImageId, PromptId, VoteId};
use crate::domain::images::{ImageCandidate, NewImage};
use crate::domain::impressions::Impression;
use crate::domain::prompts::{NewPrompt, Prompt};
use crate::domain::stats::{StatsFilter, StatsSummary};
use crate::domain::votes::{NewVote, Vote};

#[async_trait]
pub trait PromptRepository: Send + Sync {
    async fn insert(&self, prompt: NewPrompt) -> Result<Prompt, RepositoryError>;
    async fn get(&self, id: PromptId) -> Result<Prompt, RepositoryError>;
    async fn get_by_slug(&self, slug: &str) -> Result<Prompt, RepositoryError>;
    /// A uniformly random prompt owning at least `min_images` images,
    /// optionally excluding one slug. `NotFound` when no prompt qualifies.
    async fn random_eligible(
        &self,
        min_images: usize,
        exclude_slug: Option<&str>,
    ) -> Result<Prompt, RepositoryError>;
}

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn insert(&self, image: NewImage) -> Result<ImageCandidate, RepositoryError>;
    async fn get(&self, id: ImageId) -> Result<ImageCandidate, RepositoryError>;
    /// All candidates for a prompt with their current impression counts.
    async fn list_for_prompt(
        &self,
        prompt_id: PromptId,
    ) -> Result<Vec<ImageCandidate>, RepositoryError>;
    async fn count_for_prompt(&self, prompt_id: PromptId) -> Result<usize, RepositoryError>;
    /// Accounts one selection event: atomically adds 1 to every selected
    /// image's impression count and appends one impression-log row per image,
    /// in a single transaction. Both writes land or neither does.
    ///
    /// The increment must be an atomic "add 1 to stored value" so concurrent
    /// selections for the same prompt never lose updates.
    async fn record_impressions(
        &self,
        prompt_id: PromptId,
        selected: &[ImageCandidate],
    ) -> Result<(), RepositoryError>;
    /// The impression log for a prompt, oldest first.
    async fn impressions_for_prompt(
        &self,
        prompt_id: PromptId,
    ) -> Result<Vec<Impression>, RepositoryError>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn insert(&self, vote: NewVote) -> Result<Vote, RepositoryError>;
    async fn get(&self, id: VoteId) -> Result<Vote, RepositoryError>;
    /// Votes matching the filter, newest first. Used by the export endpoint.
    async fn list_filtered(&self, filter: &StatsFilter) -> Result<Vec<Vote>, RepositoryError>;
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Aggregated per-model vote and impression tallies under the filter.
    async fn summary(&self, filter: &StatsFilter) -> Result<StatsSummary, RepositoryError>;
}
