use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::{SelectionService, VoteService};
use crate::domain::repositories::{
    ImageRepository, PromptRepository, StatsRepository, VoteRepository,
};
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::images::SqlImageRepository;
use crate::infrastructure::repositories::prompts::SqlPromptRepository;
use crate::infrastructure::repositories::stats::SqlStatsRepository;
use crate::infrastructure::repositories::votes::SqlVoteRepository;

/// Everything that varies between production and test environments; repos
/// and services are created automatically from the database pool.
pub struct AppStateConfig {
    /// Root directory the stored image paths are relative to.
    pub images_dir: PathBuf,
}

#[derive(Clone)]
pub struct AppState {
    pub prompt_repo: Arc<dyn PromptRepository>,
    pub image_repo: Arc<dyn ImageRepository>,
    pub vote_repo: Arc<dyn VoteRepository>,
    pub stats_repo: Arc<dyn StatsRepository>,
    pub selection_service: SelectionService,
    pub vote_service: VoteService,
    pub images_dir: PathBuf,
}

impl AppState {
    /// Build the full application state from a database connection and config.
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let pool = database.clone_pool();

        let prompt_repo: Arc<dyn PromptRepository> =
            Arc::new(SqlPromptRepository::new(pool.clone()));
        let image_repo: Arc<dyn ImageRepository> = Arc::new(SqlImageRepository::new(pool.clone()));
        let vote_repo: Arc<dyn VoteRepository> = Arc::new(SqlVoteRepository::new(pool.clone()));
        let stats_repo: Arc<dyn StatsRepository> = Arc::new(SqlStatsRepository::new(pool));

        let selection_service = SelectionService::new(Arc::clone(&image_repo));
        let vote_service = VoteService::new(Arc::clone(&image_repo), Arc::clone(&vote_repo));

        Self {
            prompt_repo,
            image_repo,
            vote_repo,
            stats_repo,
            selection_service,
            vote_service,
            images_dir: config.images_dir,
        }
    }
}
