use async_trait::async_trait;
use sqlx::QueryBuilder;

use crate::domain::RepositoryError;
use crate::domain::repositories::StatsRepository;
use crate::domain::stats::{StatsFilter, StatsSummary};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlStatsRepository {
    pool: DatabasePool,
}

impl SqlStatsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Vote tallies grouped by chosen model under the full filter.
    async fn votes_by_model(
        &self,
        filter: &StatsFilter,
    ) -> Result<Vec<(String, i64)>, RepositoryError> {
        let mut builder =
            QueryBuilder::new("SELECT chosen_model, COUNT(*) FROM votes WHERE 1 = 1");

        if let Some(prompt_id) = filter.prompt_id {
            builder.push(" AND prompt_id = ");
            builder.push_bind(i64::from(prompt_id));
        }
        if let Some(model) = &filter.model_name {
            builder.push(" AND chosen_model = ");
            builder.push_bind(model.clone());
        }
        if let Some(start) = filter.start {
            builder.push(" AND created_at >= ");
            builder.push_bind(start);
        }
        if let Some(end) = filter.end {
            builder.push(" AND created_at <= ");
            builder.push_bind(end);
        }
        builder.push(" GROUP BY chosen_model");

        builder
            .build_query_as::<(String, i64)>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(&err))
    }

    /// Lifetime impression tallies grouped by model. Impression counters are
    /// cumulative, so the date-range filter applies to votes only.
    async fn impressions_by_model(
        &self,
        filter: &StatsFilter,
    ) -> Result<Vec<(String, i64)>, RepositoryError> {
        let mut builder = QueryBuilder::new(
            "SELECT model_name, COALESCE(SUM(impression_count), 0) FROM images WHERE 1 = 1",
        );

        if let Some(prompt_id) = filter.prompt_id {
            builder.push(" AND prompt_id = ");
            builder.push_bind(i64::from(prompt_id));
        }
        if let Some(model) = &filter.model_name {
            builder.push(" AND model_name = ");
            builder.push_bind(model.clone());
        }
        builder.push(" GROUP BY model_name");

        builder
            .build_query_as::<(String, i64)>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(&err))
    }
}

#[async_trait]
impl StatsRepository for SqlStatsRepository {
    async fn summary(&self, filter: &StatsFilter) -> Result<StatsSummary, RepositoryError> {
        let votes = self.votes_by_model(filter).await?;
        let impressions = self.impressions_by_model(filter).await?;
        Ok(StatsSummary::build(votes, impressions))
    }
}
