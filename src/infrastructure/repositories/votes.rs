use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, query_as};

use crate::domain::RepositoryError;
use crate::domain::ids::{ImageId, PromptId, VoteId};
use crate::domain::repositories::VoteRepository;
use crate::domain::stats::StatsFilter;
use crate::domain::votes::{NewVote, Vote, VoteMetadata};
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlVoteRepository {
    pool: DatabasePool,
}

impl SqlVoteRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: VoteRecord) -> Result<Vote, RepositoryError> {
        let shown_models: Vec<String> = serde_json::from_str(&record.shown_models)
            .map_err(|err| RepositoryError::unexpected(format!("corrupt shown_models: {err}")))?;

        Ok(Vote {
            id: VoteId::from(record.id),
            prompt_id: PromptId::from(record.prompt_id),
            image_id: ImageId::from(record.image_id),
            chosen_model: record.chosen_model,
            shown_models,
            session_id: record.session_id,
            metadata: VoteMetadata {
                user_ip: record.user_ip,
                user_agent: record.user_agent,
                country: record.country,
            },
            created_at: record.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VoteRecord {
    id: i64,
    prompt_id: i64,
    image_id: i64,
    chosen_model: String,
    shown_models: String,
    session_id: String,
    user_ip: Option<String>,
    user_agent: Option<String>,
    country: Option<String>,
    created_at: DateTime<Utc>,
}

const VOTE_COLUMNS: &str = "id, prompt_id, image_id, chosen_model, shown_models, session_id, \
                            user_ip, user_agent, country, created_at";

#[async_trait]
impl VoteRepository for SqlVoteRepository {
    async fn insert(&self, new_vote: NewVote) -> Result<Vote, RepositoryError> {
        let created_at = new_vote.created_at.unwrap_or_else(Utc::now);
        let shown_models = serde_json::to_string(&new_vote.shown_models)
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        let record = query_as::<_, VoteRecord>(&format!(
            "INSERT INTO votes (prompt_id, image_id, chosen_model, shown_models, session_id, \
                                user_ip, user_agent, country, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {VOTE_COLUMNS}"
        ))
        .bind(i64::from(new_vote.prompt_id))
        .bind(i64::from(new_vote.image_id))
        .bind(&new_vote.chosen_model)
        .bind(&shown_models)
        .bind(&new_vote.session_id)
        .bind(&new_vote.metadata.user_ip)
        .bind(&new_vote.metadata.user_agent)
        .bind(&new_vote.metadata.country)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(&err))?;

        Self::into_domain(record)
    }

    async fn get(&self, id: VoteId) -> Result<Vote, RepositoryError> {
        let record =
            query_as::<_, VoteRecord>(&format!("SELECT {VOTE_COLUMNS} FROM votes WHERE id = ?"))
                .bind(i64::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| RepositoryError::storage(&err))?;

        match record {
            Some(record) => Self::into_domain(record),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn list_filtered(&self, filter: &StatsFilter) -> Result<Vec<Vote>, RepositoryError> {
        let mut builder =
            QueryBuilder::new(format!("SELECT {VOTE_COLUMNS} FROM votes WHERE 1 = 1"));

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
        builder.push(" ORDER BY created_at DESC");

        let records = builder
            .build_query_as::<VoteRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(&err))?;

        records.into_iter().map(Self::into_domain).collect()
    }
}
