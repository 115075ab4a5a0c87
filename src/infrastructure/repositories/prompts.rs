use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;

use crate::domain::RepositoryError;
use crate::domain::ids::PromptId;
use crate::domain::prompts::{NewPrompt, Prompt};
use crate::domain::repositories::PromptRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlPromptRepository {
    pool: DatabasePool,
}

impl SqlPromptRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: PromptRecord) -> Prompt {
        Prompt {
            id: PromptId::from(record.id),
            slug: record.slug,
            text: record.text,
            created_at: record.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PromptRecord {
    id: i64,
    slug: String,
    text: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl PromptRepository for SqlPromptRepository {
    async fn insert(&self, new_prompt: NewPrompt) -> Result<Prompt, RepositoryError> {
        let new_prompt = new_prompt.normalize();
        let created_at = new_prompt.created_at.unwrap_or_else(Utc::now);

        let record = query_as::<_, PromptRecord>(
            "INSERT INTO prompts (slug, text, created_at) VALUES (?, ?, ?) \
             RETURNING id, slug, text, created_at",
        )
        .bind(&new_prompt.slug)
        .bind(&new_prompt.text)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict("A prompt with this slug already exists");
            }
            RepositoryError::storage(&err)
        })?;

        Ok(Self::into_domain(record))
    }

    async fn get(&self, id: PromptId) -> Result<Prompt, RepositoryError> {
        let record = query_as::<_, PromptRecord>(
            "SELECT id, slug, text, created_at FROM prompts WHERE id = ?",
        )
        .bind(i64::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(&err))?;

        match record {
            Some(record) => Ok(Self::into_domain(record)),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Prompt, RepositoryError> {
        let record = query_as::<_, PromptRecord>(
            "SELECT id, slug, text, created_at FROM prompts WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(&err))?;

        match record {
            Some(record) => Ok(Self::into_domain(record)),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn random_eligible(
        &self,
        min_images: usize,
        exclude_slug: Option<&str>,
    ) -> Result<Prompt, RepositoryError> {
        let record = query_as::<_, PromptRecord>(
            "SELECT p.id, p.slug, p.text, p.created_at FROM prompts p \
             WHERE (? IS NULL OR p.slug <> ?) \
             AND (SELECT COUNT(*) FROM images i WHERE i.prompt_id = p.id) >= ? \
             ORDER BY RANDOM() LIMIT 1",
        )
        .bind(exclude_slug)
        .bind(exclude_slug)
        .bind(min_images as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(&err))?;

        match record {
            Some(record) => Ok(Self::into_domain(record)),
            None => Err(RepositoryError::NotFound),
        }
    }
}
