use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, query_scalar};

use crate::domain::RepositoryError;
use crate::domain::ids::{ImageId, ImpressionId, PromptId};
use crate::domain::images::{ImageCandidate, NewImage};
use crate::domain::impressions::{Impression, NewImpression};
use crate::domain::repositories::ImageRepository;
use crate::infrastructure::database::DatabasePool;

#[derive(Clone)]
pub struct SqlImageRepository {
    pool: DatabasePool,
}

impl SqlImageRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: ImageRecord) -> ImageCandidate {
        ImageCandidate {
            id: ImageId::from(record.id),
            prompt_id: PromptId::from(record.prompt_id),
            model_name: record.model_name,
            image_path: record.image_path,
            impression_count: record.impression_count,
            created_at: record.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ImageRecord {
    id: i64,
    prompt_id: i64,
    model_name: String,
    image_path: String,
    impression_count: i64,
    created_at: DateTime<Utc>,
}

const IMAGE_COLUMNS: &str = "id, prompt_id, model_name, image_path, impression_count, created_at";

#[derive(sqlx::FromRow)]
struct ImpressionRecord {
    id: i64,
    prompt_id: i64,
    image_id: i64,
    model_name: String,
    occurred_at: DateTime<Utc>,
}

#[async_trait]
impl ImageRepository for SqlImageRepository {
    async fn insert(&self, new_image: NewImage) -> Result<ImageCandidate, RepositoryError> {
        let new_image = new_image.normalize();
        let created_at = new_image.created_at.unwrap_or_else(Utc::now);

        let record = query_as::<_, ImageRecord>(
            "INSERT INTO images (prompt_id, model_name, image_path, impression_count, created_at) \
             VALUES (?, ?, ?, 0, ?) \
             RETURNING id, prompt_id, model_name, image_path, impression_count, created_at",
        )
        .bind(i64::from(new_image.prompt_id))
        .bind(&new_image.model_name)
        .bind(&new_image.image_path)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(&err))?;

        Ok(Self::into_domain(record))
    }

    async fn get(&self, id: ImageId) -> Result<ImageCandidate, RepositoryError> {
        let record = query_as::<_, ImageRecord>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?"
        ))
        .bind(i64::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(&err))?;

        match record {
            Some(record) => Ok(Self::into_domain(record)),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn list_for_prompt(
        &self,
        prompt_id: PromptId,
    ) -> Result<Vec<ImageCandidate>, RepositoryError> {
        let records = query_as::<_, ImageRecord>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images WHERE prompt_id = ? \
             ORDER BY impression_count ASC, id ASC"
        ))
        .bind(i64::from(prompt_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(&err))?;

        Ok(records.into_iter().map(Self::into_domain).collect())
    }

    async fn count_for_prompt(&self, prompt_id: PromptId) -> Result<usize, RepositoryError> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM images WHERE prompt_id = ?")
            .bind(i64::from(prompt_id))
            .fetch_one(&self.pool)
            .await
            .map_err(|err| RepositoryError::storage(&err))?;

        Ok(count as usize)
    }

    async fn record_impressions(
        &self,
        prompt_id: PromptId,
        selected: &[ImageCandidate],
    ) -> Result<(), RepositoryError> {
        if selected.is_empty() {
            return Ok(());
        }

        let occurred_at = Utc::now();

        // Counter bump and log append share one transaction; a failed log
        // write rolls the increments back on drop.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RepositoryError::storage(&err))?;

        for image in selected {
            // Atomic add against the stored value, not observed value + 1,
            // so concurrent selections never lose updates.
            let result =
                query("UPDATE images SET impression_count = impression_count + 1 WHERE id = ?")
                    .bind(i64::from(image.id))
                    .execute(&mut *tx)
                    .await
                    .map_err(|err| RepositoryError::storage(&err))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }

            let impression = NewImpression {
                prompt_id,
                image_id: image.id,
                model_name: image.model_name.clone(),
                occurred_at,
            };
            query(
                "INSERT INTO impressions (prompt_id, image_id, model_name, occurred_at) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(i64::from(impression.prompt_id))
            .bind(i64::from(impression.image_id))
            .bind(&impression.model_name)
            .bind(impression.occurred_at)
            .execute(&mut *tx)
            .await
            .map_err(|err| RepositoryError::storage(&err))?;
        }

        tx.commit()
            .await
            .map_err(|err| RepositoryError::storage(&err))?;

        Ok(())
    }

    async fn impressions_for_prompt(
        &self,
        prompt_id: PromptId,
    ) -> Result<Vec<Impression>, RepositoryError> {
        let records = query_as::<_, ImpressionRecord>(
            "SELECT id, prompt_id, image_id, model_name, occurred_at FROM impressions \
             WHERE prompt_id = ? ORDER BY occurred_at ASC, id ASC",
        )
        .bind(i64::from(prompt_id))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::storage(&err))?;

        Ok(records
            .into_iter()
            .map(|record| Impression {
                id: ImpressionId::from(record.id),
                prompt_id: PromptId::from(record.prompt_id),
                image_id: ImageId::from(record.image_id),
                model_name: record.model_name,
                occurred_at: record.occurred_at,
            })
            .collect())
    }
}
