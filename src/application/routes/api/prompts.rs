use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::ids::{ImageId, PromptId};
use crate::domain::prompts::{MIN_DISPLAY_IMAGES, Prompt};
use crate::domain::selection::DISPLAY_COUNT;

/// One anonymized candidate: an opaque id and the URL to fetch it from.
/// Model labels deliberately never appear here.
#[derive(Debug, Serialize)]
pub(crate) struct CandidateView {
    pub image_id: ImageId,
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PromptResponse {
    pub prompt_id: PromptId,
    pub prompt_slug: String,
    pub prompt_text: String,
    pub candidates: Vec<CandidateView>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RandomQuery {
    /// Slug to exclude, so the UI never serves the same prompt twice in a row.
    exclude: Option<String>,
}

#[tracing::instrument(skip(state))]
pub(crate) async fn random_prompt(
    State(state): State<AppState>,
    Query(query): Query<RandomQuery>,
) -> Result<Json<PromptResponse>, ApiError> {
    let prompt = state
        .prompt_repo
        .random_eligible(MIN_DISPLAY_IMAGES, query.exclude.as_deref())
        .await
        .map_err(AppError::from)?;

    respond_with_selection(&state, prompt).await
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_prompt(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PromptResponse>, ApiError> {
    let prompt = state
        .prompt_repo
        .get_by_slug(&slug)
        .await
        .map_err(AppError::from)?;

    // Strict product-level gate; the engine itself would happily return
    // fewer than four.
    let available = state
        .image_repo
        .count_for_prompt(prompt.id)
        .await
        .map_err(AppError::from)?;
    if available < MIN_DISPLAY_IMAGES {
        return Err(AppError::conflict("prompt does not have enough images for voting").into());
    }

    respond_with_selection(&state, prompt).await
}

async fn respond_with_selection(
    state: &AppState,
    prompt: Prompt,
) -> Result<Json<PromptResponse>, ApiError> {
    let selected = state
        .selection_service
        .select_fair_images(prompt.id, DISPLAY_COUNT)
        .await
        .map_err(AppError::from)?;

    let candidates = selected
        .into_iter()
        .map(|image| CandidateView {
            image_id: image.id,
            image_url: format!("/api/v1/images/{}", image.id),
        })
        .collect();

    Ok(Json(PromptResponse {
        prompt_id: prompt.id,
        prompt_slug: prompt.slug,
        prompt_text: prompt.text,
        candidates,
    }))
}
