use std::path::Component;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::ids::ImageId;

/// Serves an image by opaque id so URLs never leak model names or storage
/// layout. Responses are immutable: an image file never changes once ingested.
#[tracing::instrument(skip(state))]
pub(crate) async fn serve_image(
    State(state): State<AppState>,
    Path(id): Path<ImageId>,
) -> Result<Response, ApiError> {
    let image = state.image_repo.get(id).await.map_err(AppError::from)?;

    let relative = std::path::Path::new(&image.image_path);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return Err(
            AppError::internal(format!("unsafe stored image path: {}", image.image_path)).into(),
        );
    }

    let path = state.images_dir.join(relative);
    let bytes = tokio::fs::read(&path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            ApiError::from(AppError::NotFound)
        } else {
            ApiError::from(AppError::internal(format!(
                "failed to read image file {}: {err}",
                path.display()
            )))
        }
    })?;

    let content_type = content_type_for(&image.image_path);

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable",
            ),
        ],
        bytes,
    )
        .into_response())
}

fn content_type_for(path: &str) -> &'static str {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}
