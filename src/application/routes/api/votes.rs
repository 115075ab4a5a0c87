use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::errors::ApiError;
use crate::application::services::VoteSubmission;
use crate::application::state::AppState;
use crate::domain::ids::{ImageId, PromptId, VoteId};
use crate::domain::votes::VoteMetadata;

#[derive(Debug, Deserialize)]
pub(crate) struct VoteRequest {
    prompt_id: PromptId,
    image_id: ImageId,
    shown_images: Vec<ImageId>,
    session_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoteResponse {
    vote_id: VoteId,
}

#[tracing::instrument(skip(state, headers, body))]
pub(crate) async fn submit_vote(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteResponse>), ApiError> {
    let metadata = metadata_from_request(&headers, addr);

    let vote = state
        .vote_service
        .submit(VoteSubmission {
            prompt_id: body.prompt_id,
            image_id: body.image_id,
            shown_images: body.shown_images,
            session_id: body.session_id,
            metadata,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(VoteResponse { vote_id: vote.id })))
}

/// Best-effort request context: proxy-supplied client ip (first
/// `x-forwarded-for` hop, then `x-real-ip`, then the socket address), raw
/// user agent, and the edge-injected country code when present.
fn metadata_from_request(headers: &HeaderMap, addr: SocketAddr) -> VoteMetadata {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(String::from)
    };

    let user_ip = header("x-forwarded-for")
        .map(|forwarded| {
            forwarded
                .split(',')
                .next()
                .unwrap_or(&forwarded)
                .trim()
                .to_string()
        })
        .or_else(|| header("x-real-ip"))
        .or_else(|| Some(addr.ip().to_string()));

    VoteMetadata {
        user_ip,
        user_agent: header("user-agent"),
        country: header("x-country"),
    }
}
