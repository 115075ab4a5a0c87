pub(crate) mod images;
pub(crate) mod prompts;
pub(crate) mod stats;
pub(crate) mod votes;

use axum::routing::{get, post};

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/prompts/random", get(prompts::random_prompt))
        .route("/prompts/{slug}", get(prompts::get_prompt))
        .route("/votes", post(votes::submit_vote))
        .route("/images/{id}", get(images::serve_image))
        .route("/admin/stats", get(stats::get_stats))
        .route("/admin/votes/export", get(stats::export_votes))
}
