use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::ids::PromptId;
use crate::domain::stats::{StatsFilter, StatsSummary};
use crate::domain::votes::Vote;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsQuery {
    prompt_id: Option<i64>,
    model: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl StatsQuery {
    fn into_filter(self) -> StatsFilter {
        StatsFilter {
            prompt_id: self.prompt_id.map(PromptId::from),
            model_name: self.model,
            start: self.start,
            end: self.end,
        }
    }
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsSummary>, ApiError> {
    let summary = state
        .stats_repo
        .summary(&query.into_filter())
        .await
        .map_err(AppError::from)?;

    Ok(Json(summary))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportQuery {
    format: Option<String>,
    prompt_id: Option<i64>,
    model: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl ExportQuery {
    fn into_filter(self) -> StatsFilter {
        StatsFilter {
            prompt_id: self.prompt_id.map(PromptId::from),
            model_name: self.model,
            start: self.start,
            end: self.end,
        }
    }
}

#[tracing::instrument(skip(state))]
pub(crate) async fn export_votes(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format.clone();
    let votes = state
        .vote_repo
        .list_filtered(&query.into_filter())
        .await
        .map_err(AppError::from)?;

    if format.as_deref() == Some("csv") {
        let csv = votes_to_csv(&votes);
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"votes.csv\"",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(votes).into_response())
}

fn votes_to_csv(votes: &[Vote]) -> String {
    let mut out = String::from(
        "id,prompt_id,image_id,chosen_model,shown_models,session_id,user_ip,user_agent,country,created_at\n",
    );
    for vote in votes {
        let row = [
            vote.id.to_string(),
            vote.prompt_id.to_string(),
            vote.image_id.to_string(),
            vote.chosen_model.clone(),
            vote.shown_models.join(";"),
            vote.session_id.clone(),
            vote.metadata.user_ip.clone().unwrap_or_default(),
            vote.metadata.user_agent.clone().unwrap_or_default(),
            vote.metadata.country.clone().unwrap_or_default(),
            vote.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ];
        let escaped: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&escaped.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
