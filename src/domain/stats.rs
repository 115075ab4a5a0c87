use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::PromptId;

/// Aggregated standing of one model across all its images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStats {
    pub model_name: String,
    pub votes: i64,
    pub impressions: i64,
    /// Share of all counted votes won by this model.
    pub win_rate: f64,
    /// Votes per impression (click-through rate).
    pub ctr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_votes: i64,
    pub total_impressions: i64,
    pub model_stats: Vec<ModelStats>,
}

/// Optional narrowing of the stats aggregation window.
#[derive(Debug, Clone, Default)]
pub struct StatsFilter {
    pub prompt_id: Option<PromptId>,
    pub model_name: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl StatsSummary {
    /// Combines per-model vote and impression tallies into ranked stats,
    /// sorted by votes descending.
    pub fn build(
        votes_by_model: Vec<(String, i64)>,
        impressions_by_model: Vec<(String, i64)>,
    ) -> Self {
        let total_votes: i64 = votes_by_model.iter().map(|(_, count)| count).sum();
        let total_impressions: i64 = impressions_by_model.iter().map(|(_, count)| count).sum();

        let mut by_model: std::collections::BTreeMap<String, (i64, i64)> =
            std::collections::BTreeMap::new();
        for (model, count) in votes_by_model {
            by_model.entry(model).or_default().0 = count;
        }
        for (model, count) in impressions_by_model {
            by_model.entry(model).or_default().1 = count;
        }

        let mut model_stats: Vec<ModelStats> = by_model
            .into_iter()
            .map(|(model_name, (votes, impressions))| ModelStats {
                model_name,
                votes,
                impressions,
                win_rate: if total_votes > 0 {
                    votes as f64 / total_votes as f64
                } else {
                    0.0
                },
                ctr: if impressions > 0 {
                    votes as f64 / impressions as f64
                } else {
                    0.0
                },
            })
            .collect();

        model_stats.sort_by(|a, b| b.votes.cmp(&a.votes));

        Self {
            total_votes,
            total_impressions,
            model_stats,
        }
    }
}
