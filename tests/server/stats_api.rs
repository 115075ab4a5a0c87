use serde_json::json;

use crate::helpers::{TestApp, seed_prompt, session_id, spawn_app};

#[derive(Debug, serde::Deserialize)]
struct StatsSummary {
    total_votes: i64,
    total_impressions: i64,
    model_stats: Vec<ModelStats>,
}

#[derive(Debug, serde::Deserialize)]
struct ModelStats {
    model_name: String,
    votes: i64,
    impressions: i64,
    win_rate: f64,
    ctr: f64,
}

async fn select_once(app: &TestApp, slug: &str) -> Vec<i64> {
    let client = reqwest::Client::new();
    let response = client
        .get(app.api_url(&format!("/prompts/{slug}")))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    #[derive(serde::Deserialize)]
    struct Body {
        candidates: Vec<Candidate>,
    }
    #[derive(serde::Deserialize)]
    struct Candidate {
        image_id: i64,
    }

    let body: Body = response.json().await.expect("Failed to parse response");
    body.candidates.into_iter().map(|c| c.image_id).collect()
}

#[tokio::test]
async fn stats_aggregate_votes_and_impressions_per_model() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let (prompt, images) =
        seed_prompt(&app, "stats-prompt", &["Flux", "Qwen", "Reve", "Grok"]).await;

    // Two selection rounds: every image is shown twice.
    let shown = select_once(&app, "stats-prompt").await;
    select_once(&app, "stats-prompt").await;

    // Two votes for Flux, one for Qwen.
    for model in ["Flux", "Flux", "Qwen"] {
        let chosen = images
            .iter()
            .find(|i| i.model_name == model)
            .expect("model image missing");
        let response = client
            .post(app.api_url("/votes"))
            .json(&json!({
                "prompt_id": prompt.id.into_inner(),
                "image_id": chosen.id.into_inner(),
                "shown_images": shown,
                "session_id": session_id(),
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 201);
    }

    let response = client
        .get(app.api_url("/admin/stats"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let summary: StatsSummary = response.json().await.expect("Failed to parse response");
    assert_eq!(summary.total_votes, 3);
    assert_eq!(summary.total_impressions, 8);
    assert_eq!(summary.model_stats.len(), 4);

    // Sorted by votes descending: Flux first.
    assert_eq!(summary.model_stats[0].model_name, "Flux");
    assert_eq!(summary.model_stats[0].votes, 2);
    assert_eq!(summary.model_stats[0].impressions, 2);
    assert!((summary.model_stats[0].win_rate - 2.0 / 3.0).abs() < 1e-9);
    assert!((summary.model_stats[0].ctr - 1.0).abs() < 1e-9);

    let reve = summary
        .model_stats
        .iter()
        .find(|s| s.model_name == "Reve")
        .expect("Reve missing");
    assert_eq!(reve.votes, 0);
    assert_eq!(reve.impressions, 2);
    assert!((reve.ctr - 0.0).abs() < 1e-9);
}

#[tokio::test]
async fn stats_can_be_filtered_by_model() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let (prompt, images) =
        seed_prompt(&app, "filter-prompt", &["Flux", "Qwen", "Reve", "Grok"]).await;
    let shown = select_once(&app, "filter-prompt").await;

    let chosen = &images[0];
    client
        .post(app.api_url("/votes"))
        .json(&json!({
            "prompt_id": prompt.id.into_inner(),
            "image_id": chosen.id.into_inner(),
            "shown_images": shown,
            "session_id": session_id(),
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let response = client
        .get(app.api_url(&format!("/admin/stats?model={}", chosen.model_name)))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let summary: StatsSummary = response.json().await.expect("Failed to parse response");
    assert_eq!(summary.model_stats.len(), 1);
    assert_eq!(summary.model_stats[0].model_name, chosen.model_name);
    assert_eq!(summary.total_votes, 1);
}

#[tokio::test]
async fn votes_export_defaults_to_json() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let (prompt, images) = seed_prompt(&app, "export-json", &["A", "B", "C", "D"]).await;
    let shown: Vec<i64> = images.iter().map(|i| i.id.into_inner()).collect();

    client
        .post(app.api_url("/votes"))
        .json(&json!({
            "prompt_id": prompt.id.into_inner(),
            "image_id": shown[0],
            "shown_images": shown,
            "session_id": session_id(),
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let response = client
        .get(app.api_url("/admin/votes/export"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let votes: Vec<serde_json::Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0]["chosen_model"], "A");
}

#[tokio::test]
async fn votes_export_as_csv_includes_header_and_rows() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let (prompt, images) = seed_prompt(&app, "export-csv", &["A", "B", "C", "D"]).await;
    let shown: Vec<i64> = images.iter().map(|i| i.id.into_inner()).collect();

    client
        .post(app.api_url("/votes"))
        .json(&json!({
            "prompt_id": prompt.id.into_inner(),
            "image_id": shown[1],
            "shown_images": shown,
            "session_id": session_id(),
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let response = client
        .get(app.api_url("/admin/votes/export?format=csv"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let body = response.text().await.expect("Failed to read body");
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some(
            "id,prompt_id,image_id,chosen_model,shown_models,session_id,user_ip,user_agent,country,created_at"
        )
    );
    let row = lines.next().expect("missing data row");
    assert!(row.contains(",B,"), "chosen model missing from row: {row}");
}
