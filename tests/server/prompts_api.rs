use std::collections::HashSet;

use serde::Deserialize;

use crate::helpers::{seed_prompt, spawn_app};

#[derive(Debug, Deserialize)]
struct PromptResponse {
    prompt_id: i64,
    prompt_slug: String,
    prompt_text: String,
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    image_id: i64,
    image_url: String,
}

const MODELS: &[&str] = &[
    "ByteDance",
    "ChatGPT",
    "Flux",
    "Grok",
    "Ideogram",
    "Leonardo",
    "Midjourney",
    "Qwen",
];

#[tokio::test]
async fn getting_a_prompt_returns_four_anonymized_candidates() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let (prompt, _) = seed_prompt(&app, "city-at-dawn", MODELS).await;

    let response = client
        .get(app.api_url("/prompts/city-at-dawn"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);

    let body_text = response.text().await.expect("Failed to read body");
    for model in MODELS {
        assert!(
            !body_text.contains(model),
            "model name {model} leaked into the candidate payload"
        );
    }

    let body: PromptResponse = serde_json::from_str(&body_text).expect("Failed to parse response");
    assert_eq!(body.prompt_id, prompt.id.into_inner());
    assert_eq!(body.prompt_slug, "city-at-dawn");
    assert_eq!(body.prompt_text, prompt.text);
    assert_eq!(body.candidates.len(), 4);

    let distinct: HashSet<i64> = body.candidates.iter().map(|c| c.image_id).collect();
    assert_eq!(distinct.len(), 4, "candidates contain duplicate image ids");

    for candidate in &body.candidates {
        assert_eq!(
            candidate.image_url,
            format!("/api/v1/images/{}", candidate.image_id)
        );
    }
}

#[tokio::test]
async fn getting_an_unknown_prompt_returns_a_404() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(app.api_url("/prompts/no-such-slug"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn getting_a_prompt_with_too_few_images_returns_a_409() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    seed_prompt(&app, "sparse-prompt", &["Flux", "Qwen", "Reve"]).await;

    let response = client
        .get(app.api_url("/prompts/sparse-prompt"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn selection_increments_only_the_shown_images() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let (prompt, _) = seed_prompt(&app, "increment-check", MODELS).await;

    let response = client
        .get(app.api_url("/prompts/increment-check"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let body: PromptResponse = response.json().await.expect("Failed to parse response");
    let shown: HashSet<i64> = body.candidates.iter().map(|c| c.image_id).collect();

    let images = app
        .image_repo
        .list_for_prompt(prompt.id)
        .await
        .expect("Failed to list images");
    assert_eq!(images.len(), 8);

    for image in &images {
        let expected = i64::from(shown.contains(&image.id.into_inner()));
        assert_eq!(
            image.impression_count, expected,
            "image {} has count {}, expected {}",
            image.id, image.impression_count, expected
        );
    }
}

#[tokio::test]
async fn random_prompt_only_serves_eligible_prompts() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    seed_prompt(&app, "eligible-prompt", &["A", "B", "C", "D"]).await;
    seed_prompt(&app, "ineligible-prompt", &["A", "B"]).await;

    for _ in 0..10 {
        let response = client
            .get(app.api_url("/prompts/random"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 200);

        let body: PromptResponse = response.json().await.expect("Failed to parse response");
        assert_eq!(body.prompt_slug, "eligible-prompt");
        assert_eq!(body.candidates.len(), 4);
    }
}

#[tokio::test]
async fn random_prompt_honors_the_exclude_parameter() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    seed_prompt(&app, "first-prompt", &["A", "B", "C", "D"]).await;
    seed_prompt(&app, "second-prompt", &["A", "B", "C", "D"]).await;

    for _ in 0..10 {
        let response = client
            .get(app.api_url("/prompts/random?exclude=first-prompt"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), 200);

        let body: PromptResponse = response.json().await.expect("Failed to parse response");
        assert_eq!(body.prompt_slug, "second-prompt");
    }
}

#[tokio::test]
async fn random_prompt_returns_a_404_when_nothing_is_eligible() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    seed_prompt(&app, "too-small", &["A", "B"]).await;

    let response = client
        .get(app.api_url("/prompts/random"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 404);
}
