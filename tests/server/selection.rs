use std::collections::HashSet;

use imgarena::domain::RepositoryError;
use imgarena::domain::ids::ImageId;
use imgarena::domain::selection::DISPLAY_COUNT;

use crate::helpers::{seed_prompt, spawn_app};

#[tokio::test]
async fn concurrent_selections_never_lose_impression_increments() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let (prompt, _) = seed_prompt(&app, "hot-prompt", &["A", "B", "C", "D"]).await;

    // With exactly four images every request shows all of them, so eight
    // concurrent rounds must leave every image at exactly eight.
    let rounds = 8;
    let requests = (0..rounds).map(|_| {
        let client = client.clone();
        let url = app.api_url("/prompts/hot-prompt");
        async move {
            let response = client
                .get(url)
                .send()
                .await
                .expect("Failed to execute request");
            assert_eq!(response.status(), 200);
        }
    });
    futures::future::join_all(requests).await;

    let images = app
        .image_repo
        .list_for_prompt(prompt.id)
        .await
        .expect("Failed to list images");
    assert_eq!(images.len(), 4);
    for image in &images {
        assert_eq!(
            image.impression_count, rounds,
            "image {} lost increments under concurrency",
            image.id
        );
    }

    let logged = app
        .image_repo
        .impressions_for_prompt(prompt.id)
        .await
        .expect("Failed to read impression log");
    assert_eq!(logged.len() as i64, rounds * 4);
}

#[tokio::test]
async fn a_failed_accounting_pass_leaves_no_partial_state() {
    let app = spawn_app().await;

    let (prompt, images) = seed_prompt(&app, "rollback-check", &["A", "B", "C", "D"]).await;

    // One real candidate followed by one that does not exist: the whole
    // transaction must roll back, including the increment that already ran.
    let mut phantom = images[1].clone();
    phantom.id = ImageId::from(999_999);

    let result = app
        .image_repo
        .record_impressions(prompt.id, &[images[0].clone(), phantom])
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));

    let after = app
        .image_repo
        .list_for_prompt(prompt.id)
        .await
        .expect("Failed to list images");
    for image in &after {
        assert_eq!(
            image.impression_count, 0,
            "image {} kept an increment from a failed accounting pass",
            image.id
        );
    }

    let logged = app
        .image_repo
        .impressions_for_prompt(prompt.id)
        .await
        .expect("Failed to read impression log");
    assert!(
        logged.is_empty(),
        "impression log kept rows from a failed accounting pass"
    );
}

#[tokio::test]
async fn selection_prefers_the_least_shown_images() {
    let app = spawn_app().await;

    let (prompt, images) = seed_prompt(
        &app,
        "warm-and-cold",
        &["A", "B", "C", "D", "E", "F", "G", "H"],
    )
    .await;

    // Warm up the first four images so the other four are strictly colder.
    let warm = &images[..4];
    for _ in 0..5 {
        app.image_repo
            .record_impressions(prompt.id, warm)
            .await
            .expect("Failed to warm images");
    }

    let cold_ids: HashSet<i64> = images[4..].iter().map(|i| i.id.into_inner()).collect();

    let selected = app
        .selection_service
        .select_fair_images(prompt.id, DISPLAY_COUNT)
        .await
        .expect("Failed to select images");
    assert_eq!(selected.len(), 4);

    let selected_ids: HashSet<i64> = selected.iter().map(|i| i.id.into_inner()).collect();
    assert_eq!(
        selected_ids, cold_ids,
        "a warmer image was shown while colder ones existed"
    );
}

#[tokio::test]
async fn undersized_pools_are_returned_whole_and_still_accounted() {
    let app = spawn_app().await;

    let (prompt, _) = seed_prompt(&app, "small-pool", &["A", "B", "C"]).await;

    let selected = app
        .selection_service
        .select_fair_images(prompt.id, DISPLAY_COUNT)
        .await
        .expect("Failed to select images");
    assert_eq!(selected.len(), 3);

    let images = app
        .image_repo
        .list_for_prompt(prompt.id)
        .await
        .expect("Failed to list images");
    for image in &images {
        assert_eq!(image.impression_count, 1);
    }
}
