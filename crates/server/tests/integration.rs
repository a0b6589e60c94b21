use axum_test::TestServer;
use castlog_server::routes::build_router;
use castlog_server::state::AppState;
use serde_json::{Value, json};

/// Create a test server with an in-memory SQLite database.
async fn test_app() -> (TestServer, sqlx::SqlitePool) {
    let pool = castlog_db::connect(":memory:").await.unwrap();
    castlog_db::migrate::run(&pool).await.unwrap();

    let state = AppState { db: pool.clone() };
    let app = build_router(state);
    (TestServer::new(app).unwrap(), pool)
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (server, _pool) = test_app().await;
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_and_fetch_show() {
    let (server, _pool) = test_app().await;

    let resp = server
        .post("/api/v1/shows")
        .json(&json!({ "name": "Deepest Dive", "description": "One game, way too deep." }))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["slug"], "deepest-dive");

    let resp = server.get("/api/v1/shows/deepest-dive").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["name"], "Deepest Dive");
    assert_eq!(body["description"], "One game, way too deep.");
}

#[tokio::test]
async fn duplicate_show_is_a_conflict() {
    let (server, _pool) = test_app().await;

    let resp = server
        .post("/api/v1/shows")
        .json(&json!({ "name": "Trivia Tower" }))
        .await;
    resp.assert_status_ok();

    let resp = server
        .post("/api/v1/shows")
        .json(&json!({ "name": "Trivia Tower" }))
        .await;
    resp.assert_status(axum::http::StatusCode::CONFLICT);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn missing_show_returns_error_envelope() {
    let (server, _pool) = test_app().await;

    let resp = server.get("/api/v1/shows/nope").await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "not_found");
    assert!(body["error"]["message"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn empty_show_name_is_a_bad_request() {
    let (server, _pool) = test_app().await;

    let resp = server
        .post("/api/v1/shows")
        .json(&json!({ "name": "  !!!  " }))
        .await;
    resp.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn update_show_patches_fields() {
    let (server, _pool) = test_app().await;

    server
        .post("/api/v1/shows")
        .json(&json!({ "name": "Leo Plays" }))
        .await
        .assert_status_ok();

    let resp = server
        .patch("/api/v1/shows/leo-plays")
        .json(&json!({ "description": "Leo finishes a classic." }))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["name"], "Leo Plays");
    assert_eq!(body["description"], "Leo finishes a classic.");
}

#[tokio::test]
async fn episode_with_featuring_and_links() {
    let (server, _pool) = test_app().await;

    server
        .post("/api/v1/shows")
        .json(&json!({ "name": "MinnMax Show" }))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/people")
        .json(&json!({ "name": "Ben Hanson" }))
        .await
        .assert_status_ok();
    server
        .post("/api/v1/people")
        .json(&json!({ "name": "Kyle Hilliard" }))
        .await
        .assert_status_ok();

    let resp = server
        .post("/api/v1/episodes")
        .json(&json!({
            "title": "The MinnMax Show Episode 100",
            "show_slug": "minnmax-show",
            "host_slug": "ben-hanson",
            "featuring_slugs": ["kyle-hilliard"],
            "headings": { "Timestamps": "00:00 Intro" },
            "links": [
                { "url": "https://example.com/podcast", "label": "Podcast audio" }
            ]
        }))
        .await;
    resp.assert_status_ok();

    let resp = server
        .get("/api/v1/episodes/the-minnmax-show-episode-100")
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["title"], "The MinnMax Show Episode 100");
    assert_eq!(body["featuring"][0]["slug"], "kyle-hilliard");
    assert_eq!(body["links"][0]["label"], "Podcast audio");

    let resp = server.get("/api/v1/shows/minnmax-show/episodes").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn episode_with_unknown_show_is_not_found() {
    let (server, _pool) = test_app().await;

    let resp = server
        .post("/api/v1/episodes")
        .json(&json!({ "title": "Orphan Episode", "show_slug": "missing" }))
        .await;
    resp.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn videos_listing_respects_limit() {
    let (server, pool) = test_app().await;

    for i in 0..5i64 {
        castlog_db::repo::videos::upsert_video(
            &pool,
            &format!("vid{i}"),
            &format!("Video {i}"),
            "",
            1_600_000_000 + i,
        )
        .await
        .unwrap();
    }

    let resp = server.get("/api/v1/videos?limit=3").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    // newest first
    assert_eq!(rows[0]["external_id"], "vid4");
}

#[tokio::test]
async fn shows_listing_is_sorted_by_name() {
    let (server, _pool) = test_app().await;

    for name in ["Trivia Tower", "BetterQuest", "Leo Plays"] {
        server
            .post("/api/v1/shows")
            .json(&json!({ "name": name }))
            .await
            .assert_status_ok();
    }

    let resp = server.get("/api/v1/shows").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["BetterQuest", "Leo Plays", "Trivia Tower"]);
}
