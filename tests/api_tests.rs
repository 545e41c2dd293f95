// tests/api_tests.rs
//
// Routing and authorization checks. None of these reach the database.

mod common;

use common::{bearer, lazy_pool, spawn_app, test_config};

async fn spawn() -> String {
    let config = test_config("postgres://unused", "papi");
    spawn_app(lazy_pool(), config).await
}

#[tokio::test]
async fn unknown_path_returns_404() {
    let address = spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let address = spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/admin/sessions", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_routes_reject_garbage_token() {
    let address = spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/admin/tests", address))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let address = spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/admin/sessions", address))
        .header("Authorization", bearer("hr"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn malformed_link_token_is_not_found() {
    let address = spawn().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/sessions/not-a-token", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .post(format!("{}/api/sessions/not-a-token/submit", address))
        .json(&serde_json::json!({ "answers": { "1": 2 } }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "test session not found");
}

#[tokio::test]
async fn submit_requires_answers_object() {
    let address = spawn().await;
    let client = reqwest::Client::new();
    let token = uuid::Uuid::new_v4().simple().to_string();

    let response = client
        .post(format!("{}/api/sessions/{}/submit", address, token))
        .json(&serde_json::json!({ "responses": [] }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 422);
}
