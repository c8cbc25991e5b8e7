use crate::utils::{spawn_app, spawn_app_with_words};
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn replenishing_creates_a_missing_pool() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_words(&json!({ "words": ["lucid", " terse "] })).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "remaining": 2 }));
    assert_eq!(
        app.word_pool.words().await,
        Some(vec!["lucid".to_string(), "terse".to_string()])
    );
}

#[tokio::test]
async fn replenishing_appends_to_the_existing_pool() {
    let app = spawn_app_with_words(&["lucid"]).await;

    let response = app.post_words(&json!({ "words": ["wry", "lucid"] })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "remaining": 3 }));
}

#[tokio::test]
async fn replenishing_with_blank_words_is_rejected() {
    let app = spawn_app_with_words(&["lucid"]).await;

    let response = app.post_words(&json!({ "words": ["wry", "  "] })).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.word_pool.words().await, Some(vec!["lucid".to_string()]));
}

#[tokio::test]
async fn replenishing_with_no_words_is_rejected() {
    let app = spawn_app().await;

    let response = app.post_words(&json!({ "words": [] })).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.word_pool.words().await, None);
}
