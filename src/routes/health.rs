use crate::{
    state::AppState,
    store::{SubscriberStore, WordPoolStore},
};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::sync::Arc;

/// Create a router to serve health checks.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(is_alive))
        .route("/health/status", get(status))
}

/// Simple `is_alive` endpoint that will always return a 200 OK.
/// Used to indicate when the webserver is up and running.
#[tracing::instrument]
async fn is_alive() -> StatusCode {
    tracing::debug!("Service is alive");
    StatusCode::OK
}

#[derive(Debug, serde::Serialize)]
pub struct Status {
    storage_connected: bool,
    /// `None` when there is no word pool or it could not be read.
    words_remaining: Option<usize>,
}

/// Status endpoint to check whether the storage is reachable and how many
/// words are left for campaigns.
#[tracing::instrument(skip(store, word_pool))]
async fn status(
    State(store): State<Arc<dyn SubscriberStore>>,
    State(word_pool): State<Arc<dyn WordPoolStore>>,
) -> Json<Status> {
    let storage_connected = store
        .ping()
        .await
        .map_err(|e| {
            tracing::error!("{:?}", e);
            e
        })
        .is_ok();

    let words_remaining = word_pool.size().await.unwrap_or_else(|e| {
        tracing::error!("{:?}", e);
        None
    });

    let status = Status {
        storage_connected,
        words_remaining,
    };
    tracing::info!("Status: {:?}", status);
    Json(status)
}
