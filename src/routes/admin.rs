use crate::{
    state::AppState,
    store::{WordPoolError, WordPoolStore},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Create a router for administrative endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/admin/words", post(replenish_words))
}

#[derive(Debug, serde::Deserialize)]
pub struct ReplenishRequest {
    words: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
struct ReplenishResponse {
    remaining: usize,
}

/// Add new words to the word pool.
#[tracing::instrument(
    name = "Replenishing the word pool",
    skip(word_pool, body),
    fields(added = body.words.len())
)]
async fn replenish_words(
    State(word_pool): State<Arc<dyn WordPoolStore>>,
    Json(body): Json<ReplenishRequest>,
) -> Result<impl IntoResponse, ReplenishError> {
    let words = parse_words(body.words).map_err(ReplenishError::ValidationError)?;
    let remaining = word_pool.replenish(words).await?;

    Ok(Json(ReplenishResponse { remaining }))
}

fn parse_words(words: Vec<String>) -> Result<Vec<String>, String> {
    if words.is_empty() {
        return Err("At least one word must be given.".to_string());
    }

    words
        .into_iter()
        .map(|word| {
            let trimmed = word.trim();
            if trimmed.is_empty() {
                Err("Words must not be empty.".to_string())
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}

#[derive(thiserror::Error)]
pub enum ReplenishError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to replenish the word pool")]
    StoreError(#[from] WordPoolError),
}

impl IntoResponse for ReplenishError {
    fn into_response(self) -> Response {
        match self {
            Self::ValidationError(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Self::StoreError(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        }
        .into_response()
    }
}
