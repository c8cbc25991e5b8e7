use crate::{
    domain::SubscriberEmail,
    state::AppState,
    store::{StoreError, SubscribeOutcome, SubscriberStore, UnsubscribeOutcome},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

#[derive(Debug, serde::Deserialize)]
pub struct SubscriptionRequest {
    address: String,
}

impl TryFrom<SubscriptionRequest> for SubscriberEmail {
    type Error = String;

    fn try_from(value: SubscriptionRequest) -> Result<Self, Self::Error> {
        SubscriberEmail::parse(value.address)
    }
}

#[derive(Debug, serde::Serialize)]
struct Subscriber {
    address: SubscriberEmail,
}

#[derive(Debug, serde::Serialize)]
struct StatusBody<T> {
    status: T,
}

/// Create a router to serve endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/subscriptions", get(list_subscribers).post(subscribe))
        .route("/subscriptions/unsubscribe", post(unsubscribe))
}

/// List every current subscriber.
#[tracing::instrument(name = "Listing subscribers", skip(store))]
async fn list_subscribers(
    State(store): State<Arc<dyn SubscriberStore>>,
) -> Result<impl IntoResponse, ListSubscribersError> {
    let subscribers: Vec<_> = store
        .list()
        .await?
        .into_iter()
        .map(|address| Subscriber { address })
        .collect();

    Ok(Json(subscribers))
}

/// Subscribe an email address to the daily words.
#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(store, body),
    fields(subscriber_email = %body.address)
)]
async fn subscribe(
    State(store): State<Arc<dyn SubscriberStore>>,
    Json(body): Json<SubscriptionRequest>,
) -> Result<impl IntoResponse, SubscribeError> {
    let email: SubscriberEmail = body.try_into().map_err(SubscribeError::ValidationError)?;

    let outcome = store.add(&email).await?;
    let status = match outcome {
        SubscribeOutcome::Created => StatusCode::CREATED,
        SubscribeOutcome::AlreadyExists => StatusCode::OK,
    };

    Ok((status, Json(StatusBody { status: outcome })))
}

/// Remove an email address from the subscribers.
#[tracing::instrument(
    name = "Removing a subscriber",
    skip(store, body),
    fields(subscriber_email = %body.address)
)]
async fn unsubscribe(
    State(store): State<Arc<dyn SubscriberStore>>,
    Json(body): Json<SubscriptionRequest>,
) -> Result<impl IntoResponse, UnsubscribeError> {
    let email: SubscriberEmail = body.try_into().map_err(UnsubscribeError::ValidationError)?;

    match store.remove(&email).await? {
        UnsubscribeOutcome::Removed => Ok(Json(StatusBody { status: "removed" })),
        UnsubscribeOutcome::NotFound => Err(UnsubscribeError::NotFound(email)),
    }
}

#[derive(thiserror::Error)]
pub enum ListSubscribersError {
    #[error("Failed to get subscribers")]
    StoreError(#[from] StoreError),
}

impl IntoResponse for ListSubscribersError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to store the subscriber")]
    StoreError(#[from] StoreError),
}

impl IntoResponse for SubscribeError {
    fn into_response(self) -> Response {
        match self {
            Self::ValidationError(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Self::StoreError(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        }
        .into_response()
    }
}

#[derive(thiserror::Error)]
pub enum UnsubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Email not found: {0}")]
    NotFound(SubscriberEmail),
    #[error("Failed to remove the subscriber")]
    StoreError(#[from] StoreError),
}

impl IntoResponse for UnsubscribeError {
    fn into_response(self) -> Response {
        match self {
            Self::ValidationError(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::StoreError(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        }
        .into_response()
    }
}
