use crate::{
    campaign::{send_campaign, CampaignError},
    configuration::CampaignSettings,
    generator::ContentGenerator,
    mailer::Mailer,
    state::AppState,
    store::{SubscriberStore, WordPoolError, WordPoolStore},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Create a router to serve endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/campaigns", post(publish_campaign))
}

/// Send today's words to every subscriber. Responds once every delivery has
/// been attempted.
#[tracing::instrument(
    name = "Publish the daily words",
    skip(word_pool, generator, subscribers, mailer, settings)
)]
async fn publish_campaign(
    State(word_pool): State<Arc<dyn WordPoolStore>>,
    State(generator): State<Arc<ContentGenerator>>,
    State(subscribers): State<Arc<dyn SubscriberStore>>,
    State(mailer): State<Arc<dyn Mailer>>,
    State(settings): State<Arc<CampaignSettings>>,
) -> Result<impl IntoResponse, CampaignError> {
    let report = send_campaign(
        word_pool.as_ref(),
        &generator,
        subscribers.as_ref(),
        mailer.as_ref(),
        &settings,
    )
    .await?;

    Ok(Json(report))
}

impl IntoResponse for CampaignError {
    fn into_response(self) -> Response {
        tracing::error!(error.cause_chain = ?self, error.message = %self, "Campaign aborted");
        let status = match &self {
            Self::NoWords(WordPoolError::Missing | WordPoolError::Exhausted { .. }) => {
                StatusCode::CONFLICT
            }
            Self::NoWords(WordPoolError::Store(_))
            | Self::Generation(_)
            | Self::Render(_)
            | Self::FailedToGetSubscribers(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, format!("{self}: {}", root_cause(&self))).into_response()
    }
}

/// The innermost error, which usually explains the failure best.
fn root_cause(e: &(dyn std::error::Error + 'static)) -> String {
    let mut current = e;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
