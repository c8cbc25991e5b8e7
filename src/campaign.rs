use crate::{
    configuration::CampaignSettings,
    email_template::render_daily_words,
    generator::{ContentGenerator, GenerationError},
    mailer::{deliver_to_all, FailedDelivery, Mailer},
    store::{StoreError, SubscriberStore, WordPoolError, WordPoolStore},
};

/// Summary of a campaign send, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CampaignReport {
    pub words: [String; 2],
    pub recipients: usize,
    pub delivered: Vec<String>,
    pub failed: Vec<FailedDelivery>,
}

/// Pick two words, have them enriched, render the email and deliver it to
/// every subscriber.
///
/// Everything up to the delivery aborts the campaign on failure. The consumed
/// words are not returned to the pool in that case. Delivery failures are
/// reported per recipient.
#[tracing::instrument(
    name = "Send the daily words campaign",
    skip_all,
    fields(words = tracing::field::Empty)
)]
pub async fn send_campaign(
    word_pool: &dyn WordPoolStore,
    generator: &ContentGenerator,
    subscribers: &dyn SubscriberStore,
    mailer: &dyn Mailer,
    settings: &CampaignSettings,
) -> Result<CampaignReport, CampaignError> {
    let words = word_pool
        .consume_two()
        .await
        .map_err(CampaignError::NoWords)?;
    tracing::Span::current().record("words", &tracing::field::debug(&words));

    let [first, second] = generator
        .enrich(&words)
        .await
        .map_err(CampaignError::Generation)?;

    let email = render_daily_words(
        &first,
        &second,
        settings.subject(),
        settings.unsubscribe_url(),
    )
    .map_err(CampaignError::Render)?;

    let recipients = subscribers
        .list()
        .await
        .map_err(CampaignError::FailedToGetSubscribers)?;

    let report = deliver_to_all(mailer, &recipients, &email).await;
    tracing::info!(
        delivered = report.delivered.len(),
        failed = report.failed.len(),
        "Campaign sent"
    );

    Ok(CampaignReport {
        words,
        recipients: recipients.len(),
        delivered: report.delivered,
        failed: report.failed,
    })
}

/// Represent the different errors that abort a campaign send.
#[derive(thiserror::Error)]
pub enum CampaignError {
    #[error("Failed to pick words for the campaign")]
    NoWords(#[source] WordPoolError),
    #[error("Failed to generate the words' definitions")]
    Generation(#[source] GenerationError),
    #[error("Failed to render the email")]
    Render(#[source] askama::Error),
    #[error("Failed to get subscribers")]
    FailedToGetSubscribers(#[source] StoreError),
}
