use crate::{
    configuration::CampaignSettings,
    generator::ContentGenerator,
    mailer::Mailer,
    store::{SubscriberStore, WordPoolStore},
};
use axum::extract::FromRef;
use derive_getters::Getters;
use duplicate::duplicate_item;
use std::sync::Arc;

/// The services every request handler may depend on. They are constructed
/// once at startup and shared between requests.
#[derive(Clone, Getters)]
pub struct AppState {
    subscribers: Arc<dyn SubscriberStore>,
    word_pool: Arc<dyn WordPoolStore>,
    generator: Arc<ContentGenerator>,
    mailer: Arc<dyn Mailer>,
    campaign: Arc<CampaignSettings>,
}

impl AppState {
    pub fn new(
        subscribers: impl SubscriberStore,
        word_pool: impl WordPoolStore,
        generator: ContentGenerator,
        mailer: impl Mailer,
        campaign: CampaignSettings,
    ) -> Self {
        Self {
            subscribers: Arc::new(subscribers),
            word_pool: Arc::new(word_pool),
            generator: Arc::new(generator),
            mailer: Arc::new(mailer),
            campaign: Arc::new(campaign),
        }
    }
}

#[duplicate_item(
    service_type            field;
    [ dyn SubscriberStore ] [ subscribers ];
    [ dyn WordPoolStore ]   [ word_pool ];
    [ ContentGenerator ]    [ generator ];
    [ dyn Mailer ]          [ mailer ];
    [ CampaignSettings ]    [ campaign ];
)]
impl FromRef<AppState> for Arc<service_type> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.field.clone()
    }
}
