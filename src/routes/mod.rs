use crate::state::AppState;
use axum::Router;

pub mod admin;
pub mod campaigns;
pub mod health;
pub mod subscriptions;

pub fn build_router(app_state: &AppState) -> Router {
    Router::new()
        .merge(health::create_router())
        .merge(subscriptions::create_router())
        .merge(campaigns::create_router())
        .merge(admin::create_router())
        .with_state(app_state.clone())
}
