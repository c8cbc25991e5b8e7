pub mod campaign;
pub mod configuration;
pub mod domain;
pub mod email_template;
mod error;
pub mod generator;
pub mod mailer;
mod routes;
mod state;
pub mod store;
pub mod telemetry;

pub use state::AppState;

use axum::{Router, Server};
use std::{future::Future, net::TcpListener};

#[derive(Debug)]
pub struct App {
    listener: TcpListener,
    port: u16,
    router: Router,
}

impl App {
    /// Build the app serving the given state on the given [`TcpListener`].
    pub fn build(listener: TcpListener, app_state: AppState) -> anyhow::Result<Self> {
        let port = listener.local_addr()?.port();
        let router = Self::build_router(&app_state);

        Ok(Self {
            listener,
            port,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve requests until the process is stopped.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve requests until `shutdown` completes, then finish the in-flight
    /// requests and return.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        tracing::info!("Server running at {}", self.listener.local_addr()?);

        Server::from_tcp(self.listener)?
            .serve(self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    /// Builder the router for the application.
    fn build_router(app_state: &AppState) -> Router {
        use tower_http::{
            cors::CorsLayer,
            trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
        };
        use tracing::Level;

        routes::build_router(app_state)
            .layer(CorsLayer::permissive())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
    }
}
