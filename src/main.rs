use anyhow::{anyhow, Context};
use daily_words::{
    configuration::get_configuration,
    generator::ContentGenerator,
    mailer::SmtpMailer,
    store::{PgSubscriberStore, PgWordPoolStore},
    telemetry, App, AppState,
};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_subscriber(telemetry::get_subscriber(
        "daily_words".to_string(),
        std::io::stdout,
    ))?;

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let database = configuration.database();

    let pg_pool = PgPoolOptions::new()
        .acquire_timeout(database.timeout())
        .connect_lazy_with(database.with_db());
    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .context("Failed to migrate the database.")?;

    let subscribers = PgSubscriberStore::new(
        pg_pool.clone(),
        database.subscribers_table_name().map_err(|e| anyhow!(e))?,
    );
    let word_pool = PgWordPoolStore::new(
        pg_pool.clone(),
        database.word_pool_table_name().map_err(|e| anyhow!(e))?,
    );
    let generator = ContentGenerator::try_from(configuration.generator()).map_err(|e| anyhow!(e))?;
    let mailer = SmtpMailer::try_from(configuration.email_client()).map_err(|e| anyhow!(e))?;

    let app_state = AppState::new(
        subscribers,
        word_pool,
        generator,
        mailer,
        configuration.campaign().clone(),
    );

    let listener = TcpListener::bind(configuration.application().address())?;
    let app = App::build(listener, app_state)?;
    app.run_until(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for the shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    tracing::info!("Shutting down, closing the database pool");
    pg_pool.close().await;

    Ok(())
}
