use std::net::TcpListener;
use std::sync::Arc;

use anyhow::Context;

use freegames::app;
use freegames::notifier::Notifier;
use freegames::repo::{PgGameHistoryRepo, PgSubscriptionRepo};
use freegames::settings::Settings;
use freegames::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info", std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load().context("Failed to load settings")?;

    let pool = settings.database.pool();
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let notifier = Notifier::new(
        settings.catalog.client()?,
        Arc::new(PgGameHistoryRepo::new(pool.clone())),
        Arc::new(PgSubscriptionRepo::new(pool)),
        Arc::new(settings.email.client()?),
    );

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    app::run(listener, notifier, settings.admin)?
        .await
        .context("Failed to run app")
}
