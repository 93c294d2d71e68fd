//! Entry point: wires configuration, the database, background services and
//! the HTTP router together.

use std::time::Duration;

use db::DBService;
use server::{AppState, app};
use services::services::{
    config::Config, notification::NotificationService, reminder::AppointmentReminderService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init();

    let _sentry_guard = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let config = Config::from_env()?;
    if let Some(path) = config.database_url.strip_prefix("sqlite:")
        && let Some(parent) = std::path::Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let db = DBService::new(&config.database_url).await?;

    AppointmentReminderService::spawn(
        db.clone(),
        NotificationService::new(db.clone()),
        Duration::from_secs(config.reminder_poll_secs),
        config.reminder_horizon_hours,
    )
    .await;

    let bind_addr = config.bind_addr;
    let state = AppState::new(db, config);
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("listening on {}", bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
