//! Click-tracking service: binary entrypoint
//! Boots the Axum HTTP server: click tracking, connectivity probe, `/metrics`.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trending_news::api::{self, AppState};
use trending_news::config::ServerConfig;
use trending_news::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ServerConfig::from_env();
    tracing::info!(clicks = %cfg.clicks_path.display(), db_host = %cfg.db.host, "starting click tracker");

    let metrics = Metrics::install()?;
    let router = api::router(AppState::from_config(&cfg)).merge(metrics.router());

    Ok(router.into())
}
