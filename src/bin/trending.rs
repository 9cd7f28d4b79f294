//! Runs the trending pipeline once for today's local date and updates the page.

use anyhow::Result;
use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trending_news::cache_gate::CacheOutcome;
use trending_news::categorize::CategoryTable;
use trending_news::config::PipelineConfig;
use trending_news::ingest::providers::default_providers;
use trending_news::Pipeline;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("TRENDING_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_target(false)).init();
    } else {
        registry.with(fmt::layer().compact().with_target(false)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PipelineConfig::load_default()?;
    let table = match &cfg.categories_path {
        Some(p) => CategoryTable::load_from_file(p),
        None => CategoryTable::default_seed(),
    };
    let providers = default_providers(&cfg.fetch)?;

    let today = Local::now().date_naive();
    let report = Pipeline::new(cfg, table, providers).run(today).await?;

    let how = match report.outcome {
        CacheOutcome::Fetched => "fetched",
        CacheOutcome::Reused => "cached",
    };
    tracing::info!(
        cache = %report.cache_path.display(),
        source = how,
        articles = report.articles,
        dedup = report.dedup,
        published_today = report.published_today,
        sections = report.sections,
        rendered = report.rendered_articles,
        "trending run finished"
    );
    Ok(())
}
