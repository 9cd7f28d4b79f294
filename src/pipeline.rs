// src/pipeline.rs
//! One aggregation run: cache gate → (fetch → dedup → rank → persist) → categorize
//! → render → splice into the page.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::cache_gate::{CacheOutcome, DailyCache};
use crate::categorize::CategoryTable;
use crate::config::PipelineConfig;
use crate::ingest::{self, types::SourceProvider};
use crate::render;

/// What a run did, for logging and tests.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub cache_path: PathBuf,
    pub outcome: CacheOutcome,
    /// Articles in the day's snapshot.
    pub articles: usize,
    /// Duplicates dropped; 0 when the snapshot was reused.
    pub dedup: usize,
    /// Snapshot articles whose `published` falls on the run's weekday.
    pub published_today: usize,
    pub sections: usize,
    pub rendered_articles: usize,
}

pub struct Pipeline {
    cfg: PipelineConfig,
    table: CategoryTable,
    providers: Vec<Box<dyn SourceProvider>>,
}

impl Pipeline {
    pub fn new(
        cfg: PipelineConfig,
        table: CategoryTable,
        providers: Vec<Box<dyn SourceProvider>>,
    ) -> Self {
        Self {
            cfg,
            table,
            providers,
        }
    }

    pub async fn run(&self, today: NaiveDate) -> Result<RunReport> {
        let cache = DailyCache::from_config(&self.cfg.cache);

        let mut dedup = 0usize;
        let dedup_out = &mut dedup;
        let providers = &self.providers;
        let (articles, outcome) = cache
            .get_or_fetch(today, || async move {
                tracing::info!(providers = providers.len(), "fetching trending news");
                let (kept, dropped) = ingest::run_once(providers).await;
                *dedup_out = dropped;
                kept
            })
            .await?;

        let weekday = today.format("%a").to_string();
        let published_today = ingest::published_on_weekday(&articles, &weekday).len();

        let groups = self.table.group_top_n(&articles, self.cfg.render.per_category);
        for name in self.table.display_order() {
            let Some(items) = groups.get(&name).filter(|v| !v.is_empty()) else {
                continue;
            };
            for (i, a) in items.iter().enumerate() {
                let short: String = a.title.chars().take(55).collect();
                tracing::info!(category = %name, rank = i + 1, score = a.trending_score, title = %short, "top article");
            }
        }

        let rendered = render::render_sections(&groups, &self.table);
        let html_path = &self.cfg.render.html_path;
        let doc = tokio::fs::read_to_string(html_path)
            .await
            .with_context(|| format!("reading page {}", html_path.display()))?;
        let updated = render::splice(
            &doc,
            &rendered.html,
            &self.cfg.render.start_marker,
            &self.cfg.render.end_marker,
        )
        .with_context(|| format!("splicing into {}", html_path.display()))?;
        tokio::fs::write(html_path, updated)
            .await
            .with_context(|| format!("writing page {}", html_path.display()))?;

        tracing::info!(
            path = %html_path.display(),
            articles = rendered.articles,
            sections = rendered.sections,
            "page updated"
        );

        Ok(RunReport {
            cache_path: cache.path_for(today),
            outcome,
            articles: articles.len(),
            dedup,
            published_today,
            sections: rendered.sections,
            rendered_articles: rendered.articles,
        })
    }
}
