//! # Cache Gate
//! Day-granularity skip-if-exists guard around the fetch pipeline.
//!
//! The artifact for a day is `<dir>/<prefix>_<YYYYMMDD>.<ext>`, a pretty-printed
//! JSON array of articles. Once written it is never rewritten that day; later
//! runs load it instead of fetching. There is no eviction.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::future::Future;
use std::path::PathBuf;
use tokio::fs;

use crate::config::CacheConfig;
use crate::ingest::types::Article;

/// Whether a run fetched fresh data or reused the day's snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Fetched,
    Reused,
}

#[derive(Debug, Clone)]
pub struct DailyCache {
    dir: PathBuf,
    prefix: String,
    ext: String,
}

impl DailyCache {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str, ext: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
            ext: ext.trim_start_matches('.').to_string(),
        }
    }

    pub fn from_config(cfg: &CacheConfig) -> Self {
        Self::new(cfg.dir.clone(), &cfg.prefix, &cfg.ext)
    }

    pub fn file_name_for(&self, date: NaiveDate) -> String {
        format!("{}_{}.{}", self.prefix, date.format("%Y%m%d"), self.ext)
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(self.file_name_for(date))
    }

    pub async fn exists_for(&self, date: NaiveDate) -> bool {
        fs::try_exists(self.path_for(date)).await.unwrap_or(false)
    }

    pub async fn load(&self, date: NaiveDate) -> Result<Vec<Article>> {
        let path = self.path_for(date);
        let raw = fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading cache {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing cache {}", path.display()))
    }

    pub async fn store(&self, date: NaiveDate, articles: &[Article]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating cache dir {}", self.dir.display()))?;
        let path = self.path_for(date);
        let json = serde_json::to_vec_pretty(articles).context("serializing cache")?;
        fs::write(&path, json)
            .await
            .with_context(|| format!("writing cache {}", path.display()))?;
        tracing::info!(path = %path.display(), count = articles.len(), "cache written");
        Ok(path)
    }

    /// Reuse the day's artifact if present; otherwise run `fetch` once, persist its
    /// result, and hand back what was read from disk.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        date: NaiveDate,
        fetch: F,
    ) -> Result<(Vec<Article>, CacheOutcome)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Article>>,
    {
        if self.exists_for(date).await {
            tracing::info!(path = %self.path_for(date).display(), "using cached data");
            return Ok((self.load(date).await?, CacheOutcome::Reused));
        }

        let fresh = fetch().await;
        self.store(date, &fresh).await?;
        Ok((self.load(date).await?, CacheOutcome::Fetched))
    }
}
