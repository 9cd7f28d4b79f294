// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A single headline as produced by a fetcher, snapshotted to the daily cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String, // identity key, see `ingest::canonical_link`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>, // free text, format varies per source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub source: String, // e.g., "Hacker News", "BBC Most Read"
    #[serde(default)]
    pub trending_score: i64, // RSS = 0, upvotes for HN/Reddit, fixed rank for scrapers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published: None,
            summary: None,
            source: source.into(),
            trending_score: 0,
            category: None,
        }
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.trending_score = score;
        self
    }

    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// One external source. Implementations enforce their own item cap.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Article>>;
    fn name(&self) -> &str;
}
