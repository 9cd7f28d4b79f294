// src/ingest/providers/hacker_news.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Deserialize;

use super::today_stamp;
use crate::ingest::types::{Article, SourceProvider};

pub const HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
const SOURCE: &str = "Hacker News";

#[derive(Debug, Deserialize)]
struct HnItem {
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    descendants: i64,
}

/// Top stories via the public Firebase API. Upvotes are the trending score.
/// Only link stories survive; Ask HN / jobs / polls have no outbound `url`.
pub struct HackerNewsProvider {
    client: reqwest::Client,
    base_url: String,
    limit: usize,
    concurrency: usize,
}

impl HackerNewsProvider {
    pub fn new(client: reqwest::Client, base_url: &str, limit: usize, concurrency: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            concurrency: concurrency.max(1),
        }
    }

    async fn top_story_ids(&self) -> Result<Vec<u64>> {
        let url = format!("{}/topstories.json", self.base_url);
        let ids: Vec<u64> = self
            .client
            .get(&url)
            .send()
            .await
            .context("hn topstories get()")?
            .error_for_status()
            .context("hn topstories status")?
            .json()
            .await
            .context("hn topstories json")?;
        Ok(ids.into_iter().take(self.limit).collect())
    }

    async fn story(&self, id: u64) -> Result<HnItem> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        let item = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("hn item {id} get()"))?
            .json::<HnItem>()
            .await
            .with_context(|| format!("hn item {id} json"))?;
        Ok(item)
    }
}

fn to_article(item: HnItem, published: &str) -> Option<Article> {
    if item.kind.as_deref() != Some("story") {
        return None;
    }
    let link = item.url.filter(|u| !u.trim().is_empty())?;
    let summary = format!(
        "Score: {} | Comments: {}",
        item.score, item.descendants
    );
    Some(
        Article::new(item.title.unwrap_or_default(), link, SOURCE)
            .with_score(item.score)
            .with_published(published)
            .with_summary(summary),
    )
}

#[async_trait]
impl SourceProvider for HackerNewsProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let ids = self.top_story_ids().await?;
        let published = today_stamp();
        let published = &published;

        // `buffered` keeps the topstories order while bounding in-flight requests.
        let items: Vec<Option<Article>> = stream::iter(ids)
            .map(|id| async move {
                match self.story(id).await {
                    Ok(item) => to_article(item, published),
                    Err(e) => {
                        tracing::debug!(error = ?e, id, "hn item skipped");
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let out: Vec<Article> = items.into_iter().flatten().collect();
        tracing::info!(count = out.len(), provider = SOURCE, "hn stories parsed");
        Ok(out)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
