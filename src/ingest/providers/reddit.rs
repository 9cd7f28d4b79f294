// src/ingest/providers/reddit.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::{group_thousands, today_stamp};
use crate::ingest::types::{Article, SourceProvider};

pub const REDDIT_BASE: &str = "https://www.reddit.com";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    is_self: bool,
    #[serde(default)]
    stickied: bool,
}

/// Hot listings of a few subreddits via the unauthenticated `.json` endpoint.
/// A failing subreddit is logged and skipped; the others still contribute.
pub struct RedditProvider {
    client: reqwest::Client,
    base_url: String,
    subreddits: Vec<String>,
    limit: usize,
}

impl RedditProvider {
    pub fn new(client: reqwest::Client, base_url: &str, subreddits: Vec<String>, limit: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            subreddits,
            limit,
        }
    }

    async fn hot(&self, subreddit: &str) -> Result<Listing> {
        let url = format!("{}/r/{}/hot.json", self.base_url, subreddit);
        self.client
            .get(&url)
            .query(&[("limit", self.limit.to_string())])
            .send()
            .await
            .with_context(|| format!("reddit r/{subreddit} get()"))?
            .error_for_status()
            .with_context(|| format!("reddit r/{subreddit} status"))?
            .json::<Listing>()
            .await
            .with_context(|| format!("reddit r/{subreddit} json"))
    }
}

fn listing_to_articles(listing: Listing, subreddit: &str, published: &str) -> Vec<Article> {
    let source = format!("Reddit r/{subreddit}");
    listing
        .data
        .children
        .into_iter()
        .map(|p| p.data)
        .filter(|d| !d.is_self && !d.stickied)
        .filter_map(|d| {
            let link = d.url.filter(|u| !u.trim().is_empty())?;
            let summary = format!(
                "Upvotes: {} | Comments: {}",
                group_thousands(d.score),
                group_thousands(d.num_comments)
            );
            Some(
                Article::new(d.title.unwrap_or_default(), link, source.clone())
                    .with_score(d.score)
                    .with_published(published)
                    .with_summary(summary),
            )
        })
        .collect()
}

#[async_trait]
impl SourceProvider for RedditProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let published = today_stamp();
        let mut out = Vec::new();
        for sub in &self.subreddits {
            match self.hot(sub).await {
                Ok(listing) => {
                    let mut items = listing_to_articles(listing, sub, &published);
                    tracing::info!(count = items.len(), subreddit = %sub, "reddit fetched");
                    out.append(&mut items);
                }
                Err(e) => {
                    tracing::warn!(error = ?e, subreddit = %sub, "reddit subreddit failed");
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "Reddit"
    }
}
