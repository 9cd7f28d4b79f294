// src/ingest/providers/bbc.rs
use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;
use std::collections::HashSet;

use super::{element_text, selector, strip_rank_prefix, today_stamp, Page};
use crate::ingest::types::{Article, SourceProvider};

pub const BBC_NEWS_URL: &str = "https://www.bbc.com/news";
const BBC_BASE: &str = "https://www.bbc.com";
const SOURCE: &str = "BBC Most Read";
const MOST_READ_SCORE: i64 = 10;

/// Scrapes the "Most Read" block of the BBC News homepage.
pub struct BbcMostReadProvider {
    page: Page,
    limit: usize,
}

impl BbcMostReadProvider {
    pub fn from_fixture(html: &str) -> Self {
        Self {
            page: Page::Fixture(html.to_string()),
            limit: 10,
        }
    }

    pub fn from_url(client: reqwest::Client, url: &str) -> Self {
        Self {
            page: Page::Http {
                url: url.to_string(),
                client,
            },
            limit: 10,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// First `section`/`div` whose first `h2` reads "Most Read"; keep its `/news/` links.
fn parse_most_read(html: &str, base: &url::Url, published: &str) -> Result<Vec<Article>> {
    let doc = Html::parse_document(html);
    let blocks = selector("section, div")?;
    let h2 = selector("h2")?;
    let anchors = selector("a[href]")?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for block in doc.select(&blocks) {
        let Some(heading) = block.select(&h2).next() else {
            continue;
        };
        if !element_text(&heading).to_lowercase().contains("most read") {
            continue;
        }

        for a in block.select(&anchors) {
            let href = a.value().attr("href").unwrap_or_default();
            if href.is_empty() || !href.contains("/news/") || seen.contains(href) {
                continue;
            }
            let Ok(full) = base.join(href) else {
                continue;
            };
            let title = strip_rank_prefix(&element_text(&a));
            if title.chars().count() > 10 {
                seen.insert(href.to_string());
                out.push(
                    Article::new(title, full.to_string(), SOURCE)
                        .with_score(MOST_READ_SCORE)
                        .with_published(published),
                );
            }
        }
        break;
    }

    Ok(out)
}

#[async_trait]
impl SourceProvider for BbcMostReadProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let html = self.page.load().await?;
        let base = self.page.base_url(BBC_BASE)?;
        let mut out = parse_most_read(&html, &base, &today_stamp())?;
        out.truncate(self.limit);
        tracing::info!(count = out.len(), provider = SOURCE, "bbc most read parsed");
        Ok(out)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
