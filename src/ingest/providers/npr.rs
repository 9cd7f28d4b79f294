// src/ingest/providers/npr.rs
use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;

use super::{element_text, selector, today_stamp, Page};
use crate::ingest::types::{Article, SourceProvider};

pub const NPR_NEWS_URL: &str = "https://www.npr.org/sections/news/";
const NPR_BASE: &str = "https://www.npr.org";
const SOURCE: &str = "NPR";
const NPR_SCORE: i64 = 7;

/// Story cards (`article.item`) on the NPR news section page.
pub struct NprProvider {
    page: Page,
    limit: usize,
}

impl NprProvider {
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

/// The cap applies to cards, not to parsed articles: a card without a link or
/// heading still uses up a slot.
fn parse_cards(html: &str, base: &url::Url, published: &str, limit: usize) -> Result<Vec<Article>> {
    let doc = Html::parse_document(html);
    let cards = selector("article.item")?;
    let anchor = selector("a[href]")?;
    let heading = selector("h2, h3")?;

    let mut out = Vec::new();
    for card in doc.select(&cards).take(limit) {
        let (Some(a), Some(h)) = (card.select(&anchor).next(), card.select(&heading).next()) else {
            continue;
        };
        let href = a.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() {
            continue;
        }
        let Ok(link) = base.join(href) else {
            continue;
        };
        let title = element_text(&h);
        if title.is_empty() {
            continue;
        }
        out.push(
            Article::new(title, link.to_string(), SOURCE)
                .with_score(NPR_SCORE)
                .with_published(published),
        );
    }
    Ok(out)
}

#[async_trait]
impl SourceProvider for NprProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let html = self.page.load().await?;
        let base = self.page.base_url(NPR_BASE)?;
        let out = parse_cards(&html, &base, &today_stamp(), self.limit)?;
        tracing::info!(count = out.len(), provider = SOURCE, "npr parsed");
        Ok(out)
    }

    fn name(&self) -> &str {
        SOURCE
    }
}
