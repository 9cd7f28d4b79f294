// src/ingest/providers/guardian.rs
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use scraper::Html;
use std::collections::HashSet;

use super::{element_text, selector, strip_rank_prefix, today_stamp, Page};
use crate::ingest::types::{Article, SourceProvider};

pub const GUARDIAN_URL: &str = "https://www.theguardian.com/uk";
const GUARDIAN_BASE: &str = "https://www.theguardian.com";

const MOST_VIEWED_SOURCE: &str = "Guardian Most Viewed";
const MOST_VIEWED_SCORE: i64 = 8;
const FALLBACK_SOURCE: &str = "The Guardian";
const FALLBACK_SCORE: i64 = 7;

/// "Most viewed" block of the Guardian front, or featured article links when
/// the block is missing from the page.
pub struct GuardianProvider {
    page: Page,
    limit: usize,
}

impl GuardianProvider {
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

fn looks_like_article_path(href: &str) -> bool {
    static RE: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE.get_or_init(|| regex::Regex::new(r"/\d{4}/").unwrap());
    href.contains("/article/") || re.is_match(href)
}

fn parse_front(html: &str, base: &url::Url, published: &str, limit: usize) -> Result<Vec<Article>> {
    let doc = Html::parse_document(html);
    let blocks = selector("section, div, aside")?;
    let headings = selector("h2, h3")?;
    let anchors = selector("a[href]")?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for block in doc.select(&blocks) {
        let Some(heading) = block.select(&headings).next() else {
            continue;
        };
        if !element_text(&heading).to_lowercase().contains("most viewed") {
            continue;
        }
        for a in block.select(&anchors) {
            let href = a.value().attr("href").unwrap_or_default();
            let text = element_text(&a);
            if href.is_empty() || text.chars().count() <= 15 || seen.contains(href) {
                continue;
            }
            let Ok(full) = base.join(href) else {
                continue;
            };
            seen.insert(href.to_string());
            out.push(
                Article::new(strip_rank_prefix(&text), full.to_string(), MOST_VIEWED_SOURCE)
                    .with_score(MOST_VIEWED_SCORE)
                    .with_published(published),
            );
        }
        break;
    }

    if out.is_empty() {
        for a in doc.select(&anchors) {
            let href = a.value().attr("href").unwrap_or_default();
            if !looks_like_article_path(href) || seen.contains(href) {
                continue;
            }
            let title = element_text(&a);
            if title.chars().count() <= 20 {
                continue;
            }
            let Ok(full) = base.join(href) else {
                continue;
            };
            seen.insert(href.to_string());
            out.push(
                Article::new(title, full.to_string(), FALLBACK_SOURCE)
                    .with_score(FALLBACK_SCORE)
                    .with_published(published),
            );
            if out.len() >= limit {
                break;
            }
        }
    }

    Ok(out)
}

#[async_trait]
impl SourceProvider for GuardianProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        let html = self.page.load().await?;
        let base = self.page.base_url(GUARDIAN_BASE)?;
        let mut out = parse_front(&html, &base, &today_stamp(), self.limit)?;
        out.truncate(self.limit);
        tracing::info!(count = out.len(), provider = "Guardian", "guardian parsed");
        Ok(out)
    }

    fn name(&self) -> &str {
        "Guardian"
    }
}
