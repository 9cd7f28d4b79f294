// src/ingest/providers/mod.rs
//! One fetcher per external source, plus the shared HTTP client and the
//! default provider set built from `FetchConfig`.
//!
//! Every provider can be built from an embedded fixture (tests) or a live URL.
//! Scores are source-native and not comparable across sources: RSS items carry 0,
//! Hacker News and Reddit carry upvotes, scrapers assign fixed rank constants.

pub mod bbc;
pub mod guardian;
pub mod hacker_news;
pub mod npr;
pub mod reddit;
pub mod rss;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::OnceCell;
use scraper::{ElementRef, Selector};
use std::time::Duration;

use crate::config::FetchConfig;
use crate::ingest::types::SourceProvider;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client with the per-request timeout and browser UA the scrapers need.
pub fn http_client(cfg: &FetchConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .user_agent(cfg.user_agent.clone())
        .build()
        .context("building http client")
}

/// Providers in the fixed fetch order: BBC, HN, Reddit, Guardian, NPR, then RSS feeds.
/// Sources missing from `cfg.sources` are skipped.
pub fn default_providers(cfg: &FetchConfig) -> Result<Vec<Box<dyn SourceProvider>>> {
    let client = http_client(cfg)?;
    let enabled = |name: &str| cfg.sources.iter().any(|s| s.eq_ignore_ascii_case(name));

    let mut out: Vec<Box<dyn SourceProvider>> = Vec::new();
    if enabled("bbc") {
        out.push(Box::new(
            bbc::BbcMostReadProvider::from_url(client.clone(), bbc::BBC_NEWS_URL)
                .with_limit(cfg.scrape_limit),
        ));
    }
    if enabled("hacker_news") {
        out.push(Box::new(hacker_news::HackerNewsProvider::new(
            client.clone(),
            hacker_news::HN_API_BASE,
            cfg.hn_limit,
            cfg.hn_concurrency,
        )));
    }
    if enabled("reddit") {
        out.push(Box::new(reddit::RedditProvider::new(
            client.clone(),
            reddit::REDDIT_BASE,
            cfg.reddit_subreddits.clone(),
            cfg.reddit_limit,
        )));
    }
    if enabled("guardian") {
        out.push(Box::new(
            guardian::GuardianProvider::from_url(client.clone(), guardian::GUARDIAN_URL)
                .with_limit(cfg.scrape_limit),
        ));
    }
    if enabled("npr") {
        out.push(Box::new(
            npr::NprProvider::from_url(client.clone(), npr::NPR_NEWS_URL)
                .with_limit(cfg.scrape_limit),
        ));
    }
    if enabled("rss") {
        for feed in &cfg.rss_feeds {
            out.push(Box::new(
                rss::RssProvider::from_url(client.clone(), feed).with_limit(cfg.rss_limit),
            ));
        }
    }
    Ok(out)
}

/// Where a scraper's HTML comes from.
pub(crate) enum Page {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl Page {
    pub(crate) fn base_url(&self, default_base: &str) -> Result<url::Url> {
        let raw = match self {
            Page::Fixture(_) => default_base,
            Page::Http { url, .. } => url.as_str(),
        };
        url::Url::parse(raw).with_context(|| format!("parsing base url {raw}"))
    }

    pub(crate) async fn load(&self) -> Result<String> {
        match self {
            Page::Fixture(s) => Ok(s.clone()),
            Page::Http { url, client } => client
                .get(url)
                .send()
                .await
                .with_context(|| format!("get {url}"))?
                .error_for_status()
                .with_context(|| format!("status {url}"))?
                .text()
                .await
                .with_context(|| format!("read body {url}")),
        }
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e}"))
}

/// Visible text of an element, whitespace-collapsed.
pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    crate::ingest::normalize_text(&el.text().collect::<Vec<_>>().join(" "))
}

/// Fetch-day stamp used as `published` by sources that do not expose one.
pub(crate) fn today_stamp() -> String {
    chrono::Local::now().format("%a, %d %b %Y").to_string()
}

/// "1Andrew..." -> "Andrew..."; most-read lists prefix titles with their rank.
pub(crate) fn strip_rank_prefix(title: &str) -> String {
    static RE: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE.get_or_init(|| regex::Regex::new(r"^\d+\s*").unwrap());
    re.replace(title, "").trim().to_string()
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}
