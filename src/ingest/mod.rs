// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{Article, SourceProvider};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_articles_total",
            "Articles returned by providers before dedup."
        );
        describe_counter!(
            "ingest_dedup_total",
            "Articles dropped as duplicate links."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("ingest_fetch_ms", "Provider fetch time in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when ingest pipeline last ran."
        );
    });
}

/// Normalize scraped/feed text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Dedup key: lower-cased, trailing slashes stripped.
pub fn canonical_link(link: &str) -> String {
    link.trim().trim_end_matches('/').to_lowercase()
}

/// Keep the first article per canonical link, in input order.
/// Articles with an empty link are dropped. Returns (kept, dropped_count).
///
/// First-seen wins even when a later duplicate carries a higher score.
pub fn dedup_by_link(articles: Vec<Article>) -> (Vec<Article>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(articles.len());
    let mut keep = Vec::with_capacity(articles.len());
    let mut dropped = 0usize;

    for a in articles {
        let key = canonical_link(&a.link);
        if key.is_empty() || !seen.insert(key) {
            dropped += 1;
            continue;
        }
        keep.push(a);
    }

    (keep, dropped)
}

/// Articles whose `published` starts with the given weekday abbreviation ("Mon", "Tue", ...).
/// RFC 2822 dates and the scrapers' "%a, %d %b %Y" stamps both lead with it.
pub fn published_on_weekday<'a>(articles: &'a [Article], weekday: &str) -> Vec<&'a Article> {
    articles
        .iter()
        .filter(|a| a.published.as_deref().is_some_and(|p| p.starts_with(weekday)))
        .collect()
}

/// Fetch every provider in order, isolate failures, dedup, and rank.
/// Returns (ranked articles, dedup_count).
pub async fn run_once(providers: &[Box<dyn SourceProvider>]) -> (Vec<Article>, usize) {
    ensure_metrics_described();

    let mut raw = Vec::new();
    for p in providers {
        let t0 = std::time::Instant::now();
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::info!(count = v.len(), provider = p.name(), "provider fetched");
                counter!("ingest_articles_total").increment(v.len() as u64);
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
            }
        }
        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    }

    let total = raw.len();
    let (mut kept, dedup_cnt) = dedup_by_link(raw);
    crate::rank::sort_by_trending(&mut kept);

    tracing::info!(
        fetched = total,
        unique = kept.len(),
        dedup = dedup_cnt,
        "ingest run finished"
    );

    let now = chrono::Utc::now().timestamp().max(0) as u64;
    counter!("ingest_dedup_total").increment(dedup_cnt as u64);
    gauge!("ingest_pipeline_last_run_ts").set(now as f64);

    (kept, dedup_cnt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(link: &str, score: i64) -> Article {
        Article::new(format!("t {link}"), link, "Test").with_score(score)
    }

    #[test]
    fn normalize_text_strips_tags_and_ws() {
        let s = "  <p>Hello,&nbsp;&nbsp; <b>world</b>!</p>  ";
        assert_eq!(normalize_text(s), "Hello, world!");
    }

    #[test]
    fn canonical_link_is_case_and_slash_insensitive() {
        assert_eq!(
            canonical_link("https://Example.com/A/"),
            canonical_link("https://example.com/a")
        );
    }

    #[test]
    fn dedup_keeps_first_seen_even_if_later_scores_higher() {
        let input = vec![
            art("https://x.test/a", 1),
            art("https://x.test/b", 2),
            art("HTTPS://X.TEST/A/", 99),
        ];
        let (kept, dropped) = dedup_by_link(input);
        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].trending_score, 1);
        assert_eq!(kept[1].link, "https://x.test/b");
    }

    #[test]
    fn dedup_drops_empty_links() {
        let (kept, dropped) = dedup_by_link(vec![art("", 5), art("/", 5), art("https://ok", 1)]);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn weekday_filter_matches_prefix() {
        let a = art("https://x/1", 0).with_published("Thu, 04 Dec 2025 19:00:00 +0000");
        let b = art("https://x/2", 0).with_published("Fri, 05 Dec 2025");
        let c = art("https://x/3", 0);
        let all = vec![a, b, c];
        let thu = published_on_weekday(&all, "Thu");
        assert_eq!(thu.len(), 1);
        assert_eq!(thu[0].link, "https://x/1");
    }
}
