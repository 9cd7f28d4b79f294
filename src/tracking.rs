//! # Click tracking
//! File-backed click counter keyed by a hash of the article URL.
//!
//! The whole store is one JSON object `{ "<sha256 hex>": ClickRecord, ... }`.
//! Every operation reads the file, mutates in memory and writes it back; there
//! is no locking beyond what the caller wraps around a `ClickStore`.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tokio::fs;

pub const UNKNOWN: &str = "Unknown";
const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("clicks_recorded_total", "Click events written to the store.");
    });
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRecord {
    pub url: String,
    pub title: String,
    #[serde(default = "unknown")]
    pub category: String,
    #[serde(default = "unknown")]
    pub source: String,
    #[serde(default)]
    pub count: u64,
    pub first_clicked: String,
    pub last_clicked: String,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// A validated click: `url` and `title` are non-empty.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub url: String,
    pub title: String,
    pub category: Option<String>,
    pub source: Option<String>,
}

/// Per-article entry in the stats listing.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleClicks {
    pub key: String,
    #[serde(flatten)]
    pub record: ClickRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rollup {
    pub name: String,
    pub count: u64,
    pub articles: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClickStats {
    pub total_clicks: u64,
    pub unique_articles: usize,
    pub articles: Vec<ArticleClicks>,
    pub by_category: Vec<Rollup>,
    pub by_source: Vec<Rollup>,
}

pub type ClickMap = BTreeMap<String, ClickRecord>;

/// Hex SHA-256 of the raw URL.
pub fn url_key(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone)]
pub struct ClickStore {
    path: PathBuf,
}

impl ClickStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read side. Missing file → empty. Unreadable or unparsable file → warning + empty.
    pub async fn load(&self) -> ClickMap {
        self.try_load().await.unwrap_or_else(|e| {
            tracing::warn!(error = ?e, path = %self.path.display(), "click store unusable, reading as empty");
            ClickMap::new()
        })
    }

    /// Missing or blank file → empty; read and parse failures are errors.
    pub async fn try_load(&self) -> Result<ClickMap> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ClickMap::new()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", self.path.display())),
        };
        if raw.trim().is_empty() {
            return Ok(ClickMap::new());
        }
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    pub async fn save(&self, clicks: &ClickMap) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_vec_pretty(clicks).context("serializing clicks")?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("writing {}", self.path.display()))
    }

    pub async fn record_click(&self, event: ClickEvent) -> Result<ClickRecord> {
        self.record_click_at(event, chrono::Local::now().naive_local())
            .await
    }

    /// Increment (or create) the record for `event.url` and persist.
    /// `first_clicked`, title, category and source are fixed by the first click.
    /// A store that cannot be read or parsed is left untouched and the click fails.
    pub async fn record_click_at(&self, event: ClickEvent, now: NaiveDateTime) -> Result<ClickRecord> {
        ensure_metrics_described();

        let stamp = now.format(TIMESTAMP_FMT).to_string();
        let key = url_key(&event.url);
        let mut clicks = self.try_load().await?;

        let rec = clicks
            .entry(key.clone())
            .and_modify(|r| {
                r.count += 1;
                r.last_clicked = stamp.clone();
            })
            .or_insert_with(|| ClickRecord {
                url: event.url.clone(),
                title: event.title.clone(),
                category: event.category.clone().unwrap_or_else(unknown),
                source: event.source.clone().unwrap_or_else(unknown),
                count: 1,
                first_clicked: stamp.clone(),
                last_clicked: stamp.clone(),
            })
            .clone();

        self.save(&clicks).await?;
        counter!("clicks_recorded_total").increment(1);
        tracing::info!(key = %key, count = rec.count, source = %rec.source, "click recorded");
        Ok(rec)
    }

    pub async fn stats(&self) -> ClickStats {
        let clicks = self.load().await;
        let total_clicks = clicks.values().map(|r| r.count).sum();

        let mut articles: Vec<ArticleClicks> = clicks
            .iter()
            .map(|(k, r)| ArticleClicks {
                key: k.clone(),
                record: r.clone(),
            })
            .collect();
        articles.sort_by(|a, b| b.record.count.cmp(&a.record.count));

        ClickStats {
            total_clicks,
            unique_articles: clicks.len(),
            articles,
            by_category: rollup(&clicks, |r| &r.category),
            by_source: rollup(&clicks, |r| &r.source),
        }
    }

    pub async fn rollup_by_category(&self) -> Vec<Rollup> {
        rollup(&self.load().await, |r| &r.category)
    }

    pub async fn rollup_by_source(&self) -> Vec<Rollup> {
        rollup(&self.load().await, |r| &r.source)
    }
}

/// Sum clicks and count articles per group, highest click count first
/// (ties by name for a stable listing).
fn rollup<F>(clicks: &ClickMap, group: F) -> Vec<Rollup>
where
    F: Fn(&ClickRecord) -> &String,
{
    let mut acc: HashMap<&str, (u64, u64)> = HashMap::new();
    for r in clicks.values() {
        let e = acc.entry(group(r).as_str()).or_default();
        e.0 += r.count;
        e.1 += 1;
    }
    let mut out: Vec<Rollup> = acc
        .into_iter()
        .map(|(name, (count, articles))| Rollup {
            name: name.to_string(),
            count,
            articles,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 4)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn click(url: &str, category: Option<&str>) -> ClickEvent {
        ClickEvent {
            url: url.into(),
            title: format!("title {url}"),
            category: category.map(Into::into),
            source: None,
        }
    }

    #[test]
    fn url_key_is_hex_sha256() {
        let k = url_key("https://x.test/a");
        assert_eq!(k.len(), 64);
        assert!(k.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(k, url_key("https://x.test/b"));
    }

    #[tokio::test]
    async fn repeat_clicks_increment_and_keep_first_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ClickStore::new(tmp.path().join("nested/clicks.json"));

        let r1 = store.record_click_at(click("https://x.test/a", None), at(9, 0)).await.unwrap();
        assert_eq!(r1.count, 1);
        assert_eq!(r1.category, "Unknown");
        assert_eq!(r1.first_clicked, "2025-12-04 09:00:00");

        let r2 = store.record_click_at(click("https://x.test/a", Some("Tech")), at(9, 30)).await.unwrap();
        assert_eq!(r2.count, 2);
        assert_eq!(r2.first_clicked, "2025-12-04 09:00:00");
        assert_eq!(r2.last_clicked, "2025-12-04 09:30:00");
        assert_eq!(r2.category, "Unknown");
    }

    #[tokio::test]
    async fn invalid_store_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clicks.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = ClickStore::new(&path);
        assert!(store.load().await.is_empty());
        assert!(store.stats().await.articles.is_empty());
        assert!(store.rollup_by_source().await.is_empty());
    }

    #[tokio::test]
    async fn click_on_invalid_store_fails_without_overwriting() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clicks.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = ClickStore::new(&path);

        let err = store
            .record_click_at(click("https://x.test/a", None), at(1, 0))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[tokio::test]
    async fn blank_store_accepts_first_click() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clicks.json");
        std::fs::write(&path, "  \n").unwrap();
        let store = ClickStore::new(&path);

        store.record_click_at(click("https://x.test/a", None), at(1, 0)).await.unwrap();
        assert_eq!(store.try_load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rollups_sum_and_sort() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ClickStore::new(tmp.path().join("clicks.json"));
        for _ in 0..3 {
            store.record_click_at(click("https://x.test/w", Some("World")), at(1, 0)).await.unwrap();
        }
        store.record_click_at(click("https://x.test/t1", Some("Tech")), at(1, 0)).await.unwrap();
        store.record_click_at(click("https://x.test/t2", Some("Tech")), at(1, 0)).await.unwrap();

        let cats = store.rollup_by_category().await;
        assert_eq!(cats[0].name, "World");
        assert_eq!((cats[0].count, cats[0].articles), (3, 1));
        assert_eq!(cats[1].name, "Tech");
        assert_eq!((cats[1].count, cats[1].articles), (2, 2));

        let stats = store.stats().await;
        assert_eq!(stats.total_clicks, 5);
        assert_eq!(stats.unique_articles, 3);
        assert_eq!(stats.articles[0].record.url, "https://x.test/w");
        assert_eq!(stats.by_source.len(), 1);
        assert_eq!(stats.by_source[0].name, "Unknown");
    }
}
