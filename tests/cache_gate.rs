// tests/cache_gate.rs
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};

use trending_news::cache_gate::{CacheOutcome, DailyCache};
use trending_news::config::CacheConfig;
use trending_news::Article;

#[tokio::test]
async fn second_run_same_day_does_not_fetch() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = DailyCache::from_config(&CacheConfig {
        dir: tmp.path().to_path_buf(),
        prefix: "trending_news".into(),
        ext: "json".into(),
    });
    let day = NaiveDate::from_ymd_opt(2025, 12, 4).unwrap();
    let counter = AtomicUsize::new(0);
    let calls = &counter;

    let (first, o1) = cache
        .get_or_fetch(day, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![Article::new("morning", "https://a.test/1", "Feed").with_score(3)]
        })
        .await
        .unwrap();

    let (second, o2) = cache
        .get_or_fetch(day, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![Article::new("afternoon", "https://a.test/2", "Feed")]
        })
        .await
        .unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(o1, CacheOutcome::Fetched);
    assert_eq!(o2, CacheOutcome::Reused);
    assert_eq!(first, second);
    assert_eq!(second[0].title, "morning");
    assert!(tmp.path().join("trending_news_20251204.json").exists());
}

#[tokio::test]
async fn artifact_is_a_pretty_json_array() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = DailyCache::new(tmp.path().join("nested"), "t", "json");
    let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let path = cache
        .store(day, &[Article::new("x", "https://x.test", "S").with_summary("s")])
        .await
        .unwrap();

    let raw = std::fs::read_to_string(path).unwrap();
    assert!(raw.starts_with("[\n"));
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v[0]["title"], "x");
    assert_eq!(v[0]["trending_score"], 0);
    assert!(v[0].get("category").is_none());
}

#[tokio::test]
async fn corrupt_artifact_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = DailyCache::new(tmp.path(), "t", "json");
    let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    std::fs::write(cache.path_for(day), "not json").unwrap();

    let res = cache.get_or_fetch(day, || async { Vec::new() }).await;
    assert!(res.is_err());
}
