// tests/metrics.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use trending_news::ingest::types::{Article, SourceProvider};
use trending_news::metrics::Metrics;
use trending_news::tracking::{ClickEvent, ClickStore};

struct OneArticle;

#[async_trait]
impl SourceProvider for OneArticle {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Ok(vec![
            Article::new("a", "https://m.test/a", "Feed"),
            Article::new("a dup", "https://m.test/a/", "Feed"),
        ])
    }
    fn name(&self) -> &str {
        "one"
    }
}

struct Failing;

#[async_trait]
impl SourceProvider for Failing {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Err(anyhow!("boom"))
    }
    fn name(&self) -> &str {
        "failing"
    }
}

#[tokio::test]
async fn metrics_endpoint_contains_ingest_and_click_series() {
    let metrics = Metrics::install().expect("recorder");
    // A second install in the same process reuses the recorder.
    let _again = Metrics::install().expect("idempotent install");

    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(OneArticle), Box::new(Failing)];
    let (kept, dedup) = trending_news::ingest::run_once(&providers).await;
    assert_eq!((kept.len(), dedup), (1, 1));

    let tmp = tempfile::tempdir().unwrap();
    ClickStore::new(tmp.path().join("clicks.json"))
        .record_click(ClickEvent {
            url: "https://m.test/a".into(),
            title: "a".into(),
            category: None,
            source: None,
        })
        .await
        .unwrap();

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "ingest_articles_total",
        "ingest_dedup_total",
        "ingest_provider_errors_total",
        "ingest_fetch_ms",
        "ingest_pipeline_last_run_ts",
        "clicks_recorded_total",
    ] {
        assert!(text.contains(needle), "metrics exposition missing '{needle}'\n{text}");
    }
}
