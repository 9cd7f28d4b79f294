// tests/api_http.rs
//
// HTTP-level tests for the click-tracking Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /track-click, /api/track (count 0→1→2, validation)
// - GET /track-stats, /stats/category, /stats/source (+ /api aliases)
// - GET /api/test, /api/test/db

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use std::path::Path;
use tower::ServiceExt as _; // for `oneshot`

use trending_news::api::{self, AppState};
use trending_news::config::DbConfig;
use trending_news::tracking::ClickStore;

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router(clicks: &Path) -> Router {
    let db = DbConfig {
        host: "127.0.0.1".into(),
        port: 1,
        ..DbConfig::default()
    };
    api::router(AppState::new(ClickStore::new(clicks), db))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Json>) -> (StatusCode, Json) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(req.body(body).expect("build request"))
        .await
        .expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

#[tokio::test]
async fn health_returns_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&tmp.path().join("clicks.json"));
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn same_url_twice_counts_one_then_two() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("clicks.json");
    let app = test_router(&path);
    let click = json!({"url": "https://news.test/a", "title": "A", "category": "World", "source": "BBC Most Read"});

    let (s1, v1) = send(&app, "POST", "/track-click", Some(click.clone())).await;
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(v1, json!({"success": true, "total_clicks": 1}));

    let (s2, v2) = send(&app, "POST", "/api/track", Some(click)).await;
    assert_eq!(s2, StatusCode::OK);
    assert_eq!(v2["total_clicks"], 2);

    let stored: Json = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let rec = stored.as_object().unwrap().values().next().unwrap();
    assert_eq!(rec["count"], 2);
    assert_eq!(rec["url"], "https://news.test/a");
    assert!(rec["first_clicked"].as_str().unwrap() <= rec["last_clicked"].as_str().unwrap());
}

#[tokio::test]
async fn corrupt_store_fails_click_but_keeps_stats_readable() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("clicks.json");
    std::fs::write(&path, "[truncated").unwrap();
    let app = test_router(&path);

    let click = json!({"url": "https://news.test/a", "title": "A"});
    let (status, v) = send(&app, "POST", "/track-click", Some(click)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["success"], false);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[truncated");

    let (status, stats) = send(&app, "GET", "/track-stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["unique_articles"], 0);
}

#[tokio::test]
async fn missing_title_is_rejected_without_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("clicks.json");
    let app = test_router(&path);

    let (status, v) = send(&app, "POST", "/track-click", Some(json!({"url": "https://news.test/a"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], false);
    assert_eq!(v["error"], "Missing url or title");

    let (status, _) = send(&app, "POST", "/track-click", Some(json!({"url": "", "title": "t"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, v) = send(&app, "POST", "/track-click", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["success"], false);

    assert!(!path.exists(), "no record may be created");
    let (_, stats) = send(&app, "GET", "/track-stats", None).await;
    assert_eq!(stats["unique_articles"], 0);
}

#[tokio::test]
async fn stats_and_rollups_sorted_by_count() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&tmp.path().join("clicks.json"));

    let world = json!({"url": "https://news.test/w", "title": "W", "category": "World", "source": "NPR"});
    let tech1 = json!({"url": "https://news.test/t1", "title": "T1", "category": "Technology", "source": "Hacker News"});
    let tech2 = json!({"url": "https://news.test/t2", "title": "T2", "category": "Technology", "source": "Hacker News"});
    let bare = json!({"url": "https://news.test/u", "title": "U"});
    for c in [&tech1, &tech2, &tech2, &world, &world, &world, &world, &bare] {
        send(&app, "POST", "/api/track", Some(c.clone())).await;
    }

    let (status, stats) = send(&app, "GET", "/track-stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["success"], true);
    assert_eq!(stats["total_clicks"], 8);
    assert_eq!(stats["unique_articles"], 4);
    let articles = stats["articles"].as_array().unwrap();
    assert_eq!(articles[0]["url"], "https://news.test/w");
    assert_eq!(articles[0]["count"], 4);
    assert_eq!(articles[1]["url"], "https://news.test/t2");

    let (_, cats) = send(&app, "GET", "/stats/category", None).await;
    let cats = cats["categories"].as_array().unwrap();
    assert_eq!(cats[0], json!({"name": "World", "count": 4, "articles": 1}));
    assert_eq!(cats[1], json!({"name": "Technology", "count": 3, "articles": 2}));
    assert_eq!(cats[2]["name"], "Unknown");

    let (_, srcs) = send(&app, "GET", "/api/stats/source", None).await;
    let srcs = srcs["sources"].as_array().unwrap();
    assert_eq!(srcs[0]["name"], "NPR");
    assert_eq!(srcs[1]["name"], "Hacker News");

    let (_, alias) = send(&app, "GET", "/api/track", None).await;
    assert_eq!(alias["total_clicks"], 8);
}

#[tokio::test]
async fn probe_sample_payload() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&tmp.path().join("clicks.json"));
    let (status, v) = send(&app, "GET", "/api/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["success"], true);
    assert_eq!(v["message"], "API is reachable!");
    assert_eq!(v["articles"][0]["title"], "Test Article 1");
    assert_eq!(v["articles"][1]["trending_score"], 17);
}

#[tokio::test]
async fn probe_db_failure_is_structured_500() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test_router(&tmp.path().join("clicks.json"));
    let (status, v) = send(&app, "GET", "/api/test/db", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["success"], false);
    assert!(v["message"].as_str().unwrap().starts_with("DB error:"));
    assert!(v.get("article_count").is_none());
}
