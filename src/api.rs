// src/api.rs
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::config::{DbConfig, ServerConfig};
use crate::probe;
use crate::tracking::{ArticleClicks, ClickEvent, ClickStore, Rollup};

#[derive(Clone)]
pub struct AppState {
    clicks: Arc<Mutex<ClickStore>>,
    db: Arc<DbConfig>,
}

impl AppState {
    pub fn new(clicks: ClickStore, db: DbConfig) -> Self {
        Self {
            clicks: Arc::new(Mutex::new(clicks)),
            db: Arc::new(db),
        }
    }

    pub fn from_config(cfg: &ServerConfig) -> Self {
        Self::new(ClickStore::new(cfg.clicks_path.clone()), cfg.db.clone())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Click tracking + connectivity probe routes, CORS open for the static site.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/track-stats", get(track_stats))
        .route("/track-click", post(track_click))
        .route("/stats/category", get(category_stats))
        .route("/stats/source", get(source_stats))
        .route("/api/track", get(track_stats).post(track_click))
        .route("/api/stats/category", get(category_stats))
        .route("/api/stats/source", get(source_stats))
        .route("/api/test", get(api_test))
        .route("/api/test/db", get(api_test_db))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ClickReq {
    url: Option<String>,
    title: Option<String>,
    category: Option<String>,
    source: Option<String>,
}

impl ClickReq {
    fn into_event(self) -> Result<ClickEvent, ApiError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        match (non_empty(self.url), non_empty(self.title)) {
            (Some(url), Some(title)) => Ok(ClickEvent {
                url,
                title,
                category: non_empty(self.category),
                source: non_empty(self.source),
            }),
            _ => Err(ApiError::BadRequest("Missing url or title".to_string())),
        }
    }
}

#[derive(Serialize)]
struct TrackResp {
    success: bool,
    total_clicks: u64,
}

async fn track_click(
    State(state): State<AppState>,
    body: Result<Json<ClickReq>, JsonRejection>,
) -> Result<Json<TrackResp>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let event = req.into_event()?;

    let store = state.clicks.lock().await;
    let rec = store.record_click(event).await?;
    Ok(Json(TrackResp {
        success: true,
        total_clicks: rec.count,
    }))
}

#[derive(Serialize)]
struct StatsResp {
    success: bool,
    total_clicks: u64,
    unique_articles: usize,
    articles: Vec<ArticleClicks>,
    by_category: Vec<Rollup>,
    by_source: Vec<Rollup>,
}

async fn track_stats(State(state): State<AppState>) -> Json<StatsResp> {
    let s = state.clicks.lock().await.stats().await;
    Json(StatsResp {
        success: true,
        total_clicks: s.total_clicks,
        unique_articles: s.unique_articles,
        articles: s.articles,
        by_category: s.by_category,
        by_source: s.by_source,
    })
}

#[derive(Serialize)]
struct CategoriesResp {
    success: bool,
    categories: Vec<Rollup>,
}

async fn category_stats(State(state): State<AppState>) -> Json<CategoriesResp> {
    let categories = state.clicks.lock().await.rollup_by_category().await;
    Json(CategoriesResp {
        success: true,
        categories,
    })
}

#[derive(Serialize)]
struct SourcesResp {
    success: bool,
    sources: Vec<Rollup>,
}

async fn source_stats(State(state): State<AppState>) -> Json<SourcesResp> {
    let sources = state.clicks.lock().await.rollup_by_source().await;
    Json(SourcesResp {
        success: true,
        sources,
    })
}

async fn api_test() -> Json<probe::SamplePayload> {
    Json(probe::sample_payload())
}

async fn api_test_db(State(state): State<AppState>) -> (StatusCode, Json<probe::DbProbe>) {
    let r = probe::probe_db(&state.db).await;
    let status = if r.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(r))
}
