// src/probe.rs
//! Connectivity probe: a static sample payload (is the API reachable and CORS
//! open?) and a MySQL round trip (is the database reachable?).

use serde::Serialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::time::Duration;

use crate::config::DbConfig;

pub const DB_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
pub struct SampleArticle {
    pub title: &'static str,
    pub source: &'static str,
    pub category: &'static str,
    pub url: &'static str,
    pub trending_score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplePayload {
    pub success: bool,
    pub message: &'static str,
    pub articles: [SampleArticle; 2],
}

pub fn sample_payload() -> SamplePayload {
    SamplePayload {
        success: true,
        message: "API is reachable!",
        articles: [
            SampleArticle {
                title: "Test Article 1",
                source: "Test Source",
                category: "Technology",
                url: "https://example.com/1",
                trending_score: 42,
            },
            SampleArticle {
                title: "Test Article 2",
                source: "Test Source",
                category: "World",
                url: "https://example.com/2",
                trending_score: 17,
            },
        ],
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DbProbe {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_count: Option<i64>,
}

/// `SELECT COUNT(*) FROM articles` against the configured database.
/// Never errors: failures come back as `success: false` with the reason.
pub async fn probe_db(cfg: &DbConfig) -> DbProbe {
    match tokio::time::timeout(DB_TIMEOUT, count_articles(cfg)).await {
        Ok(Ok(n)) => DbProbe {
            success: true,
            message: "Database connected!".to_string(),
            article_count: Some(n),
        },
        Ok(Err(e)) => {
            tracing::warn!(error = %e, host = %cfg.host, "db probe failed");
            DbProbe {
                success: false,
                message: format!("DB error: {e}"),
                article_count: None,
            }
        }
        Err(_) => {
            tracing::warn!(host = %cfg.host, "db probe timed out");
            DbProbe {
                success: false,
                message: format!("DB error: timed out after {}s", DB_TIMEOUT.as_secs()),
                article_count: None,
            }
        }
    }
}

async fn count_articles(cfg: &DbConfig) -> Result<i64, sqlx::Error> {
    let opts = MySqlConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.user)
        .password(&cfg.password)
        .database(&cfg.database);

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(DB_TIMEOUT)
        .connect_with(opts)
        .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
        .fetch_one(&pool)
        .await?;
    pool.close().await;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_payload_shape() {
        let v = serde_json::to_value(sample_payload()).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["articles"].as_array().unwrap().len(), 2);
        assert_eq!(v["articles"][1]["category"], "World");
        assert_eq!(v["articles"][0]["trending_score"], 42);
    }

    #[tokio::test]
    async fn unreachable_db_reports_failure() {
        let cfg = DbConfig {
            host: "127.0.0.1".into(),
            port: 1,
            ..DbConfig::default()
        };
        let r = probe_db(&cfg).await;
        assert!(!r.success);
        assert!(r.message.starts_with("DB error:"));
        assert!(r.article_count.is_none());
    }
}
