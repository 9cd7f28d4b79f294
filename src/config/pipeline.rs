// src/config/pipeline.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::providers::DEFAULT_USER_AGENT;

pub const ENV_TRENDING_CONFIG_PATH: &str = "TRENDING_CONFIG_PATH";
pub const DEFAULT_TRENDING_TOML: &str = "config/trending.toml";
pub const DEFAULT_TRENDING_JSON: &str = "config/trending.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
    pub render: RenderConfig,
    /// Category table (TOML). `None` → built-in seed.
    pub categories_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Enabled providers: "bbc", "hacker_news", "reddit", "guardian", "npr", "rss".
    pub sources: Vec<String>,
    pub hn_limit: usize,
    pub hn_concurrency: usize,
    pub reddit_subreddits: Vec<String>,
    pub reddit_limit: usize,
    pub rss_feeds: Vec<String>,
    pub rss_limit: usize,
    pub scrape_limit: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sources: ["bbc", "hacker_news", "reddit", "guardian", "npr", "rss"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            hn_limit: 15,
            hn_concurrency: 4,
            reddit_subreddits: ["news", "worldnews", "technology"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reddit_limit: 10,
            rss_feeds: Vec::new(),
            rss_limit: 10,
            scrape_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub prefix: String,
    pub ext: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            prefix: "trending_news".to_string(),
            ext: "json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub html_path: PathBuf,
    pub start_marker: String,
    pub end_marker: String,
    pub per_category: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            html_path: PathBuf::from("site/trend.html"),
            start_marker: crate::render::DEFAULT_START_MARKER.to_string(),
            end_marker: crate::render::DEFAULT_END_MARKER.to_string(),
            per_category: 3,
        }
    }
}

impl PipelineConfig {
    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?,
            _ => toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?,
        };
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $TRENDING_CONFIG_PATH
    /// 2) config/trending.toml
    /// 3) config/trending.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_TRENDING_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("TRENDING_CONFIG_PATH points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from(DEFAULT_TRENDING_TOML);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_TRENDING_JSON);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }
}
