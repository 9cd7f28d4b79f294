//! # Categorizer
//!
//! Buckets articles into topical categories using an immutable [`CategoryTable`]
//! passed in by the caller.
//!
//! - Source allowlist short-circuits (e.g. "Hacker News" → Technology).
//! - Otherwise each keyword contained in the lower-cased title adds 2, each
//!   keyword contained in the lower-cased link adds 1.
//! - Strictly highest total wins; on equal nonzero totals the category listed
//!   first in the table wins. Nothing above zero → fallback ("General").
//! - Matching is plain substring containment, so short keywords ("un", "app")
//!   also hit inside longer words.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::{fs, path::Path};

use crate::ingest::types::Article;

pub const DEFAULT_FALLBACK: &str = "General";
pub const DEFAULT_COLOR: &str = "#6c757d";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Source labels that map straight to this category.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_fallback() -> String {
    DEFAULT_FALLBACK.to_string()
}

/// Read-only category configuration. Iteration order is significant (tie-break).
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryTable {
    #[serde(rename = "category")]
    categories: Vec<CategoryDef>,
    #[serde(default = "default_fallback")]
    fallback: String,
    /// Section order for rendering. Empty → table order followed by the fallback.
    #[serde(default)]
    display_order: Vec<String>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl CategoryTable {
    pub fn new(categories: Vec<CategoryDef>, fallback: &str) -> Self {
        Self {
            categories,
            fallback: fallback.to_string(),
            display_order: Vec::new(),
        }
        .with_lowercase_keywords()
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let t: CategoryTable = toml::from_str(s).context("parsing category table")?;
        Ok(t.with_lowercase_keywords())
    }

    // Titles and links are lower-cased before matching.
    fn with_lowercase_keywords(mut self) -> Self {
        for c in &mut self.categories {
            c.keywords = c.keywords.iter().map(|k| k.to_lowercase()).collect();
        }
        self
    }

    /// Load a TOML table. Falls back to `default_seed()` when the file is
    /// missing or malformed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s).unwrap_or_else(|e| {
                tracing::warn!(error = ?e, path = %path.display(), "category table invalid, using seed");
                Self::default_seed()
            }),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "category table unreadable, using seed");
                Self::default_seed()
            }
        }
    }

    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn color_for(&self, name: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.color.as_str())
            .unwrap_or(DEFAULT_COLOR)
    }

    /// Fixed section priority for rendering.
    pub fn display_order(&self) -> Vec<String> {
        if !self.display_order.is_empty() {
            return self.display_order.clone();
        }
        let mut order: Vec<String> = self.categories.iter().map(|c| c.name.clone()).collect();
        if !order.iter().any(|n| n == &self.fallback) {
            order.push(self.fallback.clone());
        }
        order
    }

    /// Category name for one article. Pure: same article + same table → same answer.
    pub fn categorize(&self, article: &Article) -> &str {
        if let Some(c) = self
            .categories
            .iter()
            .find(|c| c.sources.iter().any(|s| s == &article.source))
        {
            return &c.name;
        }

        let title = article.title.to_lowercase();
        let link = article.link.to_lowercase();

        let mut best: Option<&CategoryDef> = None;
        let mut best_score = 0u32;
        for c in &self.categories {
            let score = keyword_score(&c.keywords, &title, &link);
            if score > best_score {
                best_score = score;
                best = Some(c);
            }
        }

        best.map(|c| c.name.as_str()).unwrap_or(&self.fallback)
    }

    /// Set `category` on every article.
    pub fn assign(&self, articles: &mut [Article]) {
        for a in articles.iter_mut() {
            let cat = self.categorize(a).to_string();
            a.category = Some(cat);
        }
    }

    /// Categorize, group, sort each group by score (stable, descending) and keep the top `n`.
    /// The input is untouched; lower-ranked articles only drop out of this view.
    pub fn group_top_n(&self, articles: &[Article], n: usize) -> BTreeMap<String, Vec<Article>> {
        let mut groups: BTreeMap<String, Vec<Article>> = BTreeMap::new();
        for a in articles {
            let mut a = a.clone();
            let cat = self.categorize(&a).to_string();
            a.category = Some(cat.clone());
            groups.entry(cat).or_default().push(a);
        }
        for items in groups.values_mut() {
            crate::rank::sort_by_trending(items);
            items.truncate(n);
        }
        groups
    }

    /// Built-in table: seven topical buckets plus the "General" fallback.
    pub fn default_seed() -> Self {
        fn def(name: &str, keywords: &[&str], sources: &[&str], color: &str) -> CategoryDef {
            CategoryDef {
                name: name.to_string(),
                keywords: keywords.iter().map(|s| s.to_string()).collect(),
                sources: sources.iter().map(|s| s.to_string()).collect(),
                color: color.to_string(),
            }
        }

        let categories = vec![
            def(
                "Technology",
                &[
                    "ai", "artificial intelligence", "tech", "software", "app", "google", "apple",
                    "microsoft", "amazon", "meta", "nvidia", "chip", "semiconductor", "robot",
                    "cyber", "hack", "data", "algorithm", "startup", "silicon valley", "openai",
                    "chatgpt", "machine learning", "computer", "internet", "digital",
                    "smartphone", "iphone", "android", "cloud", "api",
                ],
                &["Hacker News", "Reddit r/technology"],
                "#007bff",
            ),
            def(
                "Politics",
                &[
                    "trump", "biden", "congress", "senate", "election", "vote", "democrat",
                    "republican", "president", "governor", "mayor", "legislation", "bill", "law",
                    "court", "judge", "supreme court", "political", "campaign", "immigration",
                    "border", "policy", "federal",
                ],
                &[],
                "#dc3545",
            ),
            def(
                "World",
                &[
                    "ukraine", "russia", "china", "europe", "asia", "africa", "middle east", "war",
                    "military", "troops", "nato", "un", "united nations", "diplomatic", "embassy",
                    "international", "foreign", "global", "country", "nation", "invasion",
                    "conflict",
                ],
                &["Reddit r/worldnews"],
                "#28a745",
            ),
            def(
                "Business",
                &[
                    "stock", "market", "economy", "inflation", "fed", "bank", "invest", "ceo",
                    "company", "billion", "million", "profit", "revenue", "ipo", "merger",
                    "acquisition", "wall street", "dow", "nasdaq", "s&p", "crypto", "bitcoin",
                    "earnings", "layoff", "job",
                ],
                &[],
                "#fd7e14",
            ),
            def(
                "Science",
                &[
                    "nasa", "space", "planet", "star", "climate", "environment", "research",
                    "study", "scientist", "discovery", "species", "ocean", "earth", "moon", "mars",
                    "rocket", "medicine", "health", "disease", "virus", "vaccine", "cancer",
                    "brain", "dna",
                ],
                &[],
                "#6f42c1",
            ),
            def(
                "Entertainment",
                &[
                    "movie", "film", "tv", "show", "netflix", "disney", "actor", "actress",
                    "celebrity", "music", "album", "concert", "game", "gaming", "playstation",
                    "xbox", "nintendo", "oscar", "grammy", "emmy", "streaming", "youtube",
                    "tiktok", "viral",
                ],
                &[],
                "#e83e8c",
            ),
            def(
                "Sports",
                &[
                    "nfl", "nba", "mlb", "nhl", "soccer", "football", "basketball", "baseball",
                    "hockey", "tennis", "golf", "olympic", "championship", "playoff",
                    "super bowl", "world cup", "team", "player", "coach", "score", "game", "match",
                    // listed twice on purpose: a title hit scores 4
                    "win", "championship",
                ],
                &[],
                "#20c997",
            ),
        ];

        Self::new(categories, DEFAULT_FALLBACK)
    }
}

fn keyword_score(keywords: &[String], title: &str, link: &str) -> u32 {
    keywords.iter().fold(0, |acc, k| {
        let mut s = acc;
        if title.contains(k.as_str()) {
            s += 2;
        }
        if link.contains(k.as_str()) {
            s += 1;
        }
        s
    })
}
