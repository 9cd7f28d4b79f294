//! # Ranker
//! Orders articles by trending score, highest first.
//!
//! The sort is stable: equal scores keep their prior relative order, so the
//! same input always ranks the same way. Scores come from different scales
//! per source (upvotes vs. fixed rank constants vs. 0 for RSS); the ordering
//! across sources is a heuristic, not a normalized metric.

use crate::ingest::types::Article;

/// Stable descending sort by `trending_score`.
pub fn sort_by_trending(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.trending_score.cmp(&a.trending_score));
}

/// Owned variant for pipeline chaining.
pub fn ranked(mut articles: Vec<Article>) -> Vec<Article> {
    sort_by_trending(&mut articles);
    articles
}
