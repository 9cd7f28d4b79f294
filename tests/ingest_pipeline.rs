// tests/ingest_pipeline.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use trending_news::ingest::types::{Article, SourceProvider};

struct MockProvider {
    name: &'static str,
    items: Vec<Article>,
}

#[async_trait]
impl SourceProvider for MockProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Ok(self.items.clone())
    }
    fn name(&self) -> &str {
        self.name
    }
}

struct Broken;

#[async_trait]
impl SourceProvider for Broken {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        Err(anyhow!("connection reset"))
    }
    fn name(&self) -> &str {
        "Broken"
    }
}

#[tokio::test]
async fn failing_source_is_isolated_and_results_are_ranked() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(MockProvider {
            name: "first",
            items: vec![
                Article::new("rss item", "https://a.test/1", "Feed"),
                Article::new("scraped", "https://a.test/2", "BBC Most Read").with_score(10),
            ],
        }),
        Box::new(Broken),
        Box::new(MockProvider {
            name: "second",
            items: vec![
                Article::new("upvoted", "https://b.test/1", "Hacker News").with_score(500),
                Article::new("dup of rss item", "https://A.test/1/", "Other").with_score(900),
            ],
        }),
    ];

    let (out, dedup) = trending_news::ingest::run_once(&providers).await;
    assert_eq!(dedup, 1);
    let titles: Vec<&str> = out.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["upvoted", "scraped", "rss item"]);
}

#[tokio::test]
async fn no_providers_no_articles() {
    let (out, dedup) = trending_news::ingest::run_once(&[]).await;
    assert!(out.is_empty());
    assert_eq!(dedup, 0);
}
