// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::normalize_text;
use crate::ingest::types::{Article, SourceProvider};

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<AtomText>,
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

impl AtomEntry {
    /// `rel="alternate"` (or no rel) wins over other links.
    fn link(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| self.links.first())
            .and_then(|l| l.href.as_deref())
    }
}

/// One entry, whichever dialect it came from.
struct RawEntry {
    title: Option<String>,
    link: Option<String>,
    published: Option<String>,
    summary: Option<String>,
}

/// Generic RSS 2.0 / Atom feed. Source label is the channel title, falling back to the feed URL.
/// RSS carries no popularity signal, so every item scores 0.
pub struct RssProvider {
    mode: Mode,
    label: String,
    limit: usize,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssProvider {
    pub fn from_fixture(label: &str, xml: &str) -> Self {
        Self {
            mode: Mode::Fixture(xml.to_string()),
            label: label.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn from_url(client: reqwest::Client, url: &str) -> Self {
        Self {
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
            label: url.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<Article>> {
        let xml_clean = scrub_html_entities_for_xml(s);
        let (feed_title, entries) = if is_atom(&xml_clean) {
            parse_atom(&xml_clean).with_context(|| format!("parsing atom xml for {}", self.label))?
        } else {
            parse_rss(&xml_clean).with_context(|| format!("parsing rss xml for {}", self.label))?
        };

        let source = feed_title
            .as_deref()
            .map(normalize_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.label.clone());

        let mut out = Vec::with_capacity(entries.len().min(self.limit));
        for it in entries.into_iter().take(self.limit) {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            let link = it.link.map(|l| l.trim().to_string()).unwrap_or_default();
            if title.is_empty() || link.is_empty() {
                continue;
            }

            let mut a = Article::new(title, link, source.clone());
            a.published = it.published.map(|p| p.trim().to_string());
            a.summary = it
                .summary
                .as_deref()
                .map(normalize_text)
                .filter(|d| !d.is_empty());
            out.push(a);
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("rss get {url}"))?
                    .error_for_status()
                    .with_context(|| format!("rss status {url}"))?
                    .text()
                    .await
                    .context("rss .text()")?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// True when the document's root element is Atom's `<feed>`.
fn is_atom(xml: &str) -> bool {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => return e.local_name().as_ref() == b"feed",
            Ok(Event::Eof) | Err(_) => return false,
            Ok(_) => {}
        }
    }
}

fn parse_rss(xml: &str) -> Result<(Option<String>, Vec<RawEntry>)> {
    let rss: Rss = from_str(xml)?;
    let entries = rss
        .channel
        .item
        .into_iter()
        .map(|it| RawEntry {
            title: it.title,
            link: it.link,
            published: it.pub_date,
            summary: it.description,
        })
        .collect();
    Ok((rss.channel.title, entries))
}

fn parse_atom(xml: &str) -> Result<(Option<String>, Vec<RawEntry>)> {
    let feed: AtomFeed = from_str(xml)?;
    let entries = feed
        .entry
        .into_iter()
        .map(|e| {
            let link = e.link().map(str::to_string);
            RawEntry {
                title: e.title.map(|t| t.value),
                link,
                published: e.published.or(e.updated).map(|p| atom_date_to_rfc2822(&p)),
                summary: e.summary.or(e.content).map(|t| t.value),
            }
        })
        .collect();
    Ok((feed.title.map(|t| t.value), entries))
}

/// Atom stamps are RFC 3339; RSS ones are RFC 2822. Unparsable stamps pass through.
fn atom_date_to_rfc2822(raw: &str) -> String {
    OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .ok()
        .and_then(|dt| dt.format(&Rfc2822).ok())
        .unwrap_or_else(|| raw.trim().to_string())
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
