//! # Renderer
//! Turns the grouped top-N view into Bootstrap card markup and splices it into
//! the static page.
//!
//! Two splice strategies, tried in order:
//! 1. Explicit markers (`<!-- trending:start -->` … `<!-- trending:end -->`):
//!    everything between them is replaced, the markers stay.
//! 2. Legacy container match: the inner content of
//!    `<div class="row" id="tech-news-container">` up to its closing
//!    `</div></div></section>` run.
//!
//! A target that cannot be found, or matches more than once, is an error; the
//! document is never written half-updated.

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use thiserror::Error;
use time::{format_description, format_description::well_known::Rfc2822, OffsetDateTime};

use crate::categorize::CategoryTable;
use crate::ingest::providers::group_thousands;
use crate::ingest::types::Article;

pub const DEFAULT_START_MARKER: &str = "<!-- trending:start -->";
pub const DEFAULT_END_MARKER: &str = "<!-- trending:end -->";

const SUMMARY_MAX_CHARS: usize = 150;
const SCORE_VISIBLE_ABOVE: i64 = 100;
const RANK_COLORS: [&str; 3] = ["#ff4444", "#ff8800", "#ffbb00"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpliceError {
    #[error("splice target not found")]
    TargetNotFound,
    #[error("splice target is ambiguous ({0} matches)")]
    Ambiguous(usize),
}

/// Rendered fragment plus what went into it.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub html: String,
    pub sections: usize,
    pub articles: usize,
}

/// "Thu, 04 Dec 2025 19:00:00 +0000" -> "Dec 4, 2025". Anything else is shown as-is.
pub fn display_date(raw: &str) -> String {
    OffsetDateTime::parse(raw.trim(), &Rfc2822)
        .ok()
        .and_then(|dt| {
            let fmt = format_description::parse("[month repr:short] [day padding:none], [year]").ok()?;
            dt.format(&fmt).ok()
        })
        .unwrap_or_else(|| raw.to_string())
}

fn truncate_summary(s: &str) -> String {
    if s.chars().count() > SUMMARY_MAX_CHARS {
        let mut out: String = s.chars().take(SUMMARY_MAX_CHARS).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

fn attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).to_string()
}

fn text(s: &str) -> String {
    html_escape::encode_text(s).to_string()
}

/// One card. `rank` is 1-based position inside its category.
pub fn render_card(article: &Article, rank: usize, category: &str) -> String {
    let rank_badge = match RANK_COLORS.get(rank.wrapping_sub(1)) {
        Some(color) => format!(
            r#"<span class="badge" style="background-color: {color}; color: #fff; padding: 3px 8px; border-radius: 50%; font-size: 11px; margin-right: 5px;">#{rank}</span>"#
        ),
        None => String::new(),
    };

    let score_text = if article.trending_score > SCORE_VISIBLE_ABOVE {
        format!(
            "<small style='color: #28a745;'>Score: {}</small>",
            group_thousands(article.trending_score)
        )
    } else {
        String::new()
    };

    let summary = article.summary.as_deref().map(truncate_summary).unwrap_or_default();
    let published = article.published.as_deref().map(display_date).unwrap_or_default();
    let link = if article.link.is_empty() { "#" } else { article.link.as_str() };

    format!(
        r#"          <div class="col-md-6 col-lg-4 mb-4">
            <div class="card h-100" style="border: 1px solid #ddd; border-radius: 8px; overflow: hidden;">
              <div class="card-body">
                {rank_badge}<span class="badge" style="background-color: #ffbe33; color: #fff; padding: 5px 10px; border-radius: 4px; font-size: 12px;">{source}</span>
                <h5 class="card-title mt-2" style="font-weight: bold; color: #222;">{title}</h5>
                <p class="card-text" style="color: #666; font-size: 14px;">{summary}</p>
                <p style="color: #999; font-size: 12px;"><i class="fa fa-calendar"></i> {published} {score_text}</p>
                <a href="{href}" target="_blank" class="btn track-click" style="background-color: #222; color: #fff; padding: 8px 16px; border-radius: 4px; font-size: 14px;" data-title="{data_title}" data-source="{data_source}" data-category="{data_category}">Read More</a>
              </div>
            </div>
          </div>"#,
        source = text(&article.source),
        title = text(&article.title),
        summary = text(&summary),
        published = text(&published),
        href = attr(link),
        data_title = attr(&article.title),
        data_source = attr(&article.source),
        data_category = attr(category),
    )
}

/// A titled category block holding its cards in rank order.
pub fn render_section(name: &str, color: &str, articles: &[Article]) -> String {
    let cards = articles
        .iter()
        .enumerate()
        .map(|(i, a)| render_card(a, i + 1, a.category.as_deref().unwrap_or(name)))
        .collect::<Vec<_>>()
        .join("\n");
    let name = text(name);
    let color = attr(color);

    format!(
        r#"
        <!-- {name} Section -->
        <div class="category-section mb-5">
          <h3 style="color: {color}; border-bottom: 3px solid {color}; padding-bottom: 10px; margin-bottom: 20px;">
            <i class="fa fa-fire" style="margin-right: 8px;"></i>{name}
          </h3>
          <div class="row">
{cards}
          </div>
        </div>"#
    )
}

/// Sections in the table's display order; empty categories are skipped.
pub fn render_sections(groups: &BTreeMap<String, Vec<Article>>, table: &CategoryTable) -> Rendered {
    let mut out = Rendered::default();
    let mut parts = Vec::new();
    for name in table.display_order() {
        let Some(items) = groups.get(&name).filter(|v| !v.is_empty()) else {
            continue;
        };
        parts.push(render_section(&name, table.color_for(&name), items));
        out.sections += 1;
        out.articles += items.len();
    }
    out.html = parts.join("\n");
    out
}

fn legacy_container_re() -> &'static regex::Regex {
    static RE: OnceCell<regex::Regex> = OnceCell::new();
    RE.get_or_init(|| {
        regex::Regex::new(
            r#"(?s)(<div class="row" id="tech-news-container">).*?(</div>\s*</div>\s*</section>)"#,
        )
        .unwrap()
    })
}

/// Replace the splice target in `doc` with `fragment`.
pub fn splice(doc: &str, fragment: &str, start: &str, end: &str) -> Result<String, SpliceError> {
    let starts = doc.matches(start).count();
    let ends = doc.matches(end).count();

    if starts == 0 && ends == 0 {
        return splice_legacy_container(doc, fragment);
    }
    if starts > 1 || ends > 1 {
        return Err(SpliceError::Ambiguous(starts.max(ends)));
    }

    let (Some(s), Some(e)) = (doc.find(start), doc.find(end)) else {
        return Err(SpliceError::TargetNotFound);
    };
    let inner_from = s + start.len();
    if e < inner_from {
        return Err(SpliceError::TargetNotFound);
    }

    let mut out = String::with_capacity(doc.len() + fragment.len());
    out.push_str(&doc[..inner_from]);
    out.push('\n');
    out.push_str(fragment);
    out.push('\n');
    out.push_str(&doc[e..]);
    Ok(out)
}

fn splice_legacy_container(doc: &str, fragment: &str) -> Result<String, SpliceError> {
    let re = legacy_container_re();
    let hits: Vec<_> = re.captures_iter(doc).collect();
    let caps = match hits.len() {
        0 => return Err(SpliceError::TargetNotFound),
        1 => &hits[0],
        n => return Err(SpliceError::Ambiguous(n)),
    };

    let whole = caps.get(0).ok_or(SpliceError::TargetNotFound)?;
    let open = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let close = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    let mut out = String::with_capacity(doc.len() + fragment.len());
    out.push_str(&doc[..whole.start()]);
    out.push_str(open);
    out.push('\n');
    out.push_str(fragment);
    out.push_str("\n      ");
    out.push_str(close);
    out.push_str(&doc[whole.end()..]);
    Ok(out)
}
