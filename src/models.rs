//! Data models for scraped articles and the persisted output.
//!
//! - [`ArticleRecord`]: one scraped article, as written to JSON and CSV
//! - [`PriceSnapshot`]: spot price taken at the start of an enriched run
//! - [`Candle`]: the two kline fields the chart needs
//! - [`OutputEnvelope`]: the top-level structure written to disk

use crate::utils::utc_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scraped news article.
///
/// Field order is the column order of the CSV output.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Text of the first `<h1>`, possibly empty.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Host component of `link`.
    pub source: String,
    /// Paragraphs joined by a blank line.
    pub content: String,
    /// UTC fetch time, ISO-8601 with trailing `Z`.
    pub fetched_at: String,
}

impl ArticleRecord {
    /// Build a record stamped with the current time. `source` is derived
    /// from `link` so the two can never disagree.
    pub fn new(title: String, link: String, content: String) -> Self {
        let source = source_of(&link);
        Self {
            title,
            link,
            source,
            content,
            fetched_at: utc_timestamp(),
        }
    }
}

/// Host of `link`, or an empty string if it has none.
pub fn source_of(link: &str) -> String {
    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Spot price taken once per enriched run.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    /// `None` when the ticker lookup failed.
    pub price: Option<f64>,
    pub fetched_at: String,
}

/// One kline, reduced to what the chart plots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub close: f64,
}

/// What gets written to the JSON and CSV sinks.
///
/// `Plain` serializes as a bare array of records, `Priced` as an object with
/// the price metadata and an `articles` array.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OutputEnvelope {
    Plain(Vec<ArticleRecord>),
    Priced {
        price: Option<f64>,
        fetched_at: String,
        articles: Vec<ArticleRecord>,
    },
}

impl OutputEnvelope {
    /// Wrap `articles` in the layout matching whether a snapshot was taken.
    pub fn build(articles: Vec<ArticleRecord>, snapshot: Option<PriceSnapshot>) -> Self {
        match snapshot {
            None => OutputEnvelope::Plain(articles),
            Some(PriceSnapshot { price, fetched_at }) => OutputEnvelope::Priced {
                price,
                fetched_at,
                articles,
            },
        }
    }

    pub fn articles(&self) -> &[ArticleRecord] {
        match self {
            OutputEnvelope::Plain(articles) => articles,
            OutputEnvelope::Priced { articles, .. } => articles,
        }
    }
}
