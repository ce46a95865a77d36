//! CryptoSlate coin-page scraper.
//!
//! Coin pages such as `https://cryptoslate.com/coins/bitcoin/` carry a news
//! block (`section.object-details`) made of repeated `div.list-post` teasers,
//! each wrapping a link to the full story. Article pages put the headline in
//! an `<h1>` and the body paragraphs inside `div.post`; older templates only
//! have an `<article>` element, which is used as the fallback.
//!
//! These selectors track a third-party DOM. When the site changes, extraction
//! returns empty results instead of failing.

use super::ArticleText;
use crate::utils::normalize_whitespace;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

static LISTING_LINKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("section.object-details div.list-post a[href]").expect("valid selector")
});
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static POST_BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.post").expect("valid selector"));
static ARTICLE_BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("valid selector"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));

/// Collect article URLs from a listing page.
///
/// Hrefs are resolved against `base_url`, duplicates are dropped keeping the
/// first occurrence, and scanning stops once `max` URLs are collected.
///
/// # Returns
///
/// Absolute URLs in document order. Empty if nothing matched or `base_url`
/// is not a valid absolute URL.
pub fn extract_links(html: &str, base_url: &str, max: usize) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            warn!(%base_url, error = %e, "Listing base URL is not absolute");
            return Vec::new();
        }
    };

    let document = Html::parse_document(html);
    let links: Vec<String> = document
        .select(&LISTING_LINKS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.trim().is_empty())
        .filter_map(|href| match base.join(href) {
            Ok(resolved) => Some(resolved.to_string()),
            Err(e) => {
                debug!(%href, error = %e, "Skipping unresolvable href");
                None
            }
        })
        .unique()
        .take(max)
        .collect();

    debug!(count = links.len(), max, "Extracted listing links");
    links
}

/// Pull the headline and body text out of an article page.
pub fn extract_article(html: &str) -> ArticleText {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(flatten_text)
        .unwrap_or_default();

    let container = document
        .select(&POST_BODY)
        .next()
        .or_else(|| document.select(&ARTICLE_BODY).next());

    let content = match container {
        Some(body) => body
            .select(&PARAGRAPH)
            .map(flatten_text)
            .filter(|p| !p.is_empty())
            .join("\n\n"),
        None => String::new(),
    };

    ArticleText { title, content }
}

/// All text under `element`, inline markup stripped and spacing collapsed.
///
/// Text nodes are joined with a space before collapsing, so words split by
/// inline tags (`Bitcoin<b>up</b>`) stay apart instead of being glued.
fn flatten_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().join(" "))
}
