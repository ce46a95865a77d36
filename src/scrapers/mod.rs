//! Site-specific HTML extraction.
//!
//! Each submodule owns the CSS selectors for one news site and turns raw
//! markup into plain data. Nothing in here does I/O, so when a site changes
//! its DOM only its module needs touching.
//!
//! Every scraper module exports:
//! - `extract_links(html, base_url, max)`: absolute, deduplicated article URLs
//!   from a listing page
//! - `extract_article(html)`: [`ArticleText`] from an article page
//!
//! # Supported Sources
//!
//! | Source | Module | Listing selector |
//! |--------|--------|------------------|
//! | CryptoSlate | [`cryptoslate`] | `section.object-details div.list-post a[href]` |

pub mod cryptoslate;

/// Title and body pulled out of an article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleText {
    /// Empty when the page has no `<h1>`.
    pub title: String,
    /// Paragraphs joined by `"\n\n"`; empty when no content container matched.
    pub content: String,
}
