//! The scraping run, start to finish.
//!
//! ```text
//! [market on: spot price -> chart] -> fetch listing -> extract links
//!   -> for each link: fetch -> extract -> drop if empty -> keep
//!   -> write JSON + CSV if anything was kept
//! ```
//!
//! Everything is sequential. Between two article fetches the run sleeps for
//! `request_delay`, whatever happened to the previous article. Only a failure
//! to write the output files is returned as an error.

use crate::config::ScraperConfig;
use crate::error::PersistError;
use crate::fetch::{PageFetcher, fetch_or_log};
use crate::market;
use crate::models::{ArticleRecord, OutputEnvelope, PriceSnapshot};
use crate::outputs::{json, tabular};
use crate::scrapers::cryptoslate;
use crate::utils::utc_timestamp;
use tokio::fs;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The listing page could not be fetched. Nothing was written.
    NoListing,
    /// The listing page had no matching article links. Nothing was written.
    NoLinks,
    /// Every link was visited. Files are written only when `records > 0`.
    Completed { records: usize, written: bool },
}

/// Run one scrape with `config`, fetching through `fetcher`.
#[instrument(level = "info", skip_all, fields(start_url = %config.start_url))]
pub async fn run<F: PageFetcher>(
    config: &ScraperConfig,
    fetcher: &F,
) -> Result<RunOutcome, PersistError> {
    let snapshot = match &config.market {
        Some(market_config) => {
            let fetched_at = utc_timestamp();
            let price = market::fetch_spot_price(fetcher, market_config).await;
            if let Some(chart_path) = config.chart_path() {
                market::fetch_price_chart(fetcher, market_config, &chart_path).await;
            }
            Some(PriceSnapshot { price, fetched_at })
        }
        None => None,
    };

    info!(url = %config.start_url, "Downloading listing page");
    let Some(listing) = fetch_or_log(fetcher, &config.start_url).await else {
        warn!("No listing response; stopping");
        return Ok(RunOutcome::NoListing);
    };

    let links = cryptoslate::extract_links(&listing, &config.start_url, config.max_articles);
    info!(count = links.len(), "Found article links");
    if links.is_empty() {
        warn!("No article links found; the listing selector may need updating");
        return Ok(RunOutcome::NoLinks);
    }

    let articles = collect_articles(config, fetcher, &links).await;
    info!(count = articles.len(), "Scraped articles");

    if articles.is_empty() {
        return Ok(RunOutcome::Completed {
            records: 0,
            written: false,
        });
    }

    let records = articles.len();
    let envelope = OutputEnvelope::build(articles, snapshot);
    persist(config, &envelope).await?;

    Ok(RunOutcome::Completed {
        records,
        written: true,
    })
}

/// Visit each link in order and keep the articles that have content.
async fn collect_articles<F: PageFetcher>(
    config: &ScraperConfig,
    fetcher: &F,
    links: &[String],
) -> Vec<ArticleRecord> {
    let total = links.len();
    let mut articles = Vec::new();

    for (idx, link) in links.iter().enumerate() {
        if idx > 0 && !config.request_delay.is_zero() {
            sleep(config.request_delay).await;
        }
        info!(index = idx + 1, total, %link, "Fetching article");

        let Some(html) = fetch_or_log(fetcher, link).await else {
            continue;
        };

        let text = cryptoslate::extract_article(&html);
        if text.content.is_empty() {
            warn!(%link, "No article content found; skipping");
            continue;
        }

        info!(chars = text.content.chars().count(), "Extracted article content");
        articles.push(ArticleRecord::new(text.title, link.clone(), text.content));
    }

    articles
}

async fn ensure_output_dir(config: &ScraperConfig) -> Result<(), PersistError> {
    fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|source| PersistError::Io {
            path: config.output_dir.clone(),
            source,
        })
}

async fn persist(config: &ScraperConfig, envelope: &OutputEnvelope) -> Result<(), PersistError> {
    ensure_output_dir(config).await?;
    let json_path = config.json_path();
    let csv_path = config.csv_path();
    json::save_json(envelope, &json_path).await?;
    tabular::save_csv(envelope, &csv_path).await?;
    info!(json = %json_path.display(), csv = %csv_path.display(), "Saved output");
    Ok(())
}
