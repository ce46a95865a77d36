//! # Coin News
//!
//! Scrapes cryptocurrency news from a coin listing page, extracts the title
//! and body of each linked article, and saves them as JSON and CSV.
//! Optionally adds the current spot price and a price chart from an exchange.
//!
//! ## Usage
//!
//! ```sh
//! coin_news                  # CryptoSlate Bitcoin news into ./
//! coin_news --market -o out  # plus BTCUSDT price and chart
//! ```
//!
//! ## Architecture
//!
//! 1. **Enrichment** (optional): spot price, then candle chart
//! 2. **Indexing**: collect up to N article URLs from the listing page
//! 3. **Fetching**: download and extract each article in turn
//! 4. **Output**: write JSON and CSV when at least one article had content

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod market;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use fetch::HttpFetcher;
use pipeline::RunOutcome;

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("coin_news starting up");

    let config = Cli::parse().into_config();
    debug!(?config, "Resolved configuration");

    let fetcher = HttpFetcher::new(&config)?;
    let outcome = pipeline::run(&config, &fetcher).await?;

    match outcome {
        RunOutcome::NoListing => warn!(url = %config.start_url, "Listing page unavailable; nothing saved"),
        RunOutcome::NoLinks => warn!("No article links found; check the listing selector"),
        RunOutcome::Completed { records, written: true } => info!(
            records,
            json = %config.json_path().display(),
            csv = %config.csv_path().display(),
            "Saved articles"
        ),
        RunOutcome::Completed { written: false, .. } => {
            info!("No articles with content; nothing saved")
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
