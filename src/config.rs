//! Run configuration.
//!
//! Every knob the scraper uses lives in an immutable [`ScraperConfig`] that is
//! built once in `main` (from the CLI) and handed to [`crate::pipeline::run`].
//! The `DEFAULT_*` constants are the values used when nothing is overridden.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_START_URL: &str = "https://cryptoslate.com/coins/bitcoin/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; CoinScraper/1.0)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_ARTICLES: usize = 25;

pub const DEFAULT_JSON_FILE: &str = "cryptoslate_bitcoin_news.json";
pub const DEFAULT_CSV_FILE: &str = "cryptoslate_bitcoin_news.csv";

pub const DEFAULT_MARKET_API: &str = "https://api.binance.com";
pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_INTERVAL: &str = "1h";
pub const DEFAULT_CANDLE_LIMIT: u32 = 100;
pub const DEFAULT_CHART_FILE: &str = "btc_price_chart.svg";

/// Everything a single scraping run needs to know.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Listing page the article links are collected from.
    pub start_url: String,
    /// Sent as `User-Agent` on every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Pause between successive article fetches.
    pub request_delay: Duration,
    /// Upper bound on the number of article links followed.
    pub max_articles: usize,
    /// Directory the JSON, CSV and chart files are written to.
    pub output_dir: PathBuf,
    pub json_file: String,
    pub csv_file: String,
    /// When set, the run is enriched with price data and the output uses the
    /// priced envelope layout.
    pub market: Option<MarketConfig>,
}

/// Exchange endpoint and chart parameters for the enriched run.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub api_base: String,
    pub symbol: String,
    pub interval: String,
    pub candle_limit: u32,
    pub chart_file: String,
}

impl ScraperConfig {
    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(&self.json_file)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(&self.csv_file)
    }

    /// Chart output path, only meaningful when market enrichment is on.
    pub fn chart_path(&self) -> Option<PathBuf> {
        self.market
            .as_ref()
            .map(|market| self.output_dir.join(&market.chart_file))
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            request_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            max_articles: DEFAULT_MAX_ARTICLES,
            output_dir: PathBuf::from("."),
            json_file: DEFAULT_JSON_FILE.to_string(),
            csv_file: DEFAULT_CSV_FILE.to_string(),
            market: None,
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_MARKET_API.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
            candle_limit: DEFAULT_CANDLE_LIMIT,
            chart_file: DEFAULT_CHART_FILE.to_string(),
        }
    }
}
