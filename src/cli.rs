//! Command-line interface definitions for Coin News.
//!
//! Every option has a default, so running the binary with no arguments
//! scrapes the CryptoSlate Bitcoin page into the current directory.

use crate::config::{
    DEFAULT_CANDLE_LIMIT, DEFAULT_CHART_FILE, DEFAULT_CSV_FILE, DEFAULT_DELAY_MS,
    DEFAULT_INTERVAL, DEFAULT_JSON_FILE, DEFAULT_MARKET_API, DEFAULT_MAX_ARTICLES,
    DEFAULT_START_URL, DEFAULT_SYMBOL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, MarketConfig,
    ScraperConfig,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the Coin News scraper.
///
/// # Examples
///
/// ```sh
/// # Plain article list
/// coin_news
///
/// # Add the BTCUSDT spot price and a 1h candle chart
/// coin_news --market -o ./out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing page to collect article links from
    #[arg(long, default_value = DEFAULT_START_URL)]
    pub start_url: String,

    /// Maximum number of articles to follow
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_ARTICLES)]
    pub max_articles: usize,

    /// Pause between article requests, in milliseconds
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Directory for the output files
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// JSON output file name
    #[arg(long, default_value = DEFAULT_JSON_FILE)]
    pub json_file: String,

    /// CSV output file name
    #[arg(long, default_value = DEFAULT_CSV_FILE)]
    pub csv_file: String,

    /// Add a spot price and price chart, and write the priced layout
    #[arg(short, long)]
    pub market: bool,

    /// Market data API base URL
    #[arg(long, default_value = DEFAULT_MARKET_API)]
    pub market_api: String,

    /// Trading pair symbol
    #[arg(long, default_value = DEFAULT_SYMBOL)]
    pub symbol: String,

    /// Candle interval
    #[arg(long, default_value = DEFAULT_INTERVAL)]
    pub interval: String,

    /// Number of candles to chart
    #[arg(long, default_value_t = DEFAULT_CANDLE_LIMIT)]
    pub candles: u32,

    /// Chart output file name (SVG)
    #[arg(long, default_value = DEFAULT_CHART_FILE)]
    pub chart_file: String,
}

impl Cli {
    /// Freeze the parsed arguments into the run configuration.
    pub fn into_config(self) -> ScraperConfig {
        let market = self.market.then(|| MarketConfig {
            api_base: self.market_api,
            symbol: self.symbol,
            interval: self.interval,
            candle_limit: self.candles,
            chart_file: self.chart_file,
        });

        ScraperConfig {
            start_url: self.start_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            request_delay: Duration::from_millis(self.delay_ms),
            max_articles: self.max_articles,
            output_dir: self.output_dir,
            json_file: self.json_file,
            csv_file: self.csv_file,
            market,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_config_defaults() {
        let cli = Cli::parse_from(["coin_news"]);
        let config = cli.into_config();
        let defaults = ScraperConfig::default();

        assert_eq!(config.start_url, defaults.start_url);
        assert_eq!(config.max_articles, defaults.max_articles);
        assert_eq!(config.request_delay, defaults.request_delay);
        assert_eq!(config.request_timeout, defaults.request_timeout);
        assert_eq!(config.json_path(), defaults.json_path());
        assert_eq!(config.csv_path(), defaults.csv_path());
        assert!(config.market.is_none());
    }

    #[test]
    fn test_cli_market_flags() {
        let cli = Cli::parse_from([
            "coin_news",
            "--market",
            "--symbol",
            "ETHUSDT",
            "--interval",
            "15m",
            "--candles",
            "48",
            "-o",
            "/tmp/out",
        ]);
        let config = cli.into_config();
        let market = config.market.clone().unwrap();

        assert_eq!(market.symbol, "ETHUSDT");
        assert_eq!(market.interval, "15m");
        assert_eq!(market.candle_limit, 48);
        assert_eq!(
            config.chart_path(),
            Some(PathBuf::from("/tmp/out/btc_price_chart.svg"))
        );
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["coin_news", "-n", "5", "-o", "./news"]);
        assert_eq!(cli.max_articles, 5);
        assert_eq!(cli.output_dir, PathBuf::from("./news"));
        assert!(!cli.market);
    }
}
