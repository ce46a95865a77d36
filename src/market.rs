//! Price and chart enrichment from an exchange's public REST API.
//!
//! Two independent lookups against Binance-style endpoints:
//!
//! - **Spot price**: `GET /api/v3/ticker/price?symbol=..`, answering
//!   `{"symbol": "BTCUSDT", "price": "67000.12"}`
//! - **Candles**: `GET /api/v3/klines?symbol=..&interval=..&limit=..`, answering
//!   an array of 12-element kline rows, rendered as a close-price line chart
//!
//! Neither is allowed to stop a run. The public entry points log what went
//! wrong and hand back `None`.

use crate::config::MarketConfig;
use crate::error::EnrichmentError;
use crate::fetch::PageFetcher;
use crate::models::Candle;
use crate::utils::truncate_for_log;
use chrono::DateTime;
use plotters::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use url::Url;

const CHART_SIZE: (u32, u32) = (1000, 500);

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: Decimal,
}

/// Exchanges send decimals as strings; accept bare numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(f64),
    Text(String),
}

impl Decimal {
    fn to_f64(&self, field: &'static str) -> Result<f64, EnrichmentError> {
        match self {
            Decimal::Number(n) => Ok(*n),
            Decimal::Text(s) => parse_decimal(field, s),
        }
    }
}

/// One kline row as the exchange sends it. Only the open time and the
/// close are read.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct RawKline(
    i64,               // open time, ms since epoch
    String,            // open
    String,            // high
    String,            // low
    String,            // close
    String,            // volume
    i64,               // close time
    String,            // quote asset volume
    u64,               // number of trades
    String,            // taker buy base asset volume
    String,            // taker buy quote asset volume
    serde_json::Value, // unused
);

fn parse_decimal(field: &'static str, value: &str) -> Result<f64, EnrichmentError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| EnrichmentError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn endpoint(
    market: &MarketConfig,
    path: &str,
    params: &[(&str, String)],
) -> Result<Url, EnrichmentError> {
    let base = format!("{}/{}", market.api_base.trim_end_matches('/'), path);
    Ok(Url::parse_with_params(&base, params)?)
}

/// Ticker URL for `market.symbol`.
pub fn ticker_url(market: &MarketConfig) -> Result<Url, EnrichmentError> {
    endpoint(
        market,
        "api/v3/ticker/price",
        &[("symbol", market.symbol.clone())],
    )
}

/// Kline URL for the configured symbol, interval and candle count.
pub fn klines_url(market: &MarketConfig) -> Result<Url, EnrichmentError> {
    endpoint(
        market,
        "api/v3/klines",
        &[
            ("symbol", market.symbol.clone()),
            ("interval", market.interval.clone()),
            ("limit", market.candle_limit.to_string()),
        ],
    )
}

/// Parse a ticker response body into the spot price.
pub fn parse_spot_price(body: &str) -> Result<f64, EnrichmentError> {
    let ticker: TickerPrice = serde_json::from_str(body)?;
    ticker.price.to_f64("price")
}

/// Parse a kline response body into candles, oldest first as sent.
pub fn parse_candles(body: &str) -> Result<Vec<Candle>, EnrichmentError> {
    let rows: Vec<RawKline> = serde_json::from_str(body)?;
    rows.into_iter()
        .map(|row| {
            let open_time = DateTime::from_timestamp_millis(row.0)
                .ok_or(EnrichmentError::InvalidTimestamp(row.0))?;
            let close = parse_decimal("close", &row.4)?;
            Ok(Candle { open_time, close })
        })
        .collect()
}

async fn try_spot_price<F: PageFetcher>(
    fetcher: &F,
    market: &MarketConfig,
) -> Result<f64, EnrichmentError> {
    let url = ticker_url(market)?;
    let body = fetcher.fetch(url.as_str()).await?;
    parse_spot_price(&body).inspect_err(|_| {
        debug!(body = %truncate_for_log(&body, 200), "Unexpected ticker response");
    })
}

/// Current price for the configured symbol, or `None` on any failure.
#[instrument(level = "info", skip_all, fields(symbol = %market.symbol))]
pub async fn fetch_spot_price<F: PageFetcher>(fetcher: &F, market: &MarketConfig) -> Option<f64> {
    match try_spot_price(fetcher, market).await {
        Ok(price) => {
            info!(price, "Fetched spot price");
            Some(price)
        }
        Err(e) => {
            warn!(error = %e, "Spot price unavailable");
            None
        }
    }
}

/// Most recent candles for the configured symbol and interval.
#[instrument(level = "info", skip_all, fields(symbol = %market.symbol, interval = %market.interval))]
pub async fn fetch_candles<F: PageFetcher>(
    fetcher: &F,
    market: &MarketConfig,
) -> Result<Vec<Candle>, EnrichmentError> {
    let url = klines_url(market)?;
    let body = fetcher.fetch(url.as_str()).await?;
    let candles = parse_candles(&body)?;
    debug!(count = candles.len(), "Parsed candles");
    Ok(candles)
}

fn chart_error<E: std::fmt::Display>(e: E) -> EnrichmentError {
    EnrichmentError::Chart(e.to_string())
}

/// Draw close price over open time as an SVG line chart at `path`.
pub fn render_chart(
    candles: &[Candle],
    market: &MarketConfig,
    path: &Path,
) -> Result<(), EnrichmentError> {
    let start = candles.iter().map(|c| c.open_time.timestamp_millis()).min();
    let end = candles.iter().map(|c| c.open_time.timestamp_millis()).max();
    let (Some(start), Some(end)) = (start, end) else {
        return Err(EnrichmentError::NotEnoughCandles(candles.len()));
    };
    if start == end {
        return Err(EnrichmentError::NotEnoughCandles(candles.len()));
    }

    let low = candles.iter().map(|c| c.close).fold(f64::INFINITY, f64::min);
    let high = candles.iter().map(|c| c.close).fold(f64::NEG_INFINITY, f64::max);
    let pad = if high > low {
        (high - low) * 0.05
    } else {
        (high.abs() * 0.01).max(1.0)
    };

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let caption = format!(
        "{} close price ({} x {} candles)",
        market.symbol,
        candles.len(),
        market.interval
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(start..end, (low - pad)..(high + pad))
        .map_err(chart_error)?;

    let time_label = |ms: &i64| {
        DateTime::from_timestamp_millis(*ms)
            .map(|t| t.format("%m-%d %H:%M").to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&time_label)
        .x_desc(format!("Open time (UTC, {} interval)", market.interval))
        .y_desc(format!("{} close", market.symbol))
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(LineSeries::new(
            candles
                .iter()
                .map(|c| (c.open_time.timestamp_millis(), c.close)),
            BLUE.stroke_width(2),
        ))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

async fn try_price_chart<F: PageFetcher>(
    fetcher: &F,
    market: &MarketConfig,
    path: &Path,
) -> Result<usize, EnrichmentError> {
    let candles = fetch_candles(fetcher, market).await?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .map_err(|source| EnrichmentError::ChartDir {
                path: dir.to_path_buf(),
                source,
            })?;
    }
    render_chart(&candles, market, path)?;
    Ok(candles.len())
}

/// Fetch candles and render them to `path`. Returns the chart path, or
/// `None` if either step failed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn fetch_price_chart<F: PageFetcher>(
    fetcher: &F,
    market: &MarketConfig,
    path: &Path,
) -> Option<PathBuf> {
    match try_price_chart(fetcher, market, path).await {
        Ok(count) => {
            info!(candles = count, "Wrote price chart");
            Some(path.to_path_buf())
        }
        Err(e) => {
            warn!(error = %e, "Price chart unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FakeFetcher;
    use chrono::{TimeZone, Utc};

    const KLINES: &str = r#"[
        [1714996800000, "63000.00", "63500.00", "62800.00", "63250.50", "812.4", 1714999199999, "51234567.1", 24012, "401.2", "25300000.0", "0"],
        [1714999200000, "63250.50", "63900.00", "63100.00", "63800.25", "903.1", 1715002799999, "57612345.9", 26540, "455.0", "29000000.0", "0"]
    ]"#;

    fn market(api_base: &str) -> MarketConfig {
        MarketConfig {
            api_base: api_base.to_string(),
            ..MarketConfig::default()
        }
    }

    #[test]
    fn test_parse_spot_price_string() {
        assert_eq!(parse_spot_price(r#"{"price": "150.25"}"#).unwrap(), 150.25);
        assert_eq!(
            parse_spot_price(r#"{"symbol": "BTCUSDT", "price": "67000.10000000"}"#).unwrap(),
            67000.1
        );
    }

    #[test]
    fn test_parse_spot_price_number() {
        assert_eq!(parse_spot_price(r#"{"price": 42}"#).unwrap(), 42.0);
    }

    #[test]
    fn test_parse_spot_price_rejects_bad_input() {
        assert!(matches!(
            parse_spot_price(r#"{"symbol": "BTCUSDT"}"#),
            Err(EnrichmentError::Json(_))
        ));
        assert!(matches!(
            parse_spot_price(r#"{"price": "n/a"}"#),
            Err(EnrichmentError::InvalidNumber { field: "price", .. })
        ));
        assert!(parse_spot_price("<html>").is_err());
    }

    #[test]
    fn test_parse_candles_reads_open_time_and_close() {
        let candles = parse_candles(KLINES).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(
            candles[0].open_time,
            Utc.with_ymd_and_hms(2024, 5, 6, 12, 0, 0).unwrap()
        );
        assert_eq!(candles[0].close, 63250.5);
        assert_eq!(candles[1].close, 63800.25);
    }

    #[test]
    fn test_parse_candles_rejects_short_rows() {
        assert!(parse_candles(r#"[[1714996800000, "1", "2"]]"#).is_err());
    }

    #[test]
    fn test_endpoint_urls() {
        let m = market("https://api.binance.com/");
        assert_eq!(
            ticker_url(&m).unwrap().as_str(),
            "https://api.binance.com/api/v3/ticker/price?symbol=BTCUSDT"
        );
        assert_eq!(
            klines_url(&m).unwrap().as_str(),
            "https://api.binance.com/api/v3/klines?symbol=BTCUSDT&interval=1h&limit=100"
        );
    }

    #[tokio::test]
    async fn test_fetch_spot_price_success() {
        let m = market("https://api.test");
        let fetcher = FakeFetcher::new().with_page(
            "https://api.test/api/v3/ticker/price?symbol=BTCUSDT",
            r#"{"symbol": "BTCUSDT", "price": "150.25"}"#,
        );
        assert_eq!(fetch_spot_price(&fetcher, &m).await, Some(150.25));
    }

    #[tokio::test]
    async fn test_fetch_spot_price_failure_is_none() {
        let m = market("https://api.test");
        assert_eq!(fetch_spot_price(&FakeFetcher::new(), &m).await, None);

        let fetcher = FakeFetcher::new().with_page(
            "https://api.test/api/v3/ticker/price?symbol=BTCUSDT",
            r#"{"code": -1121, "msg": "Invalid symbol."}"#,
        );
        assert_eq!(fetch_spot_price(&fetcher, &m).await, None);
    }

    #[tokio::test]
    async fn test_fetch_candles() {
        let m = market("https://api.test");
        let fetcher = FakeFetcher::new().with_page(
            "https://api.test/api/v3/klines?symbol=BTCUSDT&interval=1h&limit=100",
            KLINES,
        );
        let candles = fetch_candles(&fetcher, &m).await.unwrap();
        assert_eq!(candles.len(), 2);
    }

    #[test]
    fn test_render_chart_needs_two_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let one = [Candle {
            open_time: Utc.with_ymd_and_hms(2024, 5, 6, 12, 0, 0).unwrap(),
            close: 1.0,
        }];

        assert!(matches!(
            render_chart(&[], &MarketConfig::default(), &path),
            Err(EnrichmentError::NotEnoughCandles(0))
        ));
        assert!(matches!(
            render_chart(&one, &MarketConfig::default(), &path),
            Err(EnrichmentError::NotEnoughCandles(1))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_render_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let candles = parse_candles(KLINES).unwrap();

        render_chart(&candles, &MarketConfig::default(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("BTCUSDT close price (2 x 1h candles)"));
    }

    #[tokio::test]
    async fn test_fetch_price_chart_writes_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("chart.svg");
        let m = market("https://api.test");
        let fetcher = FakeFetcher::new().with_page(
            "https://api.test/api/v3/klines?symbol=BTCUSDT&interval=1h&limit=100",
            KLINES,
        );

        assert_eq!(
            fetch_price_chart(&fetcher, &m, &path).await,
            Some(path.clone())
        );
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("BTCUSDT close price (2 x 1h candles)"));
    }

    #[tokio::test]
    async fn test_fetch_price_chart_unusable_dir_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("not_a_dir");
        std::fs::write(&not_a_dir, "").unwrap();
        let m = market("https://api.test");
        let fetcher = FakeFetcher::new().with_page(
            "https://api.test/api/v3/klines?symbol=BTCUSDT&interval=1h&limit=100",
            KLINES,
        );

        assert_eq!(
            fetch_price_chart(&fetcher, &m, &not_a_dir.join("chart.svg")).await,
            None
        );
    }

    #[tokio::test]
    async fn test_fetch_price_chart_failure_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let m = market("https://api.test");

        assert_eq!(fetch_price_chart(&FakeFetcher::new(), &m, &path).await, None);
        assert!(!path.exists());
    }
}
