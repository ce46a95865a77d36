//! HTTP fetching behind a small trait.
//!
//! The pipeline and the market enricher only ever need "GET this URL and give
//! me the body as text". [`PageFetcher`] captures exactly that so the real
//! [`HttpFetcher`] can be swapped for an in-memory fake in tests.
//!
//! Every request carries a fixed `User-Agent` and a bounded timeout. Failures
//! are classified into [`FetchError`] and, via [`fetch_or_log`], turned into
//! a logged `None` so a bad URL never stops a run.

use crate::config::ScraperConfig;
use crate::error::FetchError;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Anything that can turn a URL into a document body.
pub trait PageFetcher {
    /// GET `url` and return the body text on a 2xx response.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`PageFetcher`] backed by a single shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the client with the configured identity header and timeout.
    /// Redirects follow reqwest's default policy.
    pub fn new(config: &ScraperConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(transport)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(body)
    }
}

/// Fetch `url`, logging and swallowing any failure.
pub async fn fetch_or_log<F: PageFetcher>(fetcher: &F, url: &str) -> Option<String> {
    match fetcher.fetch(url).await {
        Ok(body) => Some(body),
        Err(e) => {
            warn!(url = %e.url(), error = %e, "Fetch failed; skipping");
            None
        }
    }
}
