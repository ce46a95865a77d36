//! Error types, one enum per failure class.
//!
//! Only [`PersistError`] is allowed to end a run. Fetch and enrichment
//! failures are logged where they happen and turned into "skip" or "absent".

use std::path::PathBuf;
use thiserror::Error;

/// A GET that did not produce a usable body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. } | FetchError::Status { url, .. } => url,
        }
    }
}

/// Spot price or chart could not be produced.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid market endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("malformed market data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("open time {0} ms is out of range")]
    InvalidTimestamp(i64),

    #[error("need at least two candles to draw a chart, got {0}")]
    NotEnoughCandles(usize),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("cannot create chart directory {}: {source}", path.display())]
    ChartDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writing an output file failed.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_status_message() {
        let e = FetchError::Status {
            url: "https://example.com/a".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert_eq!(e.url(), "https://example.com/a");
        assert_eq!(
            e.to_string(),
            "https://example.com/a returned HTTP 404 Not Found"
        );
    }

    #[test]
    fn test_enrichment_error_wraps_fetch_error() {
        let e: EnrichmentError = FetchError::Status {
            url: "https://api.example.com".to_string(),
            status: reqwest::StatusCode::BAD_GATEWAY,
        }
        .into();
        assert!(e.to_string().contains("502"));
    }

    #[test]
    fn test_persist_error_names_path() {
        let e = PersistError::Io {
            path: PathBuf::from("/nope/out.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().starts_with("cannot write /nope/out.json"));
    }
}
