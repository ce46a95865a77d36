//! CSV output.
//!
//! Plain layout:
//!
//! ```text
//! title,link,source,content,fetched_at
//! <one row per article>
//! ```
//!
//! Priced layout prepends two label/value rows and a blank line:
//!
//! ```text
//! price,67000.1
//! fetched_at,2025-05-06T14:30:00.000000Z
//!
//! title,link,source,content,fetched_at
//! <one row per article>
//! ```
//!
//! Rows end in `\n` rather than the RFC 4180 `\r\n`, matching the JSON
//! output's line endings. CSV readers, including `csv::Reader`, accept both.

use super::write_file;
use crate::error::PersistError;
use crate::models::OutputEnvelope;
use csv::{Terminator, WriterBuilder};
use std::path::Path;
use tracing::{info, instrument};

pub const COLUMNS: [&str; 5] = ["title", "link", "source", "content", "fetched_at"];

fn builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.has_headers(false).terminator(Terminator::Any(b'\n'));
    builder
}

/// Render `envelope` as CSV bytes.
pub fn render_csv(envelope: &OutputEnvelope) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::new();

    if let OutputEnvelope::Priced {
        price, fetched_at, ..
    } = envelope
    {
        let price = price.map(|p| p.to_string()).unwrap_or_default();
        let mut meta = builder().from_writer(&mut buf);
        meta.write_record(["price", price.as_str()])?;
        meta.write_record(["fetched_at", fetched_at.as_str()])?;
        meta.flush().map_err(csv::Error::from)?;
        drop(meta);
        buf.push(b'\n');
    }

    let mut rows = builder().from_writer(&mut buf);
    rows.write_record(COLUMNS)?;
    for article in envelope.articles() {
        rows.serialize(article)?;
    }
    rows.flush().map_err(csv::Error::from)?;
    drop(rows);

    Ok(buf)
}

/// Write `envelope` as CSV to `path`, overwriting any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save_csv(envelope: &OutputEnvelope, path: &Path) -> Result<(), PersistError> {
    let bytes = render_csv(envelope)?;
    write_file(path, &bytes).await?;
    info!(articles = envelope.articles().len(), bytes = bytes.len(), "Wrote CSV");
    Ok(())
}
