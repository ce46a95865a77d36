//! JSON output.
//!
//! The envelope is written with two-space indentation and non-ASCII
//! characters left as-is, so the file is readable in any editor.

use super::write_file;
use crate::error::PersistError;
use crate::models::OutputEnvelope;
use std::path::Path;
use tracing::{info, instrument};

/// Serialize `envelope` to `path`, overwriting any existing file.
///
/// # Errors
///
/// [`PersistError::Json`] if serialization fails, [`PersistError::Io`] if the
/// file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save_json(envelope: &OutputEnvelope, path: &Path) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(envelope)?;
    write_file(path, json.as_bytes()).await?;
    info!(articles = envelope.articles().len(), bytes = json.len(), "Wrote JSON");
    Ok(())
}
