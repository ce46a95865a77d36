//! Output sinks for a finished run.
//!
//! # Submodules
//!
//! - [`json`]: the envelope as indented JSON
//! - [`tabular`]: the envelope as CSV
//!
//! Both sinks serialize the whole envelope in memory first and then write
//! the file in one call, replacing whatever was there.
//!
//! # Layouts
//!
//! ```text
//! plain                          priced
//! [ {article}, ... ]             { "price": 67000.1, "fetched_at": "...Z",
//!                                  "articles": [ {article}, ... ] }
//! ```

pub mod json;
pub mod tabular;

use crate::error::PersistError;
use std::path::Path;
use tokio::fs;

/// Write `bytes` to `path`, creating or truncating it.
pub(crate) async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    fs::write(path, bytes)
        .await
        .map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
}
