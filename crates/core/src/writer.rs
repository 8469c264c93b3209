//! Idempotent, atomic file writing.
//!
//! Regeneration over an existing tree must not churn timestamps or leave a
//! half-written file behind on failure: content is compared byte-for-byte
//! first, and an actual write goes through a temporary file in the target
//! directory followed by a rename.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::trace;

use crate::error::Error;

/// Write `content` to `path` unless the file already holds exactly those
/// bytes. Returns whether anything was written. Parent directories are
/// created as needed.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool, Error> {
    if let Ok(existing) = fs::read(path) {
        if existing == content.as_bytes() {
            trace!(path = %path.display(), "unchanged, skipping write");
            return Ok(false);
        }
    }

    let io_err = |source: std::io::Error| Error::Write { path: path.to_path_buf(), source };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(io_err)?;

    // temp file in the same directory so the final rename stays on one
    // filesystem and is atomic
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(content.as_bytes()).map_err(io_err)?;
    tmp.persist(path)
        .map_err(|e| Error::Write { path: path.to_path_buf(), source: e.error })?;

    trace!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(true)
}
