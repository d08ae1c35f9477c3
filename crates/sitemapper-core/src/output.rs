//! Committing generated documents to disk.
//!
//! Every file is written to a sibling `.tmp` path first and then renamed over
//! the destination, so readers never observe a half-written sitemap.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::pipeline::GenerationResult;
use crate::{Error, Result};

/// Write every document of `result`, and its index when split, into `dir`.
///
/// `dir` is created when missing. Returns the written paths, documents first
/// and the index last.
///
/// # Errors
///
/// Returns [`Error::Storage`] when a file cannot be written or committed.
pub fn write_output(result: &GenerationResult, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| {
        Error::Storage(format!(
            "Failed to create output directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut written = Vec::with_capacity(result.documents.len() + 1);
    for doc in result.documents.iter().chain(result.index.iter()) {
        let path = dir.join(&doc.filename);
        write_atomic(&path, &doc.xml)?;
        written.push(path);
    }

    info!(
        collection = %result.name,
        files = written.len(),
        dir = %dir.display(),
        "sitemap files written"
    );
    Ok(written)
}

/// Absolute URL under which crawlers should find `result`.
///
/// Points at the index when the output was split.
#[must_use]
pub fn sitemap_reference(result: &GenerationResult, hostname: &str) -> Option<String> {
    result
        .entry_filename()
        .map(|filename| format!("{}/{filename}", hostname.trim_end_matches('/')))
}

/// Write `content` to `path` through a temporary file and rename.
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content)
        .map_err(|e| Error::Storage(format!("Failed to write {}: {e}", tmp_path.display())))?;

    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            Error::Storage(format!("Failed to remove existing {}: {e}", path.display()))
        })?;
    }

    fs::rename(&tmp_path, path)
        .map_err(|e| Error::Storage(format!("Failed to commit {}: {e}", path.display())))?;

    debug!("Wrote {}", path.display());
    Ok(())
}
