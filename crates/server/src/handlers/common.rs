//! Shared handler helpers.

use std::io::ErrorKind;
use std::path::Path;

/// Whether `path` exists and is a directory.
///
/// A missing path is `Ok(false)`; any other I/O failure is propagated.
pub async fn dir_exists(path: &Path) -> std::io::Result<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if is_missing(&e) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Whether an I/O error means the path does not exist.
pub fn is_missing(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}
