// src/hash.rs - Attachment integrity digests
use std::io::ErrorKind;
use std::path::Path;
use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::{ReportError, ReportResult};

/// Read size used when streaming attachments through the hasher
pub const CHUNK_SIZE: usize = 8192;

/// Compute the hex-encoded SHA-256 of a file.
///
/// Returns `Ok(None)` when `path` does not name an existing regular file.
/// The file is streamed in `CHUNK_SIZE` reads and never held in memory whole.
pub async fn digest_file(path: &Path) -> ReportResult<Option<String>> {
    digest_file_with_chunk_size(path, CHUNK_SIZE).await
}

/// Same as [`digest_file`] with an explicit read size
pub async fn digest_file_with_chunk_size(path: &Path, chunk_size: usize) -> ReportResult<Option<String>> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Attachment not found: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(ReportError::file(path, e)),
    };

    if !metadata.is_file() {
        debug!("Attachment is not a regular file: {}", path.display());
        return Ok(None);
    }

    let mut file = File::open(path).await
        .map_err(|e| ReportError::file(path, e))?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let read = file.read(&mut buffer).await
            .map_err(|e| ReportError::file(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(Some(hex::encode(hasher.finalize())))
}
