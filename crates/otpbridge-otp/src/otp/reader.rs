//! Reading import files.
//!
//! File reading is the only asynchronous step of an import. The service
//! takes any [`FileReader`]; [`TokioFileReader`] reads from disk.

use std::path::Path;

use async_trait::async_trait;

use crate::otp::types::*;

/// Yields the full text of a user-selected file.
#[async_trait]
pub trait FileReader: Send + Sync {
    async fn read_text(&self, path: &Path) -> Result<String, OtpError>;
}

/// Reads files with `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileReader;

#[async_trait]
impl FileReader for TokioFileReader {
    async fn read_text(&self, path: &Path) -> Result<String, OtpError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            OtpError::new(
                OtpErrorKind::ReadFailed,
                format!("Failed to read {}: {}", path.display(), e),
            )
        })?;
        // Accept anything "UTF-8 compatible"; stray bytes only affect the
        // lines they sit on.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
