//! Append-only text record of answered questions

use std::path::{Path, PathBuf};

use billing_core::PipelineResult;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One record per request: input, SQL, result, answer, CSV, then a blank line
pub struct Journal {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Journal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file if needed
    pub async fn append(&self, result: &PipelineResult) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(result.to_record().as_bytes()).await?;
        file.flush().await
    }
}
