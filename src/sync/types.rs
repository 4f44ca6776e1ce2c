//! Result and error types for export and import runs.

use serde::Serialize;

use crate::api::ApiError;
use crate::error::{DecodeError, ValidationError};

/// Outcome of a completed export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// Non-empty pages written.
    pub pages: usize,
    /// Accounts written.
    pub accounts: usize,
    /// Timed-out requests that were retried.
    pub retries: u32,
}

impl ExportStats {
    /// Returns true if nothing was exported.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.accounts == 0
    }
}

/// Outcome of an import run. Partial success is a normal result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Batches sent.
    pub batches: usize,
    /// Accounts submitted across all batches.
    pub accounts: usize,
    /// Every per-account or per-batch failure, in batch order.
    pub errors: Vec<BatchError>,
}

impl ImportReport {
    /// Accounts not named by any error.
    #[must_use]
    pub fn imported(&self) -> usize {
        let failed: usize = self
            .errors
            .iter()
            .map(|e| if e.index.is_some() { 1 } else { e.batch_size })
            .sum();
        self.accounts.saturating_sub(failed)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A failure attributed to one batch, and to one account when `index` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchError {
    /// Zero-based batch number.
    pub batch: usize,
    /// Accounts in the batch.
    #[serde(skip)]
    pub batch_size: usize,
    /// Position of the failing account within its batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    pub message: String,
}

/// A CSV line that could not be decoded and was left out of the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// One-based line number in the source file.
    pub line: u64,
    pub error: DecodeError,
}

/// Errors that stop an export or import run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Export stopped after {attempts} consecutive timeouts")]
    RetriesExhausted {
        /// Consecutive timed-out attempts on the same page.
        attempts: u32,
        /// Accounts already written when the export stopped.
        exported: usize,
    },

    #[error("Service error: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Data file not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
