//! Paginated account export.
//!
//! The exporter walks the download endpoint page by page, writing each
//! page's accounts before asking for the next one. A timed-out request is
//! repeated with the same page token; any other failure ends the run.
//!
//! # Termination
//!
//! The run completes when a page comes back empty or without a
//! `nextPageToken`. More than [`MAX_TIMEOUT_RETRIES`] consecutive timeouts
//! on one page end it with [`SyncError::RetriesExhausted`]. Accounts already
//! written stay in the output either way.

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{AccountApi, DownloadAccountRequest, DownloadAccountResponse};
use crate::model::UserRecord;
use crate::sync::file::RecordWriter;
use crate::sync::types::{ExportStats, SyncError, SyncResult};
use crate::validate::MAX_BATCH_SIZE;

/// Consecutive timeouts tolerated on one page before giving up.
pub const MAX_TIMEOUT_RETRIES: u32 = 5;

enum ExportState {
    Fetching { page_token: Option<String> },
    Done,
}

/// Exports every account of a project into a [`RecordWriter`].
pub struct Exporter<'a, A: AccountApi, W: Write> {
    api: &'a A,
    project_id: String,
    writer: RecordWriter<W>,
    page_size: usize,
    retry_delay: Duration,
}

impl<'a, A: AccountApi, W: Write> Exporter<'a, A, W> {
    #[must_use]
    pub fn new(api: &'a A, project_id: impl Into<String>, writer: RecordWriter<W>) -> Self {
        Self {
            api,
            project_id: project_id.into(),
            writer,
            page_size: MAX_BATCH_SIZE,
            retry_delay: Duration::ZERO,
        }
    }

    /// Accounts requested per page.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Pause before repeating a timed-out request. Zero by default.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Run the export to completion.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::RetriesExhausted`] after too many consecutive
    /// timeouts, [`SyncError::Api`] for any other service failure, or a
    /// write error from the output.
    pub async fn export(&mut self) -> SyncResult<ExportStats> {
        let mut stats = ExportStats::default();
        let mut timeouts: u32 = 0;
        let mut state = ExportState::Fetching { page_token: None };

        while let ExportState::Fetching { page_token } = state {
            let request = DownloadAccountRequest {
                target_project_id: self.project_id.clone(),
                max_results: self.page_size,
                next_page_token: page_token,
            };

            match self.api.download_accounts(&request).await {
                Ok(page) => {
                    timeouts = 0;
                    state = self.write_page(page, &mut stats)?;
                }
                Err(err) if err.is_transient() => {
                    timeouts += 1;
                    if timeouts > MAX_TIMEOUT_RETRIES {
                        self.writer.flush()?;
                        return Err(SyncError::RetriesExhausted {
                            attempts: timeouts,
                            exported: stats.accounts,
                        });
                    }
                    stats.retries += 1;
                    warn!(
                        attempt = timeouts,
                        max = MAX_TIMEOUT_RETRIES,
                        "Download timed out, retrying page"
                    );
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                    state = ExportState::Fetching {
                        page_token: request.next_page_token,
                    };
                }
                Err(err) => {
                    self.writer.flush()?;
                    return Err(err.into());
                }
            }
        }

        self.writer.flush()?;
        Ok(stats)
    }

    fn write_page(
        &mut self,
        page: DownloadAccountResponse,
        stats: &mut ExportStats,
    ) -> SyncResult<ExportState> {
        if page.users.is_empty() {
            debug!("Empty page, export complete");
            return Ok(ExportState::Done);
        }

        let count = page.users.len();
        for user in page.users {
            self.writer.write_record(&UserRecord::from(user))?;
        }
        stats.pages += 1;
        stats.accounts += count;
        info!(page = stats.pages, "Exported {count} account(s) successfully.");

        Ok(match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => ExportState::Fetching {
                page_token: Some(token),
            },
            None => ExportState::Done,
        })
    }

    /// Give back the writer, e.g. to close a document frame.
    pub fn into_writer(self) -> RecordWriter<W> {
        self.writer
    }
}
