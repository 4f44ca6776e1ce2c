//! Batched account import.
//!
//! Batches go out one at a time, in order. A rejected account or a failed
//! batch is recorded in the [`ImportReport`] and the run moves on to the next
//! batch; nothing here aborts an import.

use tracing::{error, info};

use crate::api::{AccountApi, UploadAccountRequest};
use crate::model::UserRecord;
use crate::sync::types::{BatchError, ImportReport};
use crate::validate::HashOptions;

/// Split records into upload batches of at most `batch_size`.
#[must_use]
pub fn into_batches(records: Vec<UserRecord>, batch_size: usize) -> Vec<Vec<UserRecord>> {
    let size = batch_size.max(1);
    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut records = records.into_iter().peekable();
    while records.peek().is_some() {
        batches.push(records.by_ref().take(size).collect());
    }
    batches
}

/// Uploads validated records into a project.
pub struct Importer<'a, A: AccountApi> {
    api: &'a A,
    project_id: String,
    hash_options: HashOptions,
}

impl<'a, A: AccountApi> Importer<'a, A> {
    #[must_use]
    pub fn new(api: &'a A, project_id: impl Into<String>, hash_options: HashOptions) -> Self {
        Self {
            api,
            project_id: project_id.into(),
            hash_options,
        }
    }

    /// Upload every batch and collect the failures.
    pub async fn import_batches(&self, batches: &[Vec<UserRecord>]) -> ImportReport {
        let mut report = ImportReport::default();

        for (batch, records) in batches.iter().enumerate() {
            info!(batch, "Starting importing {} account(s).", records.len());
            report.batches += 1;
            report.accounts += records.len();

            let request = UploadAccountRequest::new(&self.project_id, &self.hash_options, records);
            match self.api.upload_accounts(&request).await {
                Ok(response) => {
                    for failure in response.error {
                        let local_id = records.get(failure.index).map(|r| r.local_id.clone());
                        error!(
                            batch,
                            index = failure.index,
                            local_id = local_id.as_deref().unwrap_or("?"),
                            "Failed to import account: {}",
                            failure.message
                        );
                        report.errors.push(BatchError {
                            batch,
                            batch_size: records.len(),
                            index: Some(failure.index),
                            local_id,
                            message: failure.message,
                        });
                    }
                }
                Err(err) => {
                    error!(batch, "Batch upload failed: {err}");
                    report.errors.push(BatchError {
                        batch,
                        batch_size: records.len(),
                        index: None,
                        local_id: None,
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            batches = report.batches,
            failed = report.errors.len(),
            "Imported {} account(s).",
            report.imported()
        );
        report
    }
}
