//! Export and import drivers.
//!
//! - **Export**: download pages → encoded records in a data file
//! - **Import**: data file → validated records → upload batches
//!
//! Both drivers talk to the service through [`AccountApi`](crate::api::AccountApi)
//! and keep exactly one request in flight.
//!
//! # Example
//!
//! ```ignore
//! use authmigrate::sync::{into_batches, read_document_file, Exporter, Importer, RecordWriter};
//!
//! // Export every account into a row file
//! let writer = RecordWriter::new(file, FileFormat::Csv);
//! let mut exporter = Exporter::new(&api, "my-project", writer);
//! let stats = exporter.export().await?;
//!
//! // Import a document file in batches of 1000
//! let records = read_document_file(path)?;
//! let report = Importer::new(&api, "my-project", hash_options)
//!     .import_batches(&into_batches(records, 1000))
//!     .await;
//! ```

mod export;
mod file;
mod import;
mod types;

pub use export::{Exporter, MAX_TIMEOUT_RETRIES};
pub use file::{
    close_document, open_document, read_document_file, read_documents, read_row_file, read_rows,
    ParsedRows, RecordWriter, LINE_ENDING,
};
pub use import::{into_batches, Importer};
pub use types::{
    BatchError, ExportStats, ImportReport, RejectedRow, SyncError, SyncResult,
};
