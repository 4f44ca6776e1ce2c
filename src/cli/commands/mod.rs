//! Command implementations.

pub mod completions;
pub mod export;
pub mod import;
pub mod version;

use crate::error::{Error, Result};

/// Runtime for driving the async service calls from a sync command.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}
