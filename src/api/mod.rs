//! Identity service client.
//!
//! The drivers talk to the service only through [`AccountApi`], so they can
//! run against [`HttpAccountApi`] or an in-memory double. Each request and
//! response shape is its own struct in [`types`].

mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use http::{DEFAULT_API_ORIGIN, DOWNLOAD_ACCOUNT_PATH, HttpAccountApi, UPLOAD_ACCOUNT_PATH};
pub use types::{
    DownloadAccountRequest, DownloadAccountResponse, ServiceProviderInfo, ServiceUser,
    UploadAccountRequest, UploadAccountResponse, UploadError, UploadUser,
};

use thiserror::Error;

/// Result type for service calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures talking to the identity service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether repeating the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Account endpoints of the identity service.
///
/// Callers keep at most one request outstanding; the service does not
/// tolerate concurrent reads or writes against one project.
pub trait AccountApi: Send + Sync {
    /// Fetch one page of accounts.
    fn download_accounts(
        &self,
        request: &DownloadAccountRequest,
    ) -> impl std::future::Future<Output = ApiResult<DownloadAccountResponse>> + Send;

    /// Upload one batch of accounts.
    ///
    /// A successful response may still list per-account failures.
    fn upload_accounts(
        &self,
        request: &UploadAccountRequest,
    ) -> impl std::future::Future<Output = ApiResult<UploadAccountResponse>> + Send;
}
