//! HTTP implementation of [`AccountApi`].

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    DownloadAccountRequest, DownloadAccountResponse, UploadAccountRequest, UploadAccountResponse,
};
use super::{AccountApi, ApiError, ApiResult};

/// Default identity service origin.
pub const DEFAULT_API_ORIGIN: &str = "https://www.googleapis.com";

pub const DOWNLOAD_ACCOUNT_PATH: &str = "/identitytoolkit/v3/relyingparty/downloadAccount";
pub const UPLOAD_ACCOUNT_PATH: &str = "/identitytoolkit/v3/relyingparty/uploadAccount";

/// Identity service client over HTTPS with a bearer token.
///
/// Token issuance and refresh happen elsewhere; this client only attaches
/// the token it was given.
pub struct HttpAccountApi {
    client: reqwest::Client,
    origin: String,
    access_token: String,
}

impl HttpAccountApi {
    /// Create a client for `origin` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(origin: &str, access_token: &str, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Default,
    {
        let url = format!("{}{}", self.origin, path);
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = response.status();
        let text = response.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(R::default());
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl AccountApi for HttpAccountApi {
    async fn download_accounts(
        &self,
        request: &DownloadAccountRequest,
    ) -> ApiResult<DownloadAccountResponse> {
        self.post(DOWNLOAD_ACCOUNT_PATH, request).await
    }

    async fn upload_accounts(
        &self,
        request: &UploadAccountRequest,
    ) -> ApiResult<UploadAccountResponse> {
        self.post(UPLOAD_ACCOUNT_PATH, request).await
    }
}

fn from_reqwest(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Request(err.to_string())
    }
}

/// Pull `error.message` out of a service error body, else use the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_service_message() {
        let body = r#"{"error": {"code": 400, "message": "INVALID_PROJECT_ID"}}"#;
        assert_eq!(error_message(body), "INVALID_PROJECT_ID");
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_origin_trailing_slash_trimmed() {
        let api = HttpAccountApi::new("http://localhost:9099/", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(api.origin, "http://localhost:9099");
    }
}
