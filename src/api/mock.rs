//! Scripted in-memory `AccountApi` for driver tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::types::{
    DownloadAccountRequest, DownloadAccountResponse, ServiceUser, UploadAccountRequest,
    UploadAccountResponse, UploadError,
};
use super::{AccountApi, ApiError, ApiResult};

/// Replays queued responses and records every request it receives.
/// Running out of script answers with a request error.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    downloads: Mutex<VecDeque<ApiResult<DownloadAccountResponse>>>,
    uploads: Mutex<VecDeque<ApiResult<UploadAccountResponse>>>,
    pub download_requests: Mutex<Vec<DownloadAccountRequest>>,
    pub upload_requests: Mutex<Vec<UploadAccountRequest>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_download(&self, response: ApiResult<DownloadAccountResponse>) -> &Self {
        self.downloads.lock().unwrap().push_back(response);
        self
    }

    /// Queue a page of accounts with the given ids.
    pub fn push_page(&self, ids: &[&str], next_page_token: Option<&str>) -> &Self {
        let users = ids
            .iter()
            .map(|id| ServiceUser {
                local_id: (*id).to_string(),
                email: Some(format!("{id}@test.org")),
                ..ServiceUser::default()
            })
            .collect();
        self.push_download(Ok(DownloadAccountResponse {
            users,
            next_page_token: next_page_token.map(String::from),
        }))
    }

    pub fn push_upload(&self, response: ApiResult<UploadAccountResponse>) -> &Self {
        self.uploads.lock().unwrap().push_back(response);
        self
    }

    /// Queue an upload response rejecting the accounts at `indexes`.
    pub fn push_upload_errors(&self, indexes: &[usize]) -> &Self {
        let error = indexes
            .iter()
            .map(|&index| UploadError {
                index,
                message: format!("account {index} rejected"),
            })
            .collect();
        self.push_upload(Ok(UploadAccountResponse { error }))
    }

    pub fn download_count(&self) -> usize {
        self.download_requests.lock().unwrap().len()
    }

    pub fn upload_count(&self) -> usize {
        self.upload_requests.lock().unwrap().len()
    }
}

impl AccountApi for ScriptedApi {
    async fn download_accounts(
        &self,
        request: &DownloadAccountRequest,
    ) -> ApiResult<DownloadAccountResponse> {
        self.download_requests.lock().unwrap().push(request.clone());
        self.downloads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Request("download script exhausted".to_string())))
    }

    async fn upload_accounts(
        &self,
        request: &UploadAccountRequest,
    ) -> ApiResult<UploadAccountResponse> {
        self.upload_requests.lock().unwrap().push(request.clone());
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Request("upload script exhausted".to_string())))
    }
}
