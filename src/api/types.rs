//! Wire shapes of the account endpoints.

use serde::{Deserialize, Deserializer, Serialize};

use crate::codec::document::opt_string_or_number;
use crate::codec::ProviderDocument;
use crate::model::{EncodedBlob, ProviderLink, UserRecord};
use crate::validate::HashOptions;

// ── Download ─────────────────────────────────────────────────

/// Body of a download (export) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadAccountRequest {
    pub target_project_id: String,
    pub max_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// One page of downloaded accounts.
///
/// The service is not consistent about omitting `nextPageToken` on the last
/// page; an empty `users` list also ends the export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadAccountResponse {
    #[serde(default)]
    pub users: Vec<ServiceUser>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// An account as the service returns it. Unlisted fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUser {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub password_hash: Option<EncodedBlob>,
    #[serde(default)]
    pub salt: Option<EncodedBlob>,
    /// Hashing scheme discriminator; 0 is the project's default scheme.
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub last_login_at: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub provider_user_info: Vec<ServiceProviderInfo>,
}

/// A provider link as the service returns it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderInfo {
    pub provider_id: String,
    #[serde(default)]
    pub raw_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl From<ServiceUser> for UserRecord {
    /// Hash and salt survive only for accounts on the default scheme
    /// (`version == 0`); anything else cannot be re-imported meaningfully.
    fn from(user: ServiceUser) -> Self {
        let (password_hash, salt) = if user.version == Some(0) {
            (user.password_hash, user.salt)
        } else {
            (None, None)
        };

        Self {
            local_id: user.local_id,
            email: user.email,
            email_verified: user.email_verified,
            password_hash,
            salt,
            display_name: user.display_name,
            photo_url: user.photo_url,
            phone_number: user.phone_number,
            created_at: user.created_at,
            last_signed_in_at: user.last_login_at,
            disabled: user.disabled,
            provider_links: user
                .provider_user_info
                .into_iter()
                .map(|info| ProviderLink {
                    provider_id: info.provider_id,
                    raw_id: info.raw_id,
                    email: info.email,
                    display_name: info.display_name,
                    photo_url: info.photo_url,
                })
                .collect(),
        }
    }
}

// ── Upload ───────────────────────────────────────────────────

/// Body of an upload (import) request for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAccountRequest {
    pub target_project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt_separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_cost: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_mem_cost: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelization: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dk_len: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash_order: Option<String>,
    pub users: Vec<UploadUser>,
}

impl UploadAccountRequest {
    /// Build the request for one batch of records.
    #[must_use]
    pub fn new(project_id: &str, options: &HashOptions, records: &[UserRecord]) -> Self {
        Self {
            target_project_id: project_id.to_string(),
            hash_algorithm: options.algorithm.map(|a| a.as_str().to_string()),
            signer_key: options.signer_key.clone(),
            salt_separator: options.salt_separator.clone(),
            rounds: options.rounds,
            memory_cost: options.memory_cost,
            cpu_mem_cost: options.cpu_mem_cost,
            parallelization: options.parallelization,
            block_size: options.block_size,
            dk_len: options.dk_len,
            password_hash_order: options.password_hash_order.map(|o| o.as_str().to_string()),
            users: records.iter().map(UploadUser::from).collect(),
        }
    }
}

/// An account as the upload endpoint expects it.
///
/// Hash and salt use the web-safe base64 alphabet; false flags and unset
/// fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUser {
    pub local_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<EncodedBlob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<EncodedBlob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provider_user_info: Vec<ProviderDocument>,
}

impl From<&UserRecord> for UploadUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            local_id: record.local_id.clone(),
            email: record.email.clone(),
            email_verified: record.email_verified,
            password_hash: record.password_hash.as_ref().map(EncodedBlob::to_web_safe_alphabet),
            salt: record.salt.as_ref().map(EncodedBlob::to_web_safe_alphabet),
            display_name: record.display_name.clone(),
            photo_url: record.photo_url.clone(),
            created_at: record.created_at.clone(),
            last_login_at: record.last_signed_in_at.clone(),
            phone_number: record.phone_number.clone(),
            disabled: record.disabled,
            provider_user_info: record.provider_links.iter().map(ProviderDocument::from).collect(),
        }
    }
}

/// Upload response. An empty body counts as full success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadAccountResponse {
    #[serde(default)]
    pub error: Vec<UploadError>,
}

/// One rejected account within an uploaded batch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadError {
    /// Position of the account within its batch.
    #[serde(deserialize_with = "index_from_any")]
    pub index: usize,
    #[serde(default)]
    pub message: String,
}

/// The service has sent batch indexes both as numbers and numeric strings.
fn index_from_any<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(usize),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
