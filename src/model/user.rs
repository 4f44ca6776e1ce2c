//! User account model.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::model::ProviderLink;

/// Base64 text of an opaque byte blob (password hash or salt).
///
/// The text is carried as-is between alphabets; the underlying bytes are
/// only ever decoded to check that the text is well formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedBlob(String);

impl EncodedBlob {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Same blob written with the standard alphabet (`/`, `+`).
    #[must_use]
    pub fn to_standard_alphabet(&self) -> Self {
        Self(codec::to_standard_alphabet(&self.0))
    }

    /// Same blob written with the web-safe alphabet (`_`, `-`).
    #[must_use]
    pub fn to_web_safe_alphabet(&self) -> Self {
        Self(codec::to_web_safe_alphabet(&self.0))
    }

    /// Whether the text is valid standard-alphabet base64.
    #[must_use]
    pub fn is_valid_standard(&self) -> bool {
        codec::is_valid_base64(&self.0)
    }
}

/// One identity account.
///
/// Constructed per downloaded page or per parsed input record, written or
/// sent, then dropped. Timestamps are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub local_id: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub password_hash: Option<EncodedBlob>,
    pub salt: Option<EncodedBlob>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: Option<String>,
    pub last_signed_in_at: Option<String>,
    pub disabled: bool,
    pub provider_links: Vec<ProviderLink>,
}

impl UserRecord {
    /// Create a record with only the account id set.
    pub fn new(local_id: impl Into<String>) -> Self {
        Self {
            local_id: local_id.into(),
            ..Self::default()
        }
    }

    /// Whether the account carries a password hash.
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}
