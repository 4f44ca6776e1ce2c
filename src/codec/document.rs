//! Field-named document encoding.
//!
//! Documents carry only the fields listed in [`USER_FIELDS`] and, per
//! provider link, [`PROVIDER_FIELDS`]. The wire structs below are the
//! allowlist: anything not declared on them cannot be written.
//!
//! Encoding drops links to unknown providers. Decoding rejects them, along
//! with any key outside the allowlist.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{EncodedBlob, ProviderId, ProviderLink, UserRecord};

/// Top-level keys a user document may contain.
pub const USER_FIELDS: [&str; 12] = [
    "localId",
    "email",
    "emailVerified",
    "passwordHash",
    "salt",
    "displayName",
    "photoUrl",
    "lastSignedInAt",
    "createdAt",
    "phoneNumber",
    "disabled",
    "providerUserInfo",
];

/// Keys a `providerUserInfo` entry may contain.
pub const PROVIDER_FIELDS: [&str; 5] = ["providerId", "rawId", "email", "displayName", "photoUrl"];

/// A user as written to and read from document files.
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub local_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<EncodedBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<EncodedBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_signed_in_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_user_info: Option<Vec<ProviderDocument>>,
}

/// One provider link inside a [`UserDocument`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDocument {
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl From<&ProviderLink> for ProviderDocument {
    fn from(link: &ProviderLink) -> Self {
        Self {
            provider_id: link.provider_id.clone(),
            raw_id: link.raw_id.clone(),
            email: link.email.clone(),
            display_name: link.display_name.clone(),
            photo_url: link.photo_url.clone(),
        }
    }
}

impl From<ProviderDocument> for ProviderLink {
    fn from(doc: ProviderDocument) -> Self {
        Self {
            provider_id: doc.provider_id,
            raw_id: doc.raw_id,
            email: doc.email,
            display_name: doc.display_name,
            photo_url: doc.photo_url,
        }
    }
}

/// Encode a record as a document.
///
/// Hash and salt are rewritten into the standard base64 alphabet. Links to
/// unknown providers are silently dropped.
#[must_use]
pub fn encode_document(record: &UserRecord) -> UserDocument {
    let provider_user_info = (!record.provider_links.is_empty()).then(|| {
        record
            .provider_links
            .iter()
            .filter(|link| link.known_provider().is_some())
            .map(ProviderDocument::from)
            .collect()
    });

    UserDocument {
        local_id: record.local_id.clone(),
        email: record.email.clone(),
        email_verified: record.email_verified,
        password_hash: record.password_hash.as_ref().map(EncodedBlob::to_standard_alphabet),
        salt: record.salt.as_ref().map(EncodedBlob::to_standard_alphabet),
        display_name: record.display_name.clone(),
        photo_url: record.photo_url.clone(),
        last_signed_in_at: record.last_signed_in_at.clone(),
        created_at: record.created_at.clone(),
        phone_number: record.phone_number.clone(),
        disabled: record.disabled,
        provider_user_info,
    }
}

/// Decode and validate a caller-supplied user document.
///
/// # Errors
///
/// Returns an error naming the offending keys or provider when the document
/// has keys outside the allowlist, links an unknown provider, lacks
/// `localId`, has mistyped values, or carries a hash or salt that is not
/// standard base64.
pub fn decode_document(value: &Value) -> Result<UserRecord, ValidationError> {
    let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let unknown = unknown_keys(obj, &USER_FIELDS);
    if !unknown.is_empty() {
        return Err(ValidationError::UnknownFields(unknown));
    }

    if let Some(infos) = obj.get("providerUserInfo").and_then(Value::as_array) {
        for info in infos {
            check_provider_entry(info)?;
        }
    }

    if !obj.contains_key("localId") {
        return Err(ValidationError::MissingLocalId);
    }

    let doc: UserDocument = serde_json::from_value(value.clone())
        .map_err(|e| ValidationError::InvalidFormat(e.to_string()))?;
    if doc.local_id.trim().is_empty() {
        return Err(ValidationError::MissingLocalId);
    }

    if doc.password_hash.as_ref().is_some_and(|h| !h.is_valid_standard()) {
        return Err(ValidationError::InvalidFormat(
            "Password hash should be base64 encoded.".to_string(),
        ));
    }
    if doc.salt.as_ref().is_some_and(|s| !s.is_valid_standard()) {
        return Err(ValidationError::InvalidFormat(
            "Password salt should be base64 encoded.".to_string(),
        ));
    }

    Ok(UserRecord {
        local_id: doc.local_id,
        email: doc.email,
        email_verified: doc.email_verified,
        password_hash: doc.password_hash,
        salt: doc.salt,
        display_name: doc.display_name,
        photo_url: doc.photo_url,
        phone_number: doc.phone_number,
        created_at: doc.created_at,
        last_signed_in_at: doc.last_signed_in_at,
        disabled: doc.disabled,
        provider_links: doc
            .provider_user_info
            .unwrap_or_default()
            .into_iter()
            .map(ProviderLink::from)
            .collect(),
    })
}

fn check_provider_entry(info: &Value) -> Result<(), ValidationError> {
    let entry = info.as_object().ok_or_else(|| {
        ValidationError::InvalidFormat("providerUserInfo entries must be objects".to_string())
    })?;

    let provider_id = entry.get("providerId").and_then(Value::as_str).ok_or_else(|| {
        ValidationError::InvalidFormat("providerUserInfo entry is missing providerId".to_string())
    })?;
    if ProviderId::parse(provider_id).is_none() {
        return Err(ValidationError::UnknownProvider(provider_id.to_string()));
    }

    let unknown = unknown_keys(entry, &PROVIDER_FIELDS);
    if !unknown.is_empty() {
        return Err(ValidationError::UnknownProviderFields(unknown));
    }
    Ok(())
}

fn unknown_keys(obj: &serde_json::Map<String, Value>, allowed: &[&str]) -> Vec<String> {
    obj.keys()
        .filter(|k| !allowed.contains(&k.as_str()))
        .cloned()
        .collect()
}

/// Accept a timestamp given either as a JSON string or a JSON number.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_document_allowlist_and_order() {
        let record = UserRecord {
            email: Some("a@b.c".to_string()),
            password_hash: Some(EncodedBlob::new("ab_c-d==")),
            last_signed_in_at: Some("1486071900000".to_string()),
            ..UserRecord::new("u1")
        };

        let text = serde_json::to_string(&encode_document(&record)).unwrap();
        assert_eq!(
            text,
            r#"{"localId":"u1","email":"a@b.c","emailVerified":false,"passwordHash":"ab/c+d==","lastSignedInAt":"1486071900000","disabled":false}"#
        );
    }

    #[test]
    fn test_encode_document_drops_unknown_providers() {
        let mut record = UserRecord::new("u1");
        record.provider_links = vec![
            ProviderLink {
                provider_id: "otheridp.com".to_string(),
                raw_id: Some("x".to_string()),
                ..ProviderLink::default()
            },
            ProviderLink::new(ProviderId::Google, "g-1"),
        ];

        let doc = encode_document(&record);
        let links = doc.provider_user_info.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].provider_id, "google.com");
    }

    #[test]
    fn test_document_round_trip_validates() {
        let record = UserRecord {
            email: Some("a@b.c".to_string()),
            email_verified: true,
            password_hash: Some(EncodedBlob::new("Jlf7onfLbzqPNFP/1pqhx6fQF/w=")),
            display_name: Some("Doe, Jane".to_string()),
            created_at: Some("1486071832000".to_string()),
            disabled: true,
            provider_links: vec![ProviderLink::new(ProviderId::Github, "gh-1")],
            ..UserRecord::new("u1")
        };

        let value = serde_json::to_value(encode_document(&record)).unwrap();
        let decoded = decode_document(&value).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_rejects_unknown_top_level_field() {
        let err = decode_document(&json!({"uid": "123", "email": "test@test.org"})).unwrap_err();
        assert_eq!(err, ValidationError::UnknownFields(vec!["uid".to_string()]));
    }

    #[test]
    fn test_decode_rejects_unknown_provider_field() {
        let err = decode_document(&json!({
            "localId": "123",
            "email": "test@test.org",
            "providerUserInfo": [
                {"providerId": "google.com", "googleId": "abc", "email": "test@test.org"}
            ]
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownProviderFields(vec!["googleId".to_string()])
        );
    }

    #[test]
    fn test_decode_rejects_unknown_provider() {
        let err = decode_document(&json!({
            "localId": "123",
            "email": "test@test.org",
            "providerUserInfo": [
                {"providerId": "otheridp.com", "rawId": "abc", "email": "test@test.org"}
            ]
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::UnknownProvider("otheridp.com".to_string()));
    }

    #[test]
    fn test_decode_checks_password_hash() {
        assert!(decode_document(&json!({"localId": "123", "passwordHash": "false"})).is_err());
        assert!(
            decode_document(&json!({"localId": "123", "passwordHash": "Jlf7onfLbzqPNFP/1pqhx6fQF/w="}))
                .is_ok()
        );
    }

    #[test]
    fn test_decode_accepts_numeric_timestamps() {
        let record =
            decode_document(&json!({"localId": "1", "createdAt": 1486071832000_i64})).unwrap();
        assert_eq!(record.created_at.as_deref(), Some("1486071832000"));
    }

    #[test]
    fn test_decode_requires_local_id() {
        let err = decode_document(&json!({"email": "a@b.c"})).unwrap_err();
        assert_eq!(err, ValidationError::MissingLocalId);
    }

    #[test]
    fn test_decode_rejects_blank_local_id() {
        for id in ["", "   "] {
            let err = decode_document(&json!({"localId": id, "email": "a@b.c"})).unwrap_err();
            assert_eq!(err, ValidationError::MissingLocalId);
        }
    }

    /// Export drops unknown providers while import rejects them. Both
    /// behaviors are intended and must stay asymmetric.
    #[test]
    fn test_unknown_provider_asymmetry_is_intentional() {
        let mut record = UserRecord::new("u1");
        record.provider_links.push(ProviderLink {
            provider_id: "otheridp.com".to_string(),
            raw_id: Some("x".to_string()),
            ..ProviderLink::default()
        });

        let exported = serde_json::to_value(encode_document(&record)).unwrap();
        assert_eq!(exported["providerUserInfo"], json!([]));
        assert!(decode_document(&exported).is_ok());

        let mut supplied = exported;
        supplied["providerUserInfo"] = json!([{"providerId": "otheridp.com", "rawId": "x"}]);
        assert!(decode_document(&supplied).is_err());
    }
}
