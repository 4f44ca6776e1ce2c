//! Fixed-column row encoding.
//!
//! Layout (27 columns):
//!
//! | Columns | Content |
//! |---------|---------|
//! | 0-6     | localId, email, emailVerified, passwordHash, salt, displayName, photoUrl |
//! | 7-22    | provider blocks: google.com, facebook.com, twitter.com, github.com |
//! | 23-26   | createdAt, lastSignedInAt, phoneNumber, disabled |
//!
//! Unset values are empty strings. Values containing a comma are wrapped in
//! double quotes.

use crate::codec::provider_info::{pack_provider, unpack_providers};
use crate::codec::{escape_delimiter, unescape_delimiter, DELIMITER};
use crate::error::DecodeError;
use crate::model::{EncodedBlob, UserRecord};

/// Number of columns in a row.
pub const ROW_WIDTH: usize = 27;

/// One encoded row, column by column.
pub type RowFields = [String; ROW_WIDTH];

const LOCAL_ID: usize = 0;
const EMAIL: usize = 1;
const EMAIL_VERIFIED: usize = 2;
const PASSWORD_HASH: usize = 3;
const SALT: usize = 4;
const DISPLAY_NAME: usize = 5;
const PHOTO_URL: usize = 6;
const CREATED_AT: usize = 23;
const LAST_SIGNED_IN_AT: usize = 24;
const PHONE_NUMBER: usize = 25;
const DISABLED: usize = 26;

/// Encode a record into its 27 row columns.
///
/// Hash and salt are rewritten into the standard base64 alphabet. Provider
/// links for unknown providers are dropped; when a provider appears twice the
/// later link wins its block.
#[must_use]
pub fn encode_row(record: &UserRecord) -> RowFields {
    let mut row: RowFields = std::array::from_fn(|_| String::new());

    row[LOCAL_ID] = escape_delimiter(&record.local_id);
    row[EMAIL] = escape_opt(record.email.as_deref());
    row[EMAIL_VERIFIED] = record.email_verified.to_string();
    row[PASSWORD_HASH] = blob_column(record.password_hash.as_ref());
    row[SALT] = blob_column(record.salt.as_ref());
    row[DISPLAY_NAME] = escape_opt(record.display_name.as_deref());
    row[PHOTO_URL] = escape_opt(record.photo_url.as_deref());

    for link in &record.provider_links {
        if !pack_provider(link, &mut row) {
            tracing::debug!(
                local_id = %record.local_id,
                provider = %link.provider_id,
                "Dropping provider link with no row block"
            );
        }
    }

    row[CREATED_AT] = escape_opt(record.created_at.as_deref());
    row[LAST_SIGNED_IN_AT] = escape_opt(record.last_signed_in_at.as_deref());
    row[PHONE_NUMBER] = escape_opt(record.phone_number.as_deref());
    row[DISABLED] = record.disabled.to_string();

    row
}

/// Join encoded columns into one line (without line terminator).
#[must_use]
pub fn format_row(row: &RowFields) -> String {
    row.join(&DELIMITER.to_string())
}

/// Decode row columns back into a record.
///
/// Short rows are allowed: missing trailing columns read as unset. Provider
/// links come back in row-block order.
///
/// # Errors
///
/// Returns an error if the id column is empty or the hash or salt column is
/// not valid standard base64.
pub fn decode_row<S: AsRef<str>>(fields: &[S]) -> Result<UserRecord, DecodeError> {
    let local_id = row_field(fields, LOCAL_ID).ok_or(DecodeError::MissingLocalId)?;

    let password_hash = row_field(fields, PASSWORD_HASH).map(EncodedBlob::new);
    if password_hash.as_ref().is_some_and(|h| !h.is_valid_standard()) {
        return Err(DecodeError::InvalidPasswordHash);
    }
    let salt = row_field(fields, SALT).map(EncodedBlob::new);
    if salt.as_ref().is_some_and(|s| !s.is_valid_standard()) {
        return Err(DecodeError::InvalidSalt);
    }

    Ok(UserRecord {
        local_id,
        email: row_field(fields, EMAIL),
        email_verified: row_flag(fields, EMAIL_VERIFIED),
        password_hash,
        salt,
        display_name: row_field(fields, DISPLAY_NAME),
        photo_url: row_field(fields, PHOTO_URL),
        phone_number: row_field(fields, PHONE_NUMBER),
        created_at: row_field(fields, CREATED_AT),
        last_signed_in_at: row_field(fields, LAST_SIGNED_IN_AT),
        disabled: row_flag(fields, DISABLED),
        provider_links: unpack_providers(fields),
    })
}

/// Non-empty, unquoted column value.
pub(crate) fn row_field<S: AsRef<str>>(fields: &[S], index: usize) -> Option<String> {
    fields
        .get(index)
        .map(|f| unescape_delimiter(f.as_ref()))
        .filter(|f| !f.is_empty())
        .map(String::from)
}

fn row_flag<S: AsRef<str>>(fields: &[S], index: usize) -> bool {
    fields.get(index).is_some_and(|f| f.as_ref() == "true")
}

pub(crate) fn escape_opt(value: Option<&str>) -> String {
    value.map(escape_delimiter).unwrap_or_default()
}

fn blob_column(blob: Option<&EncodedBlob>) -> String {
    blob.map(|b| b.to_standard_alphabet().as_str().to_string())
        .unwrap_or_default()
}
