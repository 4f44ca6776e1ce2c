//! Record codec: `UserRecord` to and from its file encodings.
//!
//! - [`row`] - fixed-column, comma-delimited layout (CSV files)
//! - [`document`] - field-named objects with an allowlist (JSON files)
//! - [`provider_info`] - 4-slot provider blocks inside the row layout
//!
//! Export is tolerant: anything the service returns encodes. Decoding is
//! strict, since it validates caller-supplied files before upload.

pub mod document;
pub mod provider_info;
pub mod row;

pub use document::{decode_document, encode_document, ProviderDocument, UserDocument};
pub use provider_info::{pack_provider, unpack_providers};
pub use row::{decode_row, encode_row, format_row, RowFields, ROW_WIDTH};

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Field delimiter of the row format.
pub const DELIMITER: char = ',';

/// Standard alphabet, padding optional.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Rewrite web-safe base64 (`_`, `-`) with the standard alphabet (`/`, `+`).
///
/// Character substitution only: no decoding, no padding changes.
#[must_use]
pub fn to_standard_alphabet(data: &str) -> String {
    data.replace('_', "/").replace('-', "+")
}

/// Rewrite standard base64 (`/`, `+`) with the web-safe alphabet (`_`, `-`).
#[must_use]
pub fn to_web_safe_alphabet(data: &str) -> String {
    data.replace('/', "_").replace('+', "-")
}

/// Whether `data` is canonical standard-alphabet base64.
///
/// Missing padding is accepted; stray characters, bad lengths and
/// non-zero trailing bits are not.
#[must_use]
pub fn is_valid_base64(data: &str) -> bool {
    STANDARD_LENIENT.decode(data).is_ok()
}

/// Wrap a value in double quotes when it contains the delimiter.
///
/// Embedded quotes are left alone; the row format defines no quote escaping.
#[must_use]
pub fn escape_delimiter(value: &str) -> String {
    if value.contains(DELIMITER) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Inverse of [`escape_delimiter`] for fields that were not unquoted by a CSV reader.
#[must_use]
pub fn unescape_delimiter(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .filter(|inner| inner.contains(DELIMITER))
        .unwrap_or(value)
}
