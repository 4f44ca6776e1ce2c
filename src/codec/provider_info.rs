//! Provider blocks of the row layout.
//!
//! Each known provider owns 4 contiguous columns starting at
//! [`ProviderId::row_offset`]: rawId, email, displayName, photoUrl.
//! A row holds at most one link per provider.

use crate::codec::escape_delimiter;
use crate::codec::row::{escape_opt, row_field, RowFields};
use crate::model::{ProviderId, ProviderLink};

const RAW_ID: usize = 0;
const EMAIL: usize = 1;
const DISPLAY_NAME: usize = 2;
const PHOTO_URL: usize = 3;

/// Write `link` into its provider block.
///
/// Returns `false` (leaving the row untouched) when the provider has no
/// block. Packing the same provider twice overwrites the earlier link.
pub fn pack_provider(link: &ProviderLink, row: &mut RowFields) -> bool {
    let Some(provider) = link.known_provider() else {
        return false;
    };
    let start = provider.row_offset();

    row[start + RAW_ID] = escape_delimiter(link.raw_id.as_deref().unwrap_or_default());
    row[start + EMAIL] = escape_opt(link.email.as_deref());
    row[start + DISPLAY_NAME] = escape_opt(link.display_name.as_deref());
    row[start + PHOTO_URL] = escape_opt(link.photo_url.as_deref());
    true
}

/// Read every provider block whose rawId column is set.
#[must_use]
pub fn unpack_providers<S: AsRef<str>>(fields: &[S]) -> Vec<ProviderLink> {
    ProviderId::ALL
        .into_iter()
        .filter_map(|provider| {
            let start = provider.row_offset();
            let raw_id = row_field(fields, start + RAW_ID)?;
            Some(ProviderLink {
                provider_id: provider.as_str().to_string(),
                raw_id: Some(raw_id),
                email: row_field(fields, start + EMAIL),
                display_name: row_field(fields, start + DISPLAY_NAME),
                photo_url: row_field(fields, start + PHOTO_URL),
            })
        })
        .collect()
}
