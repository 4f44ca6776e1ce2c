//! Federated identity providers.

use std::fmt;

/// Identity providers that the row and document formats can carry.
///
/// Each provider owns a fixed 4-slot block in the row layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Google,
    Facebook,
    Twitter,
    Github,
}

impl ProviderId {
    /// All known providers, in row-layout order.
    pub const ALL: [Self; 4] = [Self::Google, Self::Facebook, Self::Twitter, Self::Github];

    /// The provider id as the service spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google.com",
            Self::Facebook => "facebook.com",
            Self::Twitter => "twitter.com",
            Self::Github => "github.com",
        }
    }

    /// First row column of this provider's block.
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        match self {
            Self::Google => 7,
            Self::Facebook => 11,
            Self::Twitter => 15,
            Self::Github => 19,
        }
    }

    /// Look up a provider by its service id. Unknown ids yield `None`.
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == id)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One federated-identity binding.
///
/// `provider_id` stays a raw string: accounts downloaded from the service may
/// reference providers outside [`ProviderId::ALL`], and export has to accept them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderLink {
    pub provider_id: String,
    pub raw_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl ProviderLink {
    /// Create a link with only the provider and provider-side id set.
    pub fn new(provider: ProviderId, raw_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider.as_str().to_string(),
            raw_id: Some(raw_id.into()),
            ..Self::default()
        }
    }

    /// The provider, if it is one of the known ones.
    #[must_use]
    pub fn known_provider(&self) -> Option<ProviderId> {
        ProviderId::parse(&self.provider_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_providers() {
        for provider in ProviderId::ALL {
            assert_eq!(ProviderId::parse(provider.as_str()), Some(provider));
        }
        assert_eq!(ProviderId::parse("otheridp.com"), None);
        assert_eq!(ProviderId::parse("Google.com"), None);
    }

    #[test]
    fn test_row_blocks_do_not_overlap() {
        let offsets: Vec<usize> = ProviderId::ALL.iter().map(ProviderId::row_offset).collect();
        assert_eq!(offsets, vec![7, 11, 15, 19]);
    }
}
