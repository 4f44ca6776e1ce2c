//! Data models for account migration.
//!
//! - [`UserRecord`] - one identity account, independent of any wire or file shape
//! - [`ProviderLink`] - a federated-identity binding on an account
//! - [`ProviderId`] - the identity providers the file formats can carry

pub mod provider;
pub mod user;

pub use provider::{ProviderId, ProviderLink};
pub use user::{EncodedBlob, UserRecord};
