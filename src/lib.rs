//! authmigrate - bulk account migration for an identity service
//!
//! This crate provides the core functionality for the `authmigrate` CLI tool:
//! exporting every account of a project into a data file, and importing a
//! data file back in batches.
//!
//! # Architecture
//!
//! - [`model`] - Account data types (`UserRecord`, `ProviderLink`)
//! - [`codec`] - Row and document encodings of accounts
//! - [`validate`] - Checks run before any request is sent
//! - [`api`] - Identity service client (`AccountApi`)
//! - [`sync`] - Export and import drivers
//! - [`config`] - Connection settings
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};
