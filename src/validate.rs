//! Input validation for export and import.
//!
//! Everything here runs before the first request goes out: file format
//! resolution, hash-algorithm options, batch sizing, and per-record
//! document checks.

use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;

use tracing::warn;

use crate::codec::decode_document;
use crate::error::ValidationError;
use crate::model::UserRecord;

/// Largest batch the upload endpoint accepts.
pub const MAX_BATCH_SIZE: usize = 1000;

// ── File format ──────────────────────────────────────────────

/// On-disk encoding of an account file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Fixed-column rows.
    Csv,
    /// Field-named documents.
    Json,
}

impl FileFormat {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the file format from the data file's extension and `--format`.
///
/// # Errors
///
/// Returns an error if no data file is given, the flag names an unknown
/// format, the flag contradicts the extension, or neither source names a
/// format.
pub fn resolve_format(
    data_file: Option<&Path>,
    format_flag: Option<&str>,
) -> Result<FileFormat, ValidationError> {
    let path = data_file.ok_or(ValidationError::MissingDataFile)?;

    let from_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(FileFormat::parse);

    let from_flag = match format_flag {
        Some(flag) => Some(
            FileFormat::parse(flag)
                .ok_or_else(|| ValidationError::UnsupportedFormat(flag.to_string()))?,
        ),
        None => None,
    };

    match (from_extension, from_flag) {
        (Some(ext), Some(flag)) if ext != flag => Err(ValidationError::ConflictingFormat {
            extension: ext.to_string(),
            flag: flag.to_string(),
        }),
        (Some(format), _) | (None, Some(format)) => Ok(format),
        (None, None) => Err(ValidationError::FormatNotSpecified),
    }
}

/// Check a requested batch size against the upload limit.
///
/// # Errors
///
/// Returns an error if the size is zero or above [`MAX_BATCH_SIZE`].
pub fn validate_batch_size(size: usize) -> Result<usize, ValidationError> {
    if (1..=MAX_BATCH_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(ValidationError::InvalidBatchSize {
            actual: size,
            max: MAX_BATCH_SIZE,
        })
    }
}

// ── Hash options ─────────────────────────────────────────────

/// Password hash algorithms the upload endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    HmacSha512,
    HmacSha256,
    HmacSha1,
    HmacMd5,
    Md5,
    Sha1,
    Sha256,
    Sha512,
    PbkdfSha1,
    Pbkdf2Sha256,
    Scrypt,
    Bcrypt,
    StandardScrypt,
}

impl HashAlgorithm {
    pub const ALL: [Self; 13] = [
        Self::HmacSha512,
        Self::HmacSha256,
        Self::HmacSha1,
        Self::HmacMd5,
        Self::Md5,
        Self::Sha1,
        Self::Sha256,
        Self::Sha512,
        Self::PbkdfSha1,
        Self::Pbkdf2Sha256,
        Self::Scrypt,
        Self::Bcrypt,
        Self::StandardScrypt,
    ];

    /// Name as sent in `hashAlgorithm`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HmacSha512 => "HMAC_SHA512",
            Self::HmacSha256 => "HMAC_SHA256",
            Self::HmacSha1 => "HMAC_SHA1",
            Self::HmacMd5 => "HMAC_MD5",
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
            Self::PbkdfSha1 => "PBKDF_SHA1",
            Self::Pbkdf2Sha256 => "PBKDF2_SHA256",
            Self::Scrypt => "SCRYPT",
            Self::Bcrypt => "BCRYPT",
            Self::StandardScrypt => "STANDARD_SCRYPT",
        }
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let upper = name.to_uppercase();
        Self::ALL.into_iter().find(|a| a.as_str() == upper)
    }

    /// Option names that must accompany this algorithm.
    #[must_use]
    pub const fn required_parameters(&self) -> &'static [&'static str] {
        match self {
            Self::HmacSha512 | Self::HmacSha256 | Self::HmacSha1 | Self::HmacMd5 => &["hashKey"],
            Self::Md5
            | Self::Sha1
            | Self::Sha256
            | Self::Sha512
            | Self::PbkdfSha1
            | Self::Pbkdf2Sha256 => &["rounds"],
            Self::Scrypt => &["hashKey", "rounds", "memCost"],
            Self::Bcrypt => &[],
            Self::StandardScrypt => &["memCost", "parallelization", "blockSize", "dkLen"],
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which salt and password were fed to the hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordHashOrder {
    SaltAndPassword,
    PasswordAndSalt,
}

impl PasswordHashOrder {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SaltAndPassword => "SALT_AND_PASSWORD",
            Self::PasswordAndSalt => "PASSWORD_AND_SALT",
        }
    }
}

/// Hash options exactly as the user typed them.
#[derive(Debug, Clone, Default)]
pub struct RawHashOptions {
    pub hash_algo: Option<String>,
    pub hash_key: Option<String>,
    pub salt_separator: Option<String>,
    pub rounds: Option<String>,
    pub mem_cost: Option<String>,
    pub parallelization: Option<String>,
    pub block_size: Option<String>,
    pub dk_len: Option<String>,
    pub hash_input_order: Option<String>,
}

impl RawHashOptions {
    /// Look up an option by its documented name; empty values count as unset.
    fn param(&self, name: &str) -> Option<&str> {
        let value = match name {
            "hashKey" => &self.hash_key,
            "rounds" => &self.rounds,
            "memCost" => &self.mem_cost,
            "parallelization" => &self.parallelization,
            "blockSize" => &self.block_size,
            "dkLen" => &self.dk_len,
            _ => return None,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Validated hash options, ready for the upload request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashOptions {
    pub algorithm: Option<HashAlgorithm>,
    /// Base64 signer key, passed through untouched.
    pub signer_key: Option<String>,
    pub salt_separator: Option<String>,
    pub rounds: Option<u32>,
    pub memory_cost: Option<u32>,
    pub cpu_mem_cost: Option<u32>,
    pub parallelization: Option<u32>,
    pub block_size: Option<u32>,
    pub dk_len: Option<u32>,
    pub password_hash_order: Option<PasswordHashOrder>,
}

/// Validate hash options for an import.
///
/// No algorithm at all is accepted (only accounts without passwords can then
/// be imported).
///
/// # Errors
///
/// Returns an error if the algorithm is not supported, a required parameter
/// is missing (all missing names are listed), a numeric parameter is out of
/// range, or the hash input order is unknown.
pub fn validate_hash_options(raw: &RawHashOptions) -> Result<HashOptions, ValidationError> {
    let Some(name) = raw.hash_algo.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        warn!("No hash algorithm specified. Password users cannot be imported.");
        return Ok(HashOptions::default());
    };

    let algorithm = HashAlgorithm::parse(name)
        .ok_or_else(|| ValidationError::UnsupportedHashAlgorithm(name.to_string()))?;

    let missing: Vec<&'static str> = algorithm
        .required_parameters()
        .iter()
        .copied()
        .filter(|p| raw.param(p).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingHashParameters {
            algorithm: algorithm.to_string(),
            missing,
        });
    }

    let number = |name: &'static str, range: RangeInclusive<u32>| {
        bounded_param(algorithm, raw.param(name), name, range)
    };

    let mut options = HashOptions {
        algorithm: Some(algorithm),
        ..HashOptions::default()
    };

    match algorithm {
        HashAlgorithm::HmacSha512
        | HashAlgorithm::HmacSha256
        | HashAlgorithm::HmacSha1
        | HashAlgorithm::HmacMd5 => {
            options.signer_key = raw.param("hashKey").map(String::from);
        }
        HashAlgorithm::Md5 => options.rounds = Some(number("rounds", 0..=8192)?),
        HashAlgorithm::Sha1 | HashAlgorithm::Sha256 | HashAlgorithm::Sha512 => {
            options.rounds = Some(number("rounds", 1..=8192)?);
        }
        HashAlgorithm::PbkdfSha1 | HashAlgorithm::Pbkdf2Sha256 => {
            options.rounds = Some(number("rounds", 0..=120_000)?);
        }
        HashAlgorithm::Scrypt => {
            options.signer_key = raw.param("hashKey").map(String::from);
            options.rounds = Some(number("rounds", 1..=8)?);
            options.memory_cost = Some(number("memCost", 1..=14)?);
            options.salt_separator = raw.salt_separator.clone().filter(|s| !s.is_empty());
        }
        HashAlgorithm::Bcrypt => {}
        HashAlgorithm::StandardScrypt => {
            options.cpu_mem_cost = Some(number("memCost", 1..=u32::MAX)?);
            options.parallelization = Some(number("parallelization", 1..=u32::MAX)?);
            options.block_size = Some(number("blockSize", 1..=u32::MAX)?);
            options.dk_len = Some(number("dkLen", 1..=u32::MAX)?);
        }
    }

    options.password_hash_order = match raw.hash_input_order.as_deref() {
        None | Some("") => None,
        Some(order) => Some(match order.to_uppercase().as_str() {
            "SALT_FIRST" => PasswordHashOrder::SaltAndPassword,
            "PASSWORD_FIRST" => PasswordHashOrder::PasswordAndSalt,
            _ => return Err(ValidationError::UnknownHashInputOrder(order.to_string())),
        }),
    };

    Ok(options)
}

fn bounded_param(
    algorithm: HashAlgorithm,
    value: Option<&str>,
    name: &'static str,
    range: RangeInclusive<u32>,
) -> Result<u32, ValidationError> {
    value
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|n| range.contains(n))
        .ok_or_else(|| ValidationError::InvalidHashParameter {
            algorithm: algorithm.to_string(),
            name,
            range: format!("{}..{}", range.start(), range.end()),
        })
}

/// Refuse password accounts when no algorithm says how they were hashed.
///
/// # Errors
///
/// Returns an error if any record has a password hash and `options` has no
/// algorithm.
pub fn check_password_users(
    records: &[UserRecord],
    options: &HashOptions,
) -> Result<(), ValidationError> {
    if options.algorithm.is_none() && records.iter().any(UserRecord::has_password) {
        return Err(ValidationError::HashAlgorithmRequired);
    }
    Ok(())
}

// ── Records ──────────────────────────────────────────────────

/// Validate one caller-supplied user document.
///
/// # Errors
///
/// Returns the document decoding error, naming unknown fields or providers.
pub fn validate_record(document: &serde_json::Value) -> Result<UserRecord, ValidationError> {
    decode_document(document)
}
