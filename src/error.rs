//! Error types for the account migration CLI.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (1=usage, 4=validation, 6=sync, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

use crate::api::ApiError;
use crate::sync::SyncError;

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Usage (exit 1)
    MissingDataFile,
    UnsupportedFormat,

    // Validation (exit 4)
    InvalidArgument,
    InvalidHashOptions,
    InvalidRecord,

    // Sync (exit 6)
    SyncError,
    RetriesExhausted,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Remote service (exit 9)
    ServiceError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::MissingDataFile => "MISSING_DATA_FILE",
            Self::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidHashOptions => "INVALID_HASH_OPTIONS",
            Self::InvalidRecord => "INVALID_RECORD",
            Self::SyncError => "SYNC_ERROR",
            Self::RetriesExhausted => "RETRIES_EXHAUSTED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::ServiceError => "SERVICE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingDataFile | Self::UnsupportedFormat | Self::InternalError => 1,
            Self::InvalidArgument | Self::InvalidHashOptions | Self::InvalidRecord => 4,
            Self::SyncError | Self::RetriesExhausted => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::ServiceError => 9,
        }
    }

    /// Whether rerunning with corrected input (or later) can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument
                | Self::InvalidHashOptions
                | Self::InvalidRecord
                | Self::RetriesExhausted
        )
    }
}

// ── Domain errors ─────────────────────────────────────────────

/// Bad options or a malformed caller-supplied record.
///
/// Always raised before any request reaches the service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Must specify data file")]
    MissingDataFile,

    #[error("Unsupported data file format '{0}', should be csv or json")]
    UnsupportedFormat(String),

    #[error("Please specify data file format in file name, or use `--format`")]
    FormatNotSpecified,

    #[error("File extension implies {extension} but --format is {flag}")]
    ConflictingFormat { extension: String, flag: String },

    #[error("Unsupported hash algorithm {0}")]
    UnsupportedHashAlgorithm(String),

    #[error("Missing {} for hash algorithm {algorithm}", missing.join(", "))]
    MissingHashParameters {
        algorithm: String,
        missing: Vec<&'static str>,
    },

    #[error("Must provide valid {name}({range}) for hash algorithm {algorithm}")]
    InvalidHashParameter {
        algorithm: String,
        name: &'static str,
        range: String,
    },

    #[error("Unknown password hash order flag '{0}', should be SALT_FIRST or PASSWORD_FIRST")]
    UnknownHashInputOrder(String),

    #[error("Password users found but no hash algorithm was specified")]
    HashAlgorithmRequired,

    #[error("Batch size must be between 1 and {max}, got {actual}")]
    InvalidBatchSize { actual: usize, max: usize },

    #[error("User record must be a JSON object")]
    NotAnObject,

    #[error("User record has unsupported keys: {}", .0.join(","))]
    UnknownFields(Vec<String>),

    #[error("providerUserInfo entry has unsupported keys: {}", .0.join(","))]
    UnknownProviderFields(Vec<String>),

    #[error("providerUserInfo has unsupported providerId: {0}")]
    UnknownProvider(String),

    #[error("User record is missing localId")]
    MissingLocalId,

    #[error("User record has invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Record {index}: {source}")]
    AtRecord {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Attach the record position within the input file.
    #[must_use]
    pub fn at_record(self, index: usize) -> Self {
        Self::AtRecord {
            index,
            source: Box::new(self),
        }
    }

    const fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingDataFile => ErrorCode::MissingDataFile,
            Self::UnsupportedFormat(_)
            | Self::FormatNotSpecified
            | Self::ConflictingFormat { .. } => ErrorCode::UnsupportedFormat,
            Self::UnsupportedHashAlgorithm(_)
            | Self::MissingHashParameters { .. }
            | Self::InvalidHashParameter { .. }
            | Self::UnknownHashInputOrder(_)
            | Self::HashAlgorithmRequired => ErrorCode::InvalidHashOptions,
            Self::InvalidBatchSize { .. } => ErrorCode::InvalidArgument,
            Self::NotAnObject
            | Self::UnknownFields(_)
            | Self::UnknownProviderFields(_)
            | Self::UnknownProvider(_)
            | Self::MissingLocalId
            | Self::InvalidFormat(_)
            | Self::AtRecord { .. } => ErrorCode::InvalidRecord,
        }
    }
}

/// A row-format record that cannot be turned into a `UserRecord`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Row has no localId")]
    MissingLocalId,

    #[error("Password hash should be base64 encoded.")]
    InvalidPasswordHash,

    #[error("Password salt should be base64 encoded.")]
    InvalidSalt,
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in migration operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Service error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::Sync(SyncError::RetriesExhausted { .. }) => ErrorCode::RetriesExhausted,
            Self::Sync(SyncError::Api(_)) | Self::Api(_) => ErrorCode::ServiceError,
            Self::Sync(SyncError::Validation(e)) => e.error_code(),
            Self::Sync(SyncError::Io(_) | SyncError::FileNotFound(_)) | Self::Io(_) => {
                ErrorCode::IoError
            }
            Self::Sync(SyncError::Json(_)) | Self::Json(_) => ErrorCode::JsonError,
            Self::Sync(_) => ErrorCode::SyncError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Validation(ValidationError::MissingDataFile) => {
                Some("Pass the data file path, e.g. `authmigrate export users.json`".to_string())
            }
            Self::Validation(
                ValidationError::FormatNotSpecified | ValidationError::UnsupportedFormat(_),
            ) => Some("Use a .csv or .json file name, or pass `--format csv|json`".to_string()),
            Self::Validation(ValidationError::ConflictingFormat { .. }) => {
                Some("Drop `--format` or rename the file to match it".to_string())
            }
            Self::Validation(
                ValidationError::UnsupportedHashAlgorithm(_)
                | ValidationError::MissingHashParameters { .. },
            ) => Some(
                "Supported: HMAC_SHA512, HMAC_SHA256, HMAC_SHA1, HMAC_MD5, MD5, SHA1, SHA256, \
                 SHA512, PBKDF_SHA1, PBKDF2_SHA256, SCRYPT, BCRYPT, STANDARD_SCRYPT"
                    .to_string(),
            ),
            Self::Validation(ValidationError::HashAlgorithmRequired) => {
                Some("Pass `--hash-algo` with the algorithm the password hashes use".to_string())
            }
            Self::Sync(SyncError::RetriesExhausted { exported, .. }) => Some(format!(
                "{exported} account(s) were written before the export stopped. \
                 Rerun the export once the service responds again."
            )),
            Self::Config(msg) if msg.contains("token") => Some(
                "Set AUTHMIGRATE_TOKEN or pass `--token` with an OAuth access token".to_string(),
            ),
            Self::Config(msg) if msg.contains("project") => {
                Some("Set AUTHMIGRATE_PROJECT or pass `--project`".to_string())
            }
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
