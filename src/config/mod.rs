//! Configuration management.
//!
//! Connection settings come from, in order of priority:
//!
//! 1. Command-line flags
//! 2. Environment variables (`AUTHMIGRATE_PROJECT`, `AUTHMIGRATE_TOKEN`,
//!    `AUTHMIGRATE_API_ORIGIN`)
//! 3. `~/.authmigrate/config.json`
//! 4. Built-in defaults (API origin only)
//!
//! Flags and environment variables are merged by clap before they get here,
//! so this module only sees them as [`Overrides`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_ORIGIN;
use crate::error::{Error, Result};

pub const ENV_PROJECT: &str = "AUTHMIGRATE_PROJECT";
pub const ENV_TOKEN: &str = "AUTHMIGRATE_TOKEN";
pub const ENV_API_ORIGIN: &str = "AUTHMIGRATE_API_ORIGIN";
pub const ENV_CONFIG: &str = "AUTHMIGRATE_CONFIG";

/// Contents of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub api_origin: Option<String>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project: Option<String>,
    pub access_token: Option<String>,
    pub api_origin: Option<String>,
    pub config_path: Option<PathBuf>,
}

/// Fully resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project: String,
    pub access_token: String,
    pub api_origin: String,
}

/// Default config file location: `~/.authmigrate/config.json`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".authmigrate").join("config.json"))
}

/// Load a config file. A missing file is an empty config.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Merge overrides over a config file.
///
/// # Errors
///
/// Returns an error naming the missing setting if no project or token is
/// available.
pub fn resolve_settings(overrides: &Overrides, file: &ConfigFile) -> Result<Settings> {
    let pick = |over: &Option<String>, from_file: &Option<String>| {
        over.clone()
            .or_else(|| from_file.clone())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let project = pick(&overrides.project, &file.project).ok_or_else(|| {
        Error::Config(format!("No project configured (set --project or {ENV_PROJECT})"))
    })?;
    let access_token = pick(&overrides.access_token, &file.access_token).ok_or_else(|| {
        Error::Config(format!("No access token configured (set --token or {ENV_TOKEN})"))
    })?;
    let api_origin = pick(&overrides.api_origin, &file.api_origin)
        .unwrap_or_else(|| DEFAULT_API_ORIGIN.to_string());

    Ok(Settings {
        project,
        access_token,
        api_origin,
    })
}

/// Resolve settings from overrides and the config file they point at.
///
/// # Errors
///
/// Returns an error if the config file is unreadable or a required setting
/// is missing.
pub fn load_settings(overrides: &Overrides) -> Result<Settings> {
    let path = overrides.config_path.clone().or_else(default_config_path);
    let file = match path {
        Some(path) => load_config_file(&path)?,
        None => ConfigFile::default(),
    };
    resolve_settings(overrides, &file)
}
