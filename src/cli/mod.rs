//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{ENV_API_ORIGIN, ENV_CONFIG, ENV_PROJECT, ENV_TOKEN, Overrides};
use crate::validate::{RawHashOptions, MAX_BATCH_SIZE};

pub mod commands;

/// Move user accounts between an identity service project and data files
#[derive(Parser, Debug)]
#[command(name = "authmigrate", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Target project id
    #[arg(long, global = true, env = ENV_PROJECT)]
    pub project: Option<String>,

    /// OAuth access token for the identity service
    #[arg(long, global = true, env = ENV_TOKEN, hide_env_values = true)]
    pub token: Option<String>,

    /// Identity service origin (default: https://www.googleapis.com)
    #[arg(long, global = true, env = ENV_API_ORIGIN)]
    pub api_origin: Option<String>,

    /// Config file path (default: ~/.authmigrate/config.json)
    #[arg(long, global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Connection values given on the command line or via environment.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            project: self.project.clone(),
            access_token: self.token.clone(),
            api_origin: self.api_origin.clone(),
            config_path: self.config.clone(),
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every account of the project into a data file
    Export(ExportArgs),

    /// Import accounts from a data file into the project
    Import(ImportArgs),

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Destination file (.csv or .json)
    pub data_file: Option<PathBuf>,

    /// File format, when the file name does not say (csv, json)
    #[arg(long)]
    pub format: Option<String>,

    /// Accounts requested per page
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    pub batch_size: usize,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Source file (.csv or .json)
    pub data_file: Option<PathBuf>,

    /// File format, when the file name does not say (csv, json)
    #[arg(long)]
    pub format: Option<String>,

    /// Password hash algorithm of the imported accounts
    #[arg(long)]
    pub hash_algo: Option<String>,

    /// Signer key for HMAC and SCRYPT hashes (base64)
    #[arg(long)]
    pub hash_key: Option<String>,

    /// Salt separator for SCRYPT hashes (base64)
    #[arg(long)]
    pub salt_separator: Option<String>,

    /// Hash rounds
    #[arg(long)]
    pub rounds: Option<String>,

    /// Memory cost (SCRYPT) or CPU/memory cost (STANDARD_SCRYPT)
    #[arg(long)]
    pub mem_cost: Option<String>,

    /// STANDARD_SCRYPT parallelization
    #[arg(long)]
    pub parallelization: Option<String>,

    /// STANDARD_SCRYPT block size
    #[arg(long)]
    pub block_size: Option<String>,

    /// STANDARD_SCRYPT derived key length
    #[arg(long)]
    pub dk_len: Option<String>,

    /// Order of salt and password in the hash input (SALT_FIRST, PASSWORD_FIRST)
    #[arg(long)]
    pub hash_input_order: Option<String>,

    /// Accounts per upload request (max 1000)
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    pub batch_size: usize,
}

impl ImportArgs {
    #[must_use]
    pub fn raw_hash_options(&self) -> RawHashOptions {
        RawHashOptions {
            hash_algo: self.hash_algo.clone(),
            hash_key: self.hash_key.clone(),
            salt_separator: self.salt_separator.clone(),
            rounds: self.rounds.clone(),
            mem_cost: self.mem_cost.clone(),
            parallelization: self.parallelization.clone(),
            block_size: self.block_size.clone(),
            dk_len: self.dk_len.clone(),
            hash_input_order: self.hash_input_order.clone(),
        }
    }
}
