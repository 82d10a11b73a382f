//! CLI command implementations.

pub mod check;
pub mod config;
pub mod inspect;
pub mod key;

use clap::{Args, Subcommand};

/// Arguments for the key command.
#[derive(Args)]
pub struct KeyArgs {
    /// Resource type (the HTTP method for adapter requests).
    pub resource_type: String,

    /// Request URL.
    pub url: String,

    /// Query parameters as JSON.
    #[arg(short, long)]
    pub params: Option<String>,

    /// Extra cache key properties as JSON.
    #[arg(short, long)]
    pub extra: Option<String>,
}

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Shoebox JSON file, or an HTML page with embedded shoebox scripts.
    pub file: String,

    /// Namespace to inspect (default: configured namespace).
    #[arg(short, long)]
    pub namespace: Option<String>,
}

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// URLs to test against the exclusion list.
    #[arg(required = true)]
    pub urls: Vec<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Create a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration and compile exclusion patterns.
    Validate,
}
