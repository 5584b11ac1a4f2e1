//! CLI argument parsing using clap derive API
//!
//! The command line takes no flags beyond `--help`/`--version` and no subcommands.
//! Every positional word is treated as part of the configuration file path.

use std::path::PathBuf;

use clap::Parser;
use versentry_core::config::DEFAULT_CONFIG_FILE;

/// Versentry -- inventory binary modules and flag known-bad versions.
///
/// Runs one sweep across every folder listed in the configuration file, then exits.
#[derive(Parser, Debug)]
#[command(name = "versentry", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default: versentry.toml in the working directory).
    ///
    /// Multiple words are joined with single spaces, so an unquoted path
    /// containing spaces still resolves.
    #[arg(value_name = "CONFIG")]
    pub config: Vec<String>,
}

impl Cli {
    /// Resolve the configuration file path.
    pub fn config_path(&self) -> PathBuf {
        if self.config.is_empty() {
            PathBuf::from(DEFAULT_CONFIG_FILE)
        } else {
            PathBuf::from(self.config.join(" "))
        }
    }
}
