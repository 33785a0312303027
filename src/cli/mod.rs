//! CLI module for Gatekeeper
//!
//! Command-line parsing for the gatekeeper-server binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gatekeeper - authentication, authorization and request validation
#[derive(Parser, Debug)]
#[command(
    name = "gatekeeper-server",
    version,
    about = "Gatekeeper - authentication, authorization and request validation",
    after_help = "EXAMPLES:\n    \
                  gatekeeper-server                          # Start the server (reads gatekeeper.toml)\n    \
                  gatekeeper-server --config prod.toml       # Use a custom config file\n    \
                  gatekeeper-server config --validate        # Check the configuration and exit"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(
        short,
        long,
        env = "GATEKEEPER_CONFIG",
        default_value = "gatekeeper.toml",
        global = true
    )]
    pub config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Show configuration information
    Config {
        /// Only validate the configuration, print nothing on success
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
