// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rudiments - inspect the configuration of a command-line tool
///
/// Shows where an application looks for its configuration files and what
/// the merged result of those files is.
#[derive(Parser, Debug)]
#[command(name = "rudiments")]
#[command(author = "Eshan Roy")]
#[command(version)]
#[command(about = "Inspect the configuration of command-line tools", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Application whose configuration is inspected
    #[arg(short, long, global = true, env = "RUDIMENTS_APP", default_value = "rudiments")]
    pub name: String,

    /// Configuration file to read; repeat for several, an empty value
    /// inserts the default locations
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Vec<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format for machine-readable output
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Output format for CI and scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text output (default)
    Text,
    /// JSON output for machine parsing
    Json,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List candidate configuration files
    Locations {
        /// List the candidates that do not exist instead
        #[arg(long)]
        missing: bool,
    },

    /// Print the merged configuration
    Dump,

    /// Print a single top-level value
    Get {
        /// Key to look up
        key: String,

        /// Value to print when the key is missing
        #[arg(long)]
        default: Option<String>,
    },

    /// Print the [show] section of the configuration
    Show,
}

impl Commands {
    /// The name the command was invoked as.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Locations { .. } => "locations",
            Commands::Dump => "dump",
            Commands::Get { .. } => "get",
            Commands::Show => "show",
        }
    }
}

impl Cli {
    /// Explicit candidate paths given on the command line.
    pub fn config_paths(&self) -> Vec<PathBuf> {
        self.config.iter().map(PathBuf::from).collect()
    }
}
