// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! rudiments - configuration helpers for command-line tools
//!
//! Finds, loads and merges the configuration files of a named application.
//!
//! # Search path
//!
//! For an application `foo` the candidates are, lowest precedence first:
//!
//! - `/etc/foo.conf`
//! - `foo.conf` in the per-user configuration directory
//! - every path listed in the `FOO_CONFIG` environment variable
//!
//! An explicit list of paths replaces these defaults; an empty entry in it
//! stands for the default locations.
//!
//! # Example
//!
//! ```no_run
//! use rudiments::Configuration;
//!
//! let mut cfg = Configuration::new("foo");
//! for path in cfg.locations(true) {
//!     println!("reading {}", path.display());
//! }
//!
//! let port: u16 = cfg.get_as("port").unwrap();
//! let server = cfg.section_named("server").unwrap();
//! println!("{} {:?}", port, server.get_str("host"));
//! ```

// Module declarations
pub mod cli;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use cli::InvocationContext;
pub use config::{Configuration, Section, Value};
pub use error::{ConfigError, Error, Result, UsageError};
