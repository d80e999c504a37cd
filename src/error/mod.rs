// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Error types for rudiments.
//!
//! Usage errors are meant to be shown to the end user as-is, so their
//! messages are styled when they are constructed. Everything else is an
//! ordinary failure reading or writing configuration.

use console::style;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rudiments operations.
#[derive(Error, Debug)]
pub enum Error {
    // Usage errors, displayed directly to the user
    #[error("{0}")]
    Usage(#[from] UsageError),

    // Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON output errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error belongs to the usage category.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_usage() {
            2
        } else {
            1
        }
    }
}

/// Errors caused by how the tool was invoked or configured.
#[derive(Error, Debug)]
pub enum UsageError {
    /// A required configuration value or section is missing.
    #[error("{message}")]
    LoggedFailure { message: String },

    /// A configuration value could not be converted to the requested type.
    #[error("{message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

impl UsageError {
    /// Create a missing-value failure with a styled message.
    pub fn logged_failure(message: impl AsRef<str>) -> Self {
        UsageError::LoggedFailure {
            message: styled(message.as_ref()),
        }
    }

    /// Create a conversion failure for `key`.
    pub fn invalid_value(key: &str, value: &str, expected: &str) -> Self {
        UsageError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: styled(&format!(
                "Configuration value \"{}\" = \"{}\" is not a valid {}",
                key, value, expected
            )),
        }
    }

    /// The pre-formatted message.
    pub fn message(&self) -> &str {
        match self {
            UsageError::LoggedFailure { message } | UsageError::InvalidValue { message, .. } => {
                message
            }
        }
    }
}

/// Style a message for display on a terminal, regardless of TTY detection.
fn styled(message: &str) -> String {
    style(message).red().bold().force_styling(true).to_string()
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to parse TOML in {}: {message}", .path.display())]
    Toml { path: PathBuf, message: String },

    #[error("Cannot write '{key}': {message}")]
    Unrepresentable { key: String, message: String },
}

/// Result type alias for rudiments operations.
pub type Result<T> = std::result::Result<T, Error>;
