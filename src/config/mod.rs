// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Configuration module for rudiments.
//!
//! This module resolves an application's candidate configuration files,
//! loads and merges the ones that exist, and provides lookups into the
//! merged values.

mod configuration;
pub mod format;
pub mod paths;
mod value;

pub use configuration::Configuration;
pub use paths::{app_dir, default_paths, env_var_name};
pub use value::{Section, Value};
