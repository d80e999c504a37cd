// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! CLI module for rudiments.
//!
//! This module handles command-line argument parsing, the per-invocation
//! context and command dispatch.

pub mod args;
mod context;
mod dispatch;

pub use args::{Cli, Commands, OutputFormat};
pub use context::{InvocationContext, SharedState};
pub use dispatch::{run, run_with_output};
