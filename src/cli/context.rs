// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Per-invocation context handed to command handlers.
//!
//! The context carries the invoked command's name and a shared state object
//! on which the [`Configuration`] for this invocation is cached.

use crate::config::Configuration;

/// State shared by all commands of one invocation.
#[derive(Debug, Default)]
pub struct SharedState {
    pub cfg: Option<Configuration>,
}

impl SharedState {
    /// Shared state with a preconfigured configuration.
    pub fn with_config(cfg: Configuration) -> Self {
        Self { cfg: Some(cfg) }
    }
}

/// The context of one command invocation.
#[derive(Debug)]
pub struct InvocationContext {
    command_name: String,
    pub obj: Option<SharedState>,
}

impl InvocationContext {
    pub fn new(command_name: impl Into<String>) -> Self {
        Self {
            command_name: command_name.into(),
            obj: None,
        }
    }

    /// Name of the invoked command.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }
}

impl Configuration {
    /// The configuration cached on `ctx`, created on first use.
    ///
    /// A new configuration is named after the invoked command and uses the
    /// default search path. The shared state object is created if missing.
    pub fn from_context(ctx: &mut InvocationContext) -> &mut Configuration {
        let name = &ctx.command_name;
        ctx.obj
            .get_or_insert_with(SharedState::default)
            .cfg
            .get_or_insert_with(|| {
                tracing::debug!("Creating configuration for {}", name);
                Configuration::new(name.as_str())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_context_creation_works() {
        let mut ctx = InvocationContext::new("foobarbaz");
        let cfg = Configuration::from_context(&mut ctx);
        assert_eq!(cfg.name(), "foobarbaz");
        assert!(cfg.config_paths().len() >= 2);
        assert_eq!(cfg.config_paths()[0], PathBuf::from("/etc/foobarbaz.conf"));

        let returned: *const Configuration = cfg;

        let cached = ctx.obj.as_ref().and_then(|obj| obj.cfg.as_ref()).unwrap();
        assert!(std::ptr::eq(returned, cached));
    }

    #[test]
    fn test_from_context_returns_same_instance() {
        let mut ctx = InvocationContext::new("foobarbaz");
        let first: *const Configuration = Configuration::from_context(&mut ctx);
        let second: *const Configuration = Configuration::from_context(&mut ctx);
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_from_context_with_existing_context_object() {
        let mut ctx = InvocationContext::new("foobarbaz");
        ctx.obj = Some(SharedState::default());
        Configuration::from_context(&mut ctx);
        assert!(ctx.obj.unwrap().cfg.is_some());
    }

    #[test]
    fn test_from_context_keeps_injected_configuration() {
        let mut ctx = InvocationContext::new("foobarbaz");
        ctx.obj = Some(SharedState::with_config(Configuration::with_paths(
            "other",
            ["x.conf"],
        )));

        let cfg = Configuration::from_context(&mut ctx);
        assert_eq!(cfg.name(), "other");
        assert_eq!(cfg.config_paths(), [PathBuf::from("x.conf")]);
    }
}
