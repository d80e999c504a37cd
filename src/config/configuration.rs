// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! The `Configuration` object: candidate paths, lazy loading and lookups.
//!
//! A `Configuration` is not meant to be shared between threads. Loading
//! happens once per instance; callers that need concurrent access must
//! serialize it themselves.

use crate::error::{Result, UsageError};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use super::format;
use super::paths::{dedup_paths, resolve_paths};
use super::value::{Section, Value};

/// Configuration for a named application, merged from its candidate files.
#[derive(Debug, Clone)]
pub struct Configuration {
    name: String,
    config_paths: Vec<PathBuf>,
    values: Option<Section>,
}

impl Configuration {
    /// Create a configuration using the default search path for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_paths(name, Vec::<PathBuf>::new())
    }

    /// Create a configuration with explicit candidate paths.
    ///
    /// A non-empty list replaces the defaults. Each empty entry in it is
    /// replaced by the default paths.
    pub fn with_paths<I, P>(name: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let name = name.into();
        let explicit: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        let config_paths = resolve_paths(&name, &explicit);
        tracing::debug!("Config paths for {}: {:?}", name, config_paths);

        Self {
            name,
            config_paths,
            values: None,
        }
    }

    /// The application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All candidate paths, lowest precedence first.
    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Candidate paths that currently exist (or, with `exists = false`,
    /// that don't). The filesystem is checked on every call.
    pub fn locations(&self, exists: bool) -> Vec<PathBuf> {
        dedup_paths(self.config_paths.clone())
            .into_iter()
            .filter(|path| path.exists() == exists)
            .collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.values.is_some()
    }

    /// Load and merge all existing candidates, once.
    ///
    /// Later files override earlier ones key by key; sections are merged
    /// recursively. Missing files are skipped, but an existing file that
    /// cannot be read or parsed is an error and nothing is cached.
    pub fn load(&mut self) -> Result<&mut Section> {
        if self.values.is_none() {
            let mut merged = Section::new();
            for path in self.locations(true) {
                tracing::debug!("Loading configuration from: {:?}", path);
                merged.merge(format::read_file(&path)?);
            }
            if merged.is_empty() {
                tracing::debug!("No configuration values found for {}", self.name);
            }
            self.values = Some(merged);
        }
        Ok(self.values.get_or_insert_with(Section::new))
    }

    /// The merged values, if already loaded.
    pub fn values(&self) -> Option<&Section> {
        self.values.as_ref()
    }

    /// Write the merged values in the native file format.
    pub fn dump<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<()> {
        let values = self.load()?;
        format::write(values, out)
    }

    /// Look up a top-level key, failing with a user-facing error if absent.
    pub fn get(&mut self, key: &str) -> Result<&Value> {
        let name = self.name.clone();
        self.get_opt(key)?.ok_or_else(|| {
            UsageError::logged_failure(format!(
                "Missing configuration value \"{}\" for {}!",
                key, name
            ))
            .into()
        })
    }

    /// Look up a top-level key, with `None` for a missing key.
    pub fn get_opt(&mut self, key: &str) -> Result<Option<&Value>> {
        Ok(self.load()?.get(key))
    }

    /// Look up a top-level key, falling back to `default`.
    pub fn get_or(&mut self, key: &str, default: impl Into<Value>) -> Result<Value> {
        Ok(self
            .get_opt(key)?
            .cloned()
            .unwrap_or_else(|| default.into()))
    }

    /// Look up a scalar and convert it with [`FromStr`].
    pub fn get_as<T: FromStr>(&mut self, key: &str) -> Result<T> {
        let type_name = std::any::type_name::<T>();
        let text = match self.get(key)? {
            Value::Scalar(text) => text.clone(),
            Value::Section(_) => {
                return Err(UsageError::invalid_value(key, "[section]", type_name).into())
            }
        };
        text.parse()
            .map_err(|_| UsageError::invalid_value(key, &text, type_name).into())
    }

    /// The section named after the invoked command.
    pub fn section(&mut self, ctx: &crate::cli::InvocationContext) -> Result<&Section> {
        self.section_named(ctx.command_name())
    }

    /// Look up a top-level section, failing with a user-facing error if it
    /// is absent or not a section.
    pub fn section_named(&mut self, name: &str) -> Result<&Section> {
        let app = self.name.clone();
        self.load()?.section(name).ok_or_else(|| {
            UsageError::logged_failure(format!(
                "Missing configuration section [{}] for {}!",
                name, app
            ))
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::InvocationContext;
    use crate::config::paths::{app_dir, default_paths, env_var_name};
    use crate::error::Error;
    use tempfile::TempDir;

    const NO_FILES: &str = "foobarbaz_wont_exist_ever";

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_paths_are_used() {
        let cfg = Configuration::new("foobarbaz");
        assert_eq!(cfg.name(), "foobarbaz");
        assert_eq!(cfg.config_paths().len(), 2);
        assert_eq!(cfg.config_paths()[0], PathBuf::from("/etc/foobarbaz.conf"));
    }

    #[test]
    fn test_paths_taken_from_environment() {
        let name = "rudiments_env_paths_test";
        let joined = std::env::join_paths(["foo.conf", "bar.conf"]).unwrap();
        std::env::set_var(env_var_name(name), &joined);
        let cfg = Configuration::new(name);
        std::env::remove_var(env_var_name(name));

        let paths = cfg.config_paths();
        assert_eq!(
            paths[paths.len() - 2..],
            [PathBuf::from("foo.conf"), PathBuf::from("bar.conf")]
        );
    }

    #[test]
    fn test_explicit_paths_override_defaults() {
        let cfg = Configuration::with_paths("foo", ["foobarbaz.conf"]);
        assert_eq!(cfg.config_paths(), [PathBuf::from("foobarbaz.conf")]);
    }

    #[test]
    fn test_empty_path_element_inserts_defaults() {
        let cfg = Configuration::with_paths("foo", ["", "foobarbaz.conf"]);
        assert_eq!(cfg.config_paths()[0], PathBuf::from("/etc/foo.conf"));
        assert_eq!(
            cfg.config_paths().last(),
            Some(&PathBuf::from("foobarbaz.conf"))
        );
    }

    #[test]
    fn test_multiple_empty_path_elements_are_expanded() {
        let cfg = Configuration::with_paths("foo", ["", "foobarbaz.conf", ""]);
        let paths = cfg.config_paths();
        assert_eq!(paths[0], PathBuf::from("/etc/foo.conf"));
        assert_eq!(paths[paths.len() / 2], PathBuf::from("foobarbaz.conf"));
    }

    #[test]
    fn test_locations_filters_by_existence() {
        let cfg = Configuration::new(NO_FILES);
        assert!(!cfg.config_paths().is_empty());
        assert!(cfg.locations(true).is_empty());
        assert_eq!(cfg.locations(false), cfg.config_paths());
    }

    #[test]
    fn test_default_uses_app_dir() {
        let cfg = Configuration::new(NO_FILES);
        assert_eq!(
            cfg.locations(false)[1],
            app_dir(NO_FILES).join(format!("{}.conf", NO_FILES))
        );
    }

    #[test]
    fn test_locations_eliminates_dupes() {
        let cfg = Configuration::with_paths(NO_FILES, ["", ""]);
        assert_eq!(cfg.locations(false).len(), cfg.config_paths().len() / 2);
        assert_eq!(cfg.locations(false), default_paths(NO_FILES));
    }

    #[test]
    fn test_locations_rechecks_filesystem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("late.conf");
        let cfg = Configuration::with_paths(NO_FILES, [&path]);

        assert!(cfg.locations(true).is_empty());
        std::fs::write(&path, "foo = bar\n").unwrap();
        assert_eq!(cfg.locations(true), [path]);
    }

    #[test]
    fn test_load_with_no_files_works() {
        let mut cfg = Configuration::new(NO_FILES);
        assert!(!cfg.is_loaded());
        assert!(cfg.load().unwrap().is_empty());
        assert!(cfg.is_loaded());
        assert_eq!(cfg.values(), Some(&Section::new()));
    }

    #[test]
    fn test_load_merges_in_path_order() {
        let dir = TempDir::new().unwrap();
        let system = write_file(
            &dir,
            "system.conf",
            "level = system\nkeep = yes\n[server]\nhost = example.org\nport = 80\n",
        );
        let user = write_file(&dir, "user.conf", "level = user\n[server]\nport = 8080\n");
        let missing = dir.path().join("missing.conf");

        let mut cfg = Configuration::with_paths(NO_FILES, [&system, &missing, &user]);
        let values = cfg.load().unwrap();

        assert_eq!(values.get_str("level"), Some("user"));
        assert_eq!(values.get_str("keep"), Some("yes"));
        let server = values.section("server").unwrap();
        assert_eq!(server.get_str("host"), Some("example.org"));
        assert_eq!(server.get_str("port"), Some("8080"));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "app.conf", "foo = first\n");

        let mut cfg = Configuration::with_paths(NO_FILES, [&path]);
        assert_eq!(cfg.get("foo").unwrap().as_str(), Some("first"));

        std::fs::write(&path, "foo = second\n").unwrap();
        assert_eq!(cfg.load().unwrap().get_str("foo"), Some("first"));
    }

    #[test]
    fn test_load_fails_on_malformed_file() {
        let dir = TempDir::new().unwrap();
        let good = write_file(&dir, "good.conf", "foo = bar\n");
        let bad = write_file(&dir, "bad.conf", "this is not config\n");

        let mut cfg = Configuration::with_paths(NO_FILES, [&good, &bad]);
        let err = cfg.load().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!err.is_usage());
        assert!(!cfg.is_loaded());
    }

    #[test]
    fn test_load_reads_toml_candidates() {
        let dir = TempDir::new().unwrap();
        let base = write_file(&dir, "base.conf", "[db]\nurl = sqlite://a\npool = 4\n");
        let extra = write_file(&dir, "extra.toml", "[db]\nurl = \"sqlite://b\"\n");

        let mut cfg = Configuration::with_paths(NO_FILES, [&base, &extra]);
        let db = cfg.section_named("db").unwrap();
        assert_eq!(db.get_str("url"), Some("sqlite://b"));
        assert_eq!(db.get_str("pool"), Some("4"));
    }

    #[test]
    fn test_dump_writes_to_stream() {
        let mut out = Vec::new();
        let mut cfg = Configuration::new(NO_FILES);
        cfg.dump(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\n");
    }

    #[test]
    fn test_dump_with_value() {
        let mut out = Vec::new();
        let mut cfg = Configuration::new(NO_FILES);
        cfg.load().unwrap().merge([("foo", "bar")].into_iter().collect());
        cfg.dump(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "foo = bar\n");
    }

    #[test]
    fn test_dump_then_load_is_lossless() {
        let dir = TempDir::new().unwrap();
        let source = write_file(
            &dir,
            "source.conf",
            "name = demo # comment\nmotd = '  hi  '\n[section]\n    [[nested]]\n    deep = \"a # b\"\n",
        );

        let mut cfg = Configuration::with_paths(NO_FILES, [&source]);
        let dumped = dir.path().join("dumped.conf");
        let mut file = std::fs::File::create(&dumped).unwrap();
        cfg.dump(&mut file).unwrap();
        drop(file);

        let mut reloaded = Configuration::with_paths(NO_FILES, [&dumped]);
        assert_eq!(reloaded.load().unwrap(), cfg.load().unwrap());
    }

    #[test]
    fn test_section_access_works() {
        let ctx = InvocationContext::new("section");
        let section: Section = [("foo", "bar")].into_iter().collect();
        let mut cfg = Configuration::new(NO_FILES);
        cfg.load().unwrap().insert("section", section.clone());
        assert_eq!(cfg.section(&ctx).unwrap(), &section);
    }

    #[test]
    fn test_section_raises_on_unknown_name() {
        let ctx = InvocationContext::new("section");
        let mut cfg = Configuration::new(NO_FILES);
        let err = cfg.section(&ctx).unwrap_err();
        assert!(matches!(err, Error::Usage(UsageError::LoggedFailure { .. })));
    }

    #[test]
    fn test_section_raises_on_scalar() {
        let ctx = InvocationContext::new("section");
        let mut cfg = Configuration::new(NO_FILES);
        cfg.load().unwrap().insert("section", "not a mapping");
        assert!(cfg.section(&ctx).unwrap_err().is_usage());
    }

    #[test]
    fn test_get_works() {
        let mut cfg = Configuration::new(NO_FILES);
        cfg.load().unwrap().merge([("foo", "bar")].into_iter().collect());
        assert_eq!(cfg.get("foo").unwrap(), &Value::from("bar"));
    }

    #[test]
    fn test_get_returns_default() {
        let mut cfg = Configuration::new(NO_FILES);
        assert_eq!(cfg.get_opt("foo").unwrap(), None);
        assert_eq!(cfg.get_or("foo", "fallback").unwrap(), Value::from("fallback"));
    }

    #[test]
    fn test_get_raises_without_default() {
        let mut cfg = Configuration::new(NO_FILES);
        let err = cfg.get("foo").unwrap_err();
        assert!(matches!(err, Error::Usage(UsageError::LoggedFailure { .. })));
        assert!(console::strip_ansi_codes(&err.to_string()).contains("\"foo\""));
    }

    #[test]
    fn test_get_as_converts_scalars() {
        let mut cfg = Configuration::new(NO_FILES);
        cfg.load()
            .unwrap()
            .merge([("port", "8080"), ("host", "localhost")].into_iter().collect());

        assert_eq!(cfg.get_as::<u16>("port").unwrap(), 8080);
        let err = cfg.get_as::<u16>("host").unwrap_err();
        assert!(matches!(err, Error::Usage(UsageError::InvalidValue { .. })));
    }
}
