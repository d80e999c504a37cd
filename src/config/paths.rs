// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Candidate path resolution.
//!
//! The search path for an application `foo` defaults to `/etc/foo.conf`
//! followed by `foo.conf` in the per-user application directory. The
//! `FOO_CONFIG` environment variable appends further candidates. An explicit
//! list replaces the defaults, with empty entries standing in for them.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the environment variable holding extra config paths for `name`.
pub fn env_var_name(name: &str) -> String {
    format!("{}_CONFIG", name.to_uppercase())
}

/// The per-user configuration directory for an application.
///
/// Falls back to a directory relative to the working directory when the
/// platform reports neither a config nor a home directory.
pub fn app_dir(name: &str) -> PathBuf {
    app_dir_from(dirs::config_dir(), dirs::home_dir(), name)
}

fn app_dir_from(
    config_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    name: &str,
) -> PathBuf {
    let base = config_dir.or_else(|| home_dir.map(|home| home.join(".config")));
    match base {
        Some(base) => base.join(name),
        None => {
            tracing::warn!(
                "No user configuration directory found for {}, falling back to ./{}",
                name,
                name
            );
            PathBuf::from(name)
        }
    }
}

/// The two default candidates for `name`, system-wide first.
pub fn default_paths(name: &str) -> Vec<PathBuf> {
    let file_name = format!("{}.conf", name);
    vec![
        Path::new("/etc").join(&file_name),
        app_dir(name).join(file_name),
    ]
}

/// Resolve the candidate list for `name`.
///
/// `explicit` entries replace the defaults; empty entries are expanded in
/// place to the default list. With no explicit entries, the defaults are
/// used and the environment override is appended.
///
/// Each expansion is a full copy of the defaults, so the result may repeat
/// paths; [`dedup_paths`] is applied when candidates are looked up.
pub fn resolve_paths(name: &str, explicit: &[PathBuf]) -> Vec<PathBuf> {
    resolve_paths_with_env(name, explicit, std::env::var_os(env_var_name(name)))
}

fn resolve_paths_with_env(
    name: &str,
    explicit: &[PathBuf],
    env: Option<OsString>,
) -> Vec<PathBuf> {
    let mut candidates = if explicit.is_empty() {
        let mut paths = default_paths(name);
        if let Some(value) = env.filter(|v| !v.is_empty()) {
            tracing::trace!("{} = {:?}", env_var_name(name), value);
            paths.extend(std::env::split_paths(&value));
        }
        paths
    } else {
        explicit.to_vec()
    };

    if candidates.iter().any(|p| p.as_os_str().is_empty()) {
        let defaults = default_paths(name);
        candidates = candidates
            .into_iter()
            .flat_map(|path| {
                if path.as_os_str().is_empty() {
                    defaults.clone()
                } else {
                    vec![path]
                }
            })
            .collect();
    }

    candidates
}

/// Drop repeated paths, keeping the first occurrence of each.
pub fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}
