//! Launcher configuration, resolved once at startup
//!
//! Every environment variable the launcher cares about is read here, from a
//! single snapshot, into an immutable [`LauncherConfig`]. Later stages take
//! values from the config and never consult the environment themselves.

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use webshell_core::Result;
use webshell_locale::LanguagePreference;

use crate::paths::RuntimeLocator;

/// Application root handed to the runtime; defaults to the working directory
pub const APP_DIR_VAR: &str = "WEBSHELL_APP_DIR";
/// Directory holding `<code>.json` dictionaries; defaults to `<app_root>/locales`
pub const LOCALES_DIR_VAR: &str = "WEBSHELL_LOCALES_DIR";
/// Explicit runtime executable
pub const RUNTIME_VAR: &str = "WEBSHELL_RUNTIME";
/// `1`/`true` enables debug logging
pub const VERBOSE_VAR: &str = "WEBSHELL_VERBOSE";

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Arguments forwarded to the runtime, `--lang=` included
    pub passthrough_args: Vec<String>,
    pub language: LanguagePreference,
    pub app_root: PathBuf,
    pub locales_dir: PathBuf,
    pub runtime_override: Option<PathBuf>,
    pub search_path: Option<OsString>,
    pub verbose: bool,
}

impl LauncherConfig {
    /// Build the config from raw arguments, an environment snapshot and the
    /// working directory
    pub fn from_sources(args: Vec<String>, env: &HashMap<String, String>, cwd: PathBuf) -> Self {
        let language = LanguagePreference::resolve(&args[..], env);

        let app_root = non_empty(env, APP_DIR_VAR)
            .map(|dir| cwd.join(dir))
            .unwrap_or(cwd);

        let locales_dir = non_empty(env, LOCALES_DIR_VAR)
            .map(|dir| app_root.join(dir))
            .unwrap_or_else(|| app_root.join("locales"));

        let verbose = non_empty(env, VERBOSE_VAR)
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Self {
            passthrough_args: args,
            language,
            runtime_override: non_empty(env, RUNTIME_VAR).map(PathBuf::from),
            search_path: env.get("PATH").map(OsString::from),
            app_root,
            locales_dir,
            verbose,
        }
    }

    /// Snapshot the current process environment and working directory.
    /// Variables that are not valid UTF-8 are ignored.
    pub fn from_process(args: Vec<String>) -> Result<Self> {
        let env: HashMap<String, String> = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        let cwd = env::current_dir()?;
        Ok(Self::from_sources(args, &env, cwd))
    }

    /// Runtime search configured from this config
    pub fn locator(&self) -> RuntimeLocator {
        RuntimeLocator::new(&self.app_root)
            .with_override(self.runtime_override.clone())
            .with_search_path(self.search_path.clone())
    }
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}
