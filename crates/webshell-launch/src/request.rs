//! What to launch: arguments and environment for the runtime

use std::ffi::OsString;

use webshell_core::Platform;
use webshell_locale::source::LANG_FLAG_PREFIX;

/// Flag telling the runtime to run without its sandbox
pub const NO_SANDBOX_FLAG: &str = "--no-sandbox";
/// Resolved language, read back by the application
pub const APP_LANG_VAR: &str = "APP_LANG";
/// Marker telling the runtime the sandbox was disabled on purpose
pub const DISABLE_SANDBOX_VAR: &str = "ELECTRON_DISABLE_SANDBOX";

/// Whether the runtime keeps its sandbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    Normal,
    /// Sandbox disabled because the helper could not be made compliant
    Degraded,
}

/// One launch, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    extra_args: Vec<String>,
    app_entry: Option<String>,
    language: String,
    platform: Platform,
}

impl LaunchRequest {
    pub fn new(extra_args: Vec<String>, language: impl Into<String>, platform: Platform) -> Self {
        Self {
            extra_args,
            app_entry: None,
            language: language.into(),
            platform,
        }
    }

    /// Application path given to the runtime ahead of the caller's arguments
    pub fn with_app_entry(mut self, entry: impl Into<String>) -> Self {
        self.app_entry = Some(entry.into());
        self
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Runtime argument list.
    ///
    /// Caller arguments are kept in order. `--lang=` is prepended unless one
    /// is already present; in degraded mode `--no-sandbox` is prepended in
    /// front of it unless already present.
    pub fn assemble_args(&self, mode: LaunchMode) -> Vec<String> {
        let mut args: Vec<String> = self
            .app_entry
            .iter()
            .chain(self.extra_args.iter())
            .cloned()
            .collect();

        let has_lang = args.iter().any(|a| a.starts_with(LANG_FLAG_PREFIX));
        if !has_lang && !self.language.is_empty() {
            args.insert(0, format!("{}{}", LANG_FLAG_PREFIX, self.language));
        }

        if mode == LaunchMode::Degraded && !args.iter().any(|a| a == NO_SANDBOX_FLAG) {
            args.insert(0, NO_SANDBOX_FLAG.to_string());
        }

        args
    }

    /// Parent environment with the launcher's variables laid over it
    pub fn assemble_env<I>(&self, parent: I, mode: LaunchMode) -> Vec<(OsString, OsString)>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut overrides: Vec<(OsString, OsString)> = Vec::new();
        if !self.language.is_empty() {
            overrides.push((APP_LANG_VAR.into(), self.language.clone().into()));
        }
        if mode == LaunchMode::Degraded {
            overrides.push((DISABLE_SANDBOX_VAR.into(), "1".into()));
        }

        let mut combined: Vec<(OsString, OsString)> = parent.into_iter().collect();
        for (key, value) in overrides {
            if let Some((_, existing)) = combined.iter_mut().find(|(k, _)| k == &key) {
                *existing = value;
            } else {
                combined.push((key, value));
            }
        }
        combined
    }
}
