//! Ordered language sources
//!
//! The requested language can come from the command line or from one of
//! several environment variables. They are consulted once, in a fixed
//! order, and the first non-empty value wins.

use std::collections::HashMap;
use std::fmt;

use crate::FALLBACK_LANGUAGE;

/// Command line form that pins the language
pub const LANG_FLAG_PREFIX: &str = "--lang=";

/// Where a language request came from, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    /// `--lang=<code>` among the launcher arguments
    CliFlag,
    /// `npm_config_lang`, set by `npm start --lang=xx`
    PackageManager,
    /// `START_LANG`, specific to the launcher
    Launcher,
    /// `APP_LANG`, shared with the application itself
    Application,
    /// `LANG`, the general locale
    SystemLocale,
    /// Nothing was set
    Default,
}

impl LanguageSource {
    /// Sources in the order they are consulted
    pub const PRECEDENCE: [LanguageSource; 5] = [
        LanguageSource::CliFlag,
        LanguageSource::PackageManager,
        LanguageSource::Launcher,
        LanguageSource::Application,
        LanguageSource::SystemLocale,
    ];

    /// Environment variable backing this source, if any
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            LanguageSource::PackageManager => Some("npm_config_lang"),
            LanguageSource::Launcher => Some("START_LANG"),
            LanguageSource::Application => Some("APP_LANG"),
            LanguageSource::SystemLocale => Some("LANG"),
            LanguageSource::CliFlag | LanguageSource::Default => None,
        }
    }
}

impl fmt::Display for LanguageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageSource::CliFlag => f.write_str("--lang flag"),
            LanguageSource::Default => f.write_str("default"),
            other => match other.env_var() {
                Some(var) => write!(f, "${}", var),
                None => f.write_str("unknown"),
            },
        }
    }
}

/// Value of the first `--lang=` argument, if it carries one
pub fn lang_flag<S: AsRef<str>>(args: &[S]) -> Option<&str> {
    args.iter()
        .find_map(|a| a.as_ref().strip_prefix(LANG_FLAG_PREFIX))
        .filter(|v| !v.trim().is_empty())
}

/// The language the user asked for, before matching it against dictionaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePreference {
    raw: String,
    source: LanguageSource,
}

impl LanguagePreference {
    /// Walk the sources in precedence order against an argument list and an
    /// environment snapshot
    pub fn resolve<S: AsRef<str>>(args: &[S], env: &HashMap<String, String>) -> Self {
        for source in LanguageSource::PRECEDENCE {
            let value = match source.env_var() {
                Some(var) => env.get(var).map(String::as_str),
                None => lang_flag(args),
            };

            if let Some(value) = value
                && !value.trim().is_empty()
            {
                return Self {
                    raw: value.trim().to_string(),
                    source,
                };
            }
        }

        Self {
            raw: FALLBACK_LANGUAGE.to_string(),
            source: LanguageSource::Default,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn source(&self) -> LanguageSource {
        self.source
    }

    /// Lowercased request with any `.charset` suffix removed (`pt_BR.UTF-8` -> `pt_br`)
    pub fn normalized(&self) -> String {
        normalize(&self.raw)
    }
}

pub(crate) fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}
