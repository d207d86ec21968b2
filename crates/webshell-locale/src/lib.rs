//! webshell-locale: language resolution and message catalogs
//!
//! The launcher asks three things of this crate:
//! - which language the user wants ([`LanguagePreference`], resolved once)
//! - which languages have a dictionary ([`Catalog`])
//! - a `translate(key, vars)` function ([`Translator`])

mod builtin;
pub mod catalog;
pub mod source;
pub mod translator;

pub use catalog::Catalog;
pub use source::{LanguagePreference, LanguageSource};
pub use translator::Translator;

/// Language used when nothing else matches
pub const FALLBACK_LANGUAGE: &str = "en";
