//! `translate(key, vars)` over a [`Catalog`]

use log::debug;

use crate::FALLBACK_LANGUAGE;
use crate::catalog::Catalog;
use crate::source::LanguagePreference;

/// Translates message keys into the resolved language
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Catalog,
    current: String,
}

impl Default for Translator {
    fn default() -> Self {
        Self::with_language(Catalog::builtin(), FALLBACK_LANGUAGE)
    }
}

impl Translator {
    /// Match the preference against the catalog and fix the current language
    pub fn new(catalog: Catalog, preference: &LanguagePreference) -> Self {
        let current = catalog.match_language(preference.raw());
        debug!(
            "Language '{}' from {} resolved to '{}'",
            preference.raw(),
            preference.source(),
            current
        );
        Self { catalog, current }
    }

    pub fn with_language(catalog: Catalog, code: &str) -> Self {
        let current = catalog.match_language(code);
        Self { catalog, current }
    }

    pub fn current_language(&self) -> &str {
        &self.current
    }

    pub fn available_languages(&self) -> Vec<&str> {
        self.catalog.languages()
    }

    /// Message for `key` with `{name}` placeholders filled from `vars`.
    ///
    /// Lookup order is current language, English, then the key itself.
    pub fn translate(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let template = self
            .catalog
            .lookup(&self.current, key)
            .or_else(|| self.catalog.lookup(FALLBACK_LANGUAGE, key))
            .unwrap_or(key);

        if vars.is_empty() {
            return template.to_string();
        }
        substitute(template, vars)
    }

    /// Shorthand for [`Translator::translate`] without placeholders
    pub fn t(&self, key: &str) -> String {
        self.translate(key, &[])
    }
}

/// Single pass over the template, so substituted values are never rescanned
fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v, close))
        });

        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
