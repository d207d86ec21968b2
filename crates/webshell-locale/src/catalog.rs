//! Message dictionaries keyed by language code

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use webshell_core::{LaunchError, Result};

use crate::FALLBACK_LANGUAGE;
use crate::builtin::CATALOG_EN;
use crate::source::normalize;

/// One `<code>.json` file: a flat object of message key to template
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct DictionaryFile(HashMap<String, Value>);

/// All known dictionaries. English is always present.
#[derive(Debug, Clone)]
pub struct Catalog {
    dicts: BTreeMap<String, HashMap<String, String>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Catalog holding only the compiled-in English messages
    pub fn builtin() -> Self {
        let en = CATALOG_EN
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut dicts = BTreeMap::new();
        dicts.insert(FALLBACK_LANGUAGE.to_string(), en);
        Self { dicts }
    }

    /// Built-in messages overlaid with every `*.json` dictionary in `dir`.
    ///
    /// A missing directory or an unreadable file is not fatal: the launcher
    /// keeps whatever it could load.
    pub fn load_dir(dir: &Path) -> Self {
        let mut catalog = Self::builtin();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No locale directory at {}: {}", dir.display(), e);
                return catalog;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if !is_json || !path.is_file() {
                continue;
            }

            let Some(code) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match read_dictionary(&path) {
                Ok(dict) => {
                    debug!("Loaded {} messages for '{}'", dict.len(), code);
                    catalog.insert(code, dict);
                }
                Err(e) => warn!("Ignoring locale file {}: {}", path.display(), e),
            }
        }

        catalog
    }

    /// Merge `dict` into the dictionary for `code`, overriding existing keys
    pub fn insert(&mut self, code: &str, dict: HashMap<String, String>) {
        self.dicts
            .entry(code.to_lowercase())
            .or_default()
            .extend(dict);
    }

    /// Language codes with a dictionary, sorted
    pub fn languages(&self) -> Vec<&str> {
        self.dicts.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.dicts.contains_key(code)
    }

    pub fn lookup(&self, code: &str, key: &str) -> Option<&str> {
        self.dicts.get(code)?.get(key).map(String::as_str)
    }

    /// Pick the dictionary that best serves a requested language:
    /// exact code, then the primary subtag (`pt-br` -> `pt`), then English,
    /// then whatever comes first.
    pub fn match_language(&self, requested: &str) -> String {
        let lc = normalize(requested);
        if self.contains(&lc) {
            return lc;
        }

        let short = lc.split(['-', '_']).next().unwrap_or_default();
        if self.contains(short) {
            return short.to_string();
        }

        if self.contains(FALLBACK_LANGUAGE) {
            return FALLBACK_LANGUAGE.to_string();
        }

        self.dicts
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
    }
}

fn read_dictionary(path: &Path) -> Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)?;
    let DictionaryFile(raw) = serde_json::from_str(&content)
        .map_err(|e| LaunchError::Locale(format!("{}: {}", path.display(), e)))?;

    Ok(raw
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k, s)),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(codes: &[&str]) -> Catalog {
        let mut catalog = Catalog::builtin();
        for code in codes {
            catalog.insert(code, HashMap::new());
        }
        catalog
    }

    #[test]
    fn builtin_has_english() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.languages(), vec!["en"]);
        assert!(catalog.lookup("en", "howto_header").is_some());
    }

    #[test]
    fn exact_match_wins() {
        let catalog = catalog_with(&["pt", "pt-br"]);
        assert_eq!(catalog.match_language("pt-BR"), "pt-br");
    }

    #[test]
    fn primary_subtag_match() {
        let catalog = catalog_with(&["id"]);
        assert_eq!(catalog.match_language("id_ID.UTF-8"), "id");
    }

    #[test]
    fn falls_back_to_english() {
        let catalog = catalog_with(&["id"]);
        assert_eq!(catalog.match_language("ja_JP"), "en");
        assert_eq!(catalog.match_language("C.UTF-8"), "en");
    }

    #[test]
    fn languages_sorted() {
        let catalog = catalog_with(&["zh", "de"]);
        assert_eq!(catalog.languages(), vec!["de", "en", "zh"]);
    }

    #[test]
    fn insert_overrides_existing_keys() {
        let mut catalog = Catalog::builtin();
        let mut dict = HashMap::new();
        dict.insert("sandbox_ok".to_string(), "All good".to_string());
        catalog.insert("EN", dict);
        assert_eq!(catalog.lookup("en", "sandbox_ok"), Some("All good"));
        assert!(catalog.lookup("en", "howto_header").is_some());
    }
}
