/*!
 * Language catalog for the client UI.
 *
 * The catalog lists the languages the UI supports, each with the id of
 * the message naming it and a flag image, and holds one message table per
 * language. It is either built in or loaded from a JSON file:
 *
 * ```json
 * {
 *   "supported": { "en": { "message_id": "app.lang.english", "flag": "flags/en.svg" } },
 *   "messages": { "en": { "app.lang.english": "English" } }
 * }
 * ```
 */

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::CatalogError;
use crate::language_utils::canonical_code;

/// Message table of one language: message id -> text
pub type MessageTable = BTreeMap<String, String>;

/// How a supported language is presented
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    /// Message id of the language's display name
    pub message_id: String,
    /// Flag image location
    pub flag: String,
}

/// Serialized form of a catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub supported: BTreeMap<String, LanguageInfo>,
    #[serde(default)]
    pub messages: BTreeMap<String, MessageTable>,
}

/// Supported languages and their message tables, keyed by ISO 639-1 code
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    supported: BTreeMap<String, LanguageInfo>,
    messages: BTreeMap<String, MessageTable>,
}

impl LanguageCatalog {
    /// Build a catalog, normalizing every language code
    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut supported = BTreeMap::new();
        for (code, info) in file.supported {
            supported.insert(normalize(&code)?, info);
        }

        let mut messages = BTreeMap::new();
        for (code, table) in file.messages {
            messages.insert(normalize(&code)?, table);
        }

        for code in supported.keys() {
            if !messages.contains_key(code) {
                warn!("Supported language '{}' has no messages", code);
            }
        }

        Ok(Self { supported, messages })
    }

    /// Load a catalog from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;
        let file: CatalogFile = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Load(format!("{}: {}", path.display(), e)))?;

        let catalog = Self::from_file(file)?;
        info!(
            "Loaded language catalog from {} ({} languages)",
            path.display(),
            catalog.supported.len()
        );
        Ok(catalog)
    }

    /// The catalog shipped with the server: English, German and Turkish
    pub fn builtin() -> Self {
        let names = [
            ("app.lang.english", "English", "English", "İngilizce"),
            ("app.lang.german", "German", "Deutsch", "Almanca"),
            ("app.lang.turkish", "Turkish", "Türkisch", "Türkçe"),
        ];

        let mut messages: BTreeMap<String, MessageTable> = BTreeMap::new();
        for (id, en, de, tr) in names {
            for (code, text) in [("en", en), ("de", de), ("tr", tr)] {
                messages
                    .entry(code.to_string())
                    .or_default()
                    .insert(id.to_string(), text.to_string());
            }
        }

        let supported = [
            ("en", "app.lang.english"),
            ("de", "app.lang.german"),
            ("tr", "app.lang.turkish"),
        ]
        .into_iter()
        .map(|(code, id)| {
            (
                code.to_string(),
                LanguageInfo {
                    message_id: id.to_string(),
                    flag: format!("flags/{}.svg", code),
                },
            )
        })
        .collect();

        Self { supported, messages }
    }

    /// All supported languages
    pub fn supported_languages(&self) -> &BTreeMap<String, LanguageInfo> {
        &self.supported
    }

    /// Message table for a language given in any ISO 639 form
    pub fn messages(&self, lang: &str) -> Result<&MessageTable, CatalogError> {
        let code = canonical_code(lang)
            .map_err(|_| CatalogError::UnsupportedLanguage(lang.to_string()))?;
        debug!("Looking up messages for '{}' as '{}'", lang, code);
        self.messages
            .get(&code)
            .ok_or_else(|| CatalogError::UnsupportedLanguage(lang.to_string()))
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(code: &str) -> Result<String, CatalogError> {
    canonical_code(code).map_err(|e| CatalogError::Load(e.to_string()))
}
