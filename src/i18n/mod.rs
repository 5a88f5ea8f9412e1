//! Internationalization (i18n) module.
//!
//! Provides localized text for outgoing messages and provider payloads.
//! English is the default language; Spanish is available as an alternative.
//! Translations live in runtime [`Catalog`]s so that integrating
//! applications can ship their own message tables.
//!
//! Payload values reference catalog entries through the two-state [`Text`]
//! type: either an already-concrete string, or a deferred lookup that is
//! resolved against a catalog when the payload is finalized.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::error::{BridgeError, Result};

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    /// English (default)
    En,
    /// Spanish
    Es,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "es", "en_US", "es-ES").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from the `LANG` / `LC_MESSAGES` environment variables.
pub fn detect_system_lang() -> Lang {
    std::env::var("POSTBRIDGE_LANG")
        .ok()
        .and_then(|v| Lang::from_code(&v))
        .or_else(|| {
            std::env::var("LC_MESSAGES")
                .ok()
                .and_then(|v| Lang::from_code(&v))
        })
        .or_else(|| std::env::var("LANG").ok().and_then(|v| Lang::from_code(&v)))
        .unwrap_or(Lang::En)
}

/// A translation catalog: one table of message keys per language.
///
/// Catalogs are usually loaded once at startup and shared behind an [`Arc`]
/// so that deferred [`Text`] values can reference them cheaply.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Catalog {
    tables: HashMap<Lang, HashMap<String, String>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a translation for `key` in `lang`.
    pub fn insert(&mut self, lang: Lang, key: impl Into<String>, text: impl Into<String>) {
        self.tables
            .entry(lang)
            .or_default()
            .insert(key.into(), text.into());
    }

    /// Look up the translation for `key` in `lang`, without fallback.
    pub fn lookup(&self, lang: Lang, key: &str) -> Option<&str> {
        self.tables
            .get(&lang)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }

    /// Parse a catalog from TOML text.
    ///
    /// The expected layout is one table per language code:
    ///
    /// ```toml
    /// [en]
    /// subject_welcome = "Welcome!"
    ///
    /// [es]
    /// subject_welcome = "¡Bienvenido!"
    /// ```
    ///
    /// Tables with an unrecognized language code are skipped with a warning.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let table: toml::Table = input
            .parse()
            .map_err(|e: toml::de::Error| BridgeError::CatalogParse(e.to_string()))?;

        let mut catalog = Self::new();
        for (code, value) in table {
            let Some(lang) = Lang::from_code(&code) else {
                tracing::warn!(code = %code, "Skipping catalog table for unknown language");
                continue;
            };
            let toml::Value::Table(entries) = value else {
                return Err(BridgeError::CatalogParse(format!(
                    "expected a table of messages under '{code}'"
                )));
            };
            for (key, text) in entries {
                let toml::Value::String(text) = text else {
                    return Err(BridgeError::CatalogParse(format!(
                        "message '{code}.{key}' is not a string"
                    )));
                };
                catalog.insert(lang, key, text);
            }
        }
        Ok(catalog)
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| BridgeError::io(path, e))?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path.display(), "Loaded translation catalog");
        Ok(catalog)
    }

    /// Create a deferred [`Text`] referencing `key` in this catalog.
    pub fn text(self: &Arc<Self>, key: impl Into<String>) -> Text {
        Text::Deferred {
            catalog: Arc::clone(self),
            key: key.into(),
        }
    }
}

/// A string value whose textual form may be computed on demand.
///
/// `Resolved` holds a concrete string. `Deferred` holds a reference to a
/// resolver ([`Catalog`]) plus a lookup key, and produces its text only when
/// [`Text::resolve`] is called. `Concat` joins its parts on resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Text {
    /// An already-concrete string.
    Resolved(String),
    /// A catalog entry, looked up on demand.
    Deferred {
        /// The catalog to resolve against.
        catalog: Arc<Catalog>,
        /// The message key.
        key: String,
    },
    /// Deferred concatenation; parts are resolved and joined in order.
    Concat(Vec<Text>),
}

impl Text {
    /// Concatenate several parts into one deferred value.
    pub fn concat(parts: impl IntoIterator<Item = Text>) -> Self {
        Self::Concat(parts.into_iter().collect())
    }

    /// True iff this value's textual form has not been materialized yet.
    pub fn is_deferred(&self) -> bool {
        !matches!(self, Self::Resolved(_))
    }

    /// Resolve against the process-wide current language.
    pub fn resolve(&self) -> String {
        self.resolve_with(lang())
    }

    /// Resolve against an explicit language.
    ///
    /// Lookup falls back from `lang` to English, and finally to the message
    /// key itself so that a missing translation never loses information.
    pub fn resolve_with(&self, lang: Lang) -> String {
        match self {
            Self::Resolved(text) => text.clone(),
            Self::Deferred { catalog, key } => catalog
                .lookup(lang, key)
                .or_else(|| catalog.lookup(Lang::En, key))
                .unwrap_or(key)
                .to_string(),
            Self::Concat(parts) => parts.iter().map(|p| p.resolve_with(lang)).collect(),
        }
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Self::Resolved(text.to_string())
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Self::Resolved(text)
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resolve())
    }
}
