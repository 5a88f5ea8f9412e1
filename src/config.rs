//! Library configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$POSTBRIDGE_CONFIG` (environment variable)
//! 2. `~/.config/postbridge/config.toml` (Linux/macOS)
//!    `%APPDATA%\postbridge\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::address::Charset;
use crate::error::{BridgeError, Result};
use crate::i18n::{self, Catalog, Lang};
use crate::payload;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Localization settings.
    pub i18n: I18nConfig,
    /// Webhook request handling.
    pub webhook: WebhookConfig,
    /// Provider payload defaults.
    pub provider: ProviderConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Charset label used when rendering non-ASCII display names.
    pub default_charset: String,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Localization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Language code ("en", "es"). Defaults to system locale detection.
    pub language: Option<String>,
    /// Path to a TOML translation catalog.
    pub catalog_path: Option<PathBuf>,
}

/// Webhook request handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Honor `X-Forwarded-Host` from the reverse proxy.
    pub trust_forwarded_host: bool,
    /// Honor `X-Forwarded-Proto` from the reverse proxy.
    pub trust_forwarded_proto: bool,
}

/// Provider payload defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Free-form table deep-merged into every outgoing payload.
    pub defaults: toml::Table,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_charset: "utf-8".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Resolve the configured charset hint for address rendering.
    pub fn default_charset(&self) -> Result<Charset> {
        Charset::from_label(&self.general.default_charset)
    }

    /// The configured language, falling back to system locale detection.
    pub fn language(&self) -> Lang {
        self.i18n
            .language
            .as_deref()
            .and_then(Lang::from_code)
            .unwrap_or_else(i18n::detect_system_lang)
    }

    /// Load the configured translation catalog (empty if none configured).
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.i18n.catalog_path {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::new()),
        }
    }

    /// The `[provider] defaults` table as a payload map, ready for
    /// [`payload::update_deep`] into an outgoing payload.
    pub fn provider_defaults(&self) -> payload::Map {
        self.provider
            .defaults
            .clone()
            .into_iter()
            .map(|(key, value)| (key, payload::Value::from(value)))
            .collect()
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration from an explicit path.
///
/// Unlike [`load_config`], a missing or malformed file is an error here.
pub fn load_config_from(path: impl AsRef<std::path::Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| BridgeError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| BridgeError::ConfigParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("POSTBRIDGE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("postbridge").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.default_charset, "utf-8");
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.i18n.language, None);
        assert!(!cfg.webhook.trust_forwarded_host);
        assert!(!cfg.webhook.trust_forwarded_proto);
        assert!(cfg.provider.defaults.is_empty());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.general.default_charset, cfg.general.default_charset);
        assert_eq!(
            parsed.webhook.trust_forwarded_host,
            cfg.webhook.trust_forwarded_host
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[i18n]
language = "es"

[webhook]
trust_forwarded_proto = true
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.i18n.language.as_deref(), Some("es"));
        assert!(cfg.webhook.trust_forwarded_proto);
        // Other fields use defaults
        assert!(!cfg.webhook.trust_forwarded_host);
        assert_eq!(cfg.general.default_charset, "utf-8");
        assert_eq!(cfg.language(), Lang::Es);
    }

    #[test]
    fn test_provider_defaults_as_payload_map() {
        let cfg: Config = toml::from_str(
            r#"
[provider.defaults]
track_opens = true

[provider.defaults.metadata]
source = "postbridge"
"#,
        )
        .expect("parse");
        let defaults = cfg.provider_defaults();
        assert_eq!(defaults["track_opens"], payload::Value::Bool(true));
        assert_eq!(
            defaults["metadata"],
            payload::Value::Object(payload::Map::from([(
                "source".to_string(),
                payload::Value::from("postbridge"),
            )]))
        );
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").expect("write");

        let cfg = load_config_from(&path).expect("load");
        assert_eq!(cfg.general.log_level, "debug");

        assert!(matches!(
            load_config_from(dir.path().join("missing.toml")),
            Err(BridgeError::Io { .. })
        ));

        std::fs::write(&path, "not [valid toml").expect("write");
        assert!(matches!(
            load_config_from(&path),
            Err(BridgeError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_config_file_path_env_override() {
        // Cannot reliably test this without modifying env, so just verify the function works
        let path = config_file_path();
        // Should return Some on most systems (has config dir)
        // On CI it might be None, so we just check it doesn't panic
        let _ = path;
    }
}
