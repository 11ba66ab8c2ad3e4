//! # Engine Settings
//!
//! Configuration for the cart engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPCART_SOURCE_URL=https://cms.example.com/site.json              │
//! │     SHOPCART_MAX_ITEMS=50                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopcart/settings.toml (Linux)                           │
//! │     ~/Library/Application Support/com.shopcart.shopcart/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no source, 100 rows, 999 per row, standard shipping                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # settings.toml
//! [source]
//! url = "https://cms.example.com/site-settings.json"  # or: file = "./site.json"
//! timeout_secs = 10
//!
//! [cart]
//! max_items = 100
//! max_item_quantity = 999
//! default_shipping_method = "standard"
//!
//! [storage]
//! enabled = true
//! path = "/var/lib/shopcart/cart.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use shopcart_core::{CartLimits, ShippingMethod, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

use crate::error::{SettingsError, SettingsResult, SourceError};
use crate::source::{FileConfigSource, HttpConfigSource, ShippingConfigSource, StaticConfigSource};
use crate::storage::{CartStorage, JsonFileStorage, NoopStorage};

// =============================================================================
// Source Settings
// =============================================================================

/// Where the site configuration document lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// HTTP(S) URL of the document.
    #[serde(default)]
    pub url: Option<String>,

    /// Local path of the document (alternative to `url`).
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            url: None,
            file: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// =============================================================================
// Cart Settings
// =============================================================================

/// Cart limits and defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSettings {
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    #[serde(default = "default_max_item_quantity")]
    pub max_item_quantity: i64,

    #[serde(default)]
    pub default_shipping_method: ShippingMethod,
}

fn default_max_items() -> usize {
    MAX_CART_ITEMS
}

fn default_max_item_quantity() -> i64 {
    MAX_ITEM_QUANTITY
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            max_items: default_max_items(),
            max_item_quantity: default_max_item_quantity(),
            default_shipping_method: ShippingMethod::default(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Cart persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cart file; defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            enabled: true,
            path: None,
        }
    }
}

// =============================================================================
// Engine Settings
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl EngineSettings {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (settings.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SettingsResult<Self> {
        let mut settings = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine settings from file");
                let contents = std::fs::read_to_string(&path)?;
                settings = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Settings file not found, using defaults");
            }
        }

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings or returns defaults if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine settings: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves settings to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SettingsResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(SettingsError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Engine settings saved");
        Ok(())
    }

    /// Validates the settings.
    pub fn validate(&self) -> SettingsResult<()> {
        if let Some(ref url) = self.source.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SettingsError::InvalidUrl(format!(
                    "Source URL must start with http:// or https://, got: {}",
                    url
                )));
            }
        }

        if self.source.url.is_some() && self.source.file.is_some() {
            return Err(SettingsError::Invalid(
                "source.url and source.file are mutually exclusive".into(),
            ));
        }

        if self.source.timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "source.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.cart.max_items == 0 {
            return Err(SettingsError::Invalid(
                "cart.max_items must be greater than 0".into(),
            ));
        }

        if self.cart.max_item_quantity < 1 {
            return Err(SettingsError::Invalid(
                "cart.max_item_quantity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("SHOPCART_SOURCE_URL") {
            debug!(url = %url, "Overriding source URL from environment");
            self.source.url = Some(url);
            self.source.file = None;
        }

        if let Some(file) = lookup("SHOPCART_SOURCE_FILE") {
            debug!(file = %file, "Overriding source file from environment");
            self.source.file = Some(PathBuf::from(file));
            self.source.url = None;
        }

        if let Some(secs) = lookup("SHOPCART_SOURCE_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => self.source.timeout_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring invalid SHOPCART_SOURCE_TIMEOUT_SECS"),
            }
        }

        if let Some(max) = lookup("SHOPCART_MAX_ITEMS") {
            match max.parse::<usize>() {
                Ok(max) => self.cart.max_items = max,
                Err(_) => warn!(value = %max, "Ignoring invalid SHOPCART_MAX_ITEMS"),
            }
        }

        if let Some(max) = lookup("SHOPCART_MAX_ITEM_QUANTITY") {
            match max.parse::<i64>() {
                Ok(max) => self.cart.max_item_quantity = max,
                Err(_) => warn!(value = %max, "Ignoring invalid SHOPCART_MAX_ITEM_QUANTITY"),
            }
        }

        if let Some(method) = lookup("SHOPCART_SHIPPING_METHOD") {
            match method.parse::<ShippingMethod>() {
                Ok(method) => self.cart.default_shipping_method = method,
                Err(_) => warn!(method = %method, "Unknown shipping method in environment"),
            }
        }

        if let Some(enabled) = lookup("SHOPCART_STORAGE_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.storage.enabled = true,
                "0" | "false" | "no" | "off" => self.storage.enabled = false,
                _ => warn!(value = %enabled, "Ignoring invalid SHOPCART_STORAGE_ENABLED"),
            }
        }

        if let Some(path) = lookup("SHOPCART_STORAGE_PATH") {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopcart", "shopcart")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Returns the default cart file path.
    fn default_storage_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopcart", "shopcart")
            .map(|dirs| dirs.data_dir().join("cart.json"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn cart_limits(&self) -> CartLimits {
        CartLimits {
            max_items: self.cart.max_items,
            max_item_quantity: self.cart.max_item_quantity,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    /// Cart file path when persistence is enabled.
    pub fn storage_path(&self) -> Option<PathBuf> {
        if !self.storage.enabled {
            return None;
        }
        self.storage.path.clone().or_else(Self::default_storage_path)
    }

    /// Builds the persistence backend.
    pub fn storage_backend(&self) -> Arc<dyn CartStorage> {
        match self.storage_path() {
            Some(path) => Arc::new(JsonFileStorage::new(path)),
            None => Arc::new(NoopStorage),
        }
    }

    /// Builds the configuration source.
    ///
    /// With nothing configured, the source always fails, so the cart reports
    /// shipping as unavailable.
    pub fn config_source(&self) -> Arc<dyn ShippingConfigSource> {
        if let Some(ref url) = self.source.url {
            match HttpConfigSource::new(url.clone(), self.request_timeout()) {
                Ok(source) => return Arc::new(source),
                Err(e) => {
                    warn!(error = %e, "Could not build HTTP client");
                    return Arc::new(StaticConfigSource::failing(e));
                }
            }
        }

        if let Some(ref path) = self.source.file {
            return Arc::new(FileConfigSource::new(path.clone()));
        }

        Arc::new(StaticConfigSource::failing(SourceError::NotConfigured))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.cart_limits(), CartLimits::default());
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.cart.default_shipping_method, ShippingMethod::Standard);
        assert!(settings.storage.enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = EngineSettings::default();
        settings.source.url = Some("ftp://cms.example.com".into());
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidUrl(_))));

        settings.source.url = Some("https://cms.example.com/site.json".into());
        assert!(settings.validate().is_ok());

        settings.source.file = Some("site.json".into());
        assert!(settings.validate().is_err());

        let mut settings = EngineSettings::default();
        settings.source.timeout_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = EngineSettings::default();
        settings.cart.max_items = 0;
        assert!(settings.validate().is_err());

        let mut settings = EngineSettings::default();
        settings.cart.max_item_quantity = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_toml_parsing_with_partial_sections() {
        let settings: EngineSettings = toml::from_str(
            r#"
            [source]
            file = "./site.json"

            [cart]
            max_items = 20
            default_shipping_method = "express"
            "#,
        )
        .unwrap();

        assert_eq!(settings.source.file, Some(PathBuf::from("./site.json")));
        assert_eq!(settings.source.timeout_secs, 10);
        assert_eq!(settings.cart.max_items, 20);
        assert_eq!(settings.cart.max_item_quantity, 999);
        assert_eq!(settings.cart.default_shipping_method, ShippingMethod::Express);
        assert!(settings.storage.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("SHOPCART_SOURCE_URL", "https://cms.example.com/site.json"),
            ("SHOPCART_MAX_ITEMS", "5"),
            ("SHOPCART_MAX_ITEM_QUANTITY", "not-a-number"),
            ("SHOPCART_SHIPPING_METHOD", "express"),
            ("SHOPCART_STORAGE_ENABLED", "false"),
        ]);

        let mut settings = EngineSettings::default();
        settings.source.file = Some("./site.json".into());
        settings.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(settings.source.url.as_deref(), Some("https://cms.example.com/site.json"));
        assert_eq!(settings.source.file, None);
        assert_eq!(settings.cart.max_items, 5);
        assert_eq!(settings.cart.max_item_quantity, 999);
        assert_eq!(settings.cart.default_shipping_method, ShippingMethod::Express);
        assert_eq!(settings.storage_path(), None);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut settings = EngineSettings::default();
        settings.source.url = Some("https://cms.example.com/site.json".into());
        settings.storage.path = Some(dir.path().join("cart.json"));
        settings.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: EngineSettings = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[cart]\nmax_items = \"lots\"\n").unwrap();

        assert!(matches!(
            EngineSettings::load(Some(path.clone())),
            Err(SettingsError::Parse(_))
        ));
        assert_eq!(
            EngineSettings::load_or_default(Some(path)).cart_limits(),
            CartLimits::default()
        );
    }

    #[test]
    fn test_storage_path_override() {
        let mut settings = EngineSettings::default();
        settings.storage.path = Some(PathBuf::from("/tmp/shopcart-test/cart.json"));
        assert_eq!(
            settings.storage_path(),
            Some(PathBuf::from("/tmp/shopcart-test/cart.json"))
        );
    }
}
