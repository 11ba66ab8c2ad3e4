//! # Cart Persistence
//!
//! Optional durable storage for cart rows across sessions.
//!
//! ## What Gets Persisted
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Persisted Cart Layout                              │
//! │                                                                         │
//! │  {                                                                      │
//! │    "version": 1,                                                        │
//! │    "savedAt": "2024-05-01T12:00:00Z",                                   │
//! │    "items": [                                                           │
//! │      { "productId": "P1", "variantKey": null,                           │
//! │        "unitPriceCents": 1000, "quantity": 2, "addedAt": "..." }        │
//! │    ]                                                                    │
//! │  }                                                                      │
//! │                                                                         │
//! │  ✅ line items         ❌ shipping state (always reloaded per session)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Backends are synchronous: a save runs inside the mutation that caused it,
//! on the task that owns the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

use shopcart_core::CartItem;

use crate::error::{StorageError, StorageResult};

/// Layout version written by this build.
pub const CART_FILE_VERSION: u32 = 1;

// =============================================================================
// Persisted Document
// =============================================================================

/// On-disk representation of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCart {
    pub version: u32,

    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,

    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl PersistedCart {
    /// Captures the current rows.
    pub fn from_items(items: &[CartItem]) -> Self {
        PersistedCart {
            version: CART_FILE_VERSION,
            saved_at: Utc::now(),
            items: items.to_vec(),
        }
    }

    /// Decodes a stored document, rejecting unknown versions.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let persisted: PersistedCart = serde_json::from_str(json)?;
        if persisted.version != CART_FILE_VERSION {
            return Err(StorageError::UnsupportedVersion(persisted.version));
        }
        Ok(persisted)
    }

    pub fn to_json(&self) -> StorageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// =============================================================================
// Storage Trait
// =============================================================================

/// Backend that can load and save a cart.
pub trait CartStorage: Send + Sync {
    /// Loads the last saved cart, `None` when nothing was saved yet.
    fn load(&self) -> StorageResult<Option<PersistedCart>>;

    /// Replaces the saved cart.
    fn save(&self, cart: &PersistedCart) -> StorageResult<()>;
}

// =============================================================================
// JSON File Storage
// =============================================================================

/// Stores the cart as a JSON file.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash mid-write never leaves a truncated cart behind.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStorage { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cart.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No saved cart");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        PersistedCart::from_json(&contents).map(Some)
    }

    fn save(&self, cart: &PersistedCart) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        std::fs::write(&temp, cart.to_json()?)?;
        std::fs::rename(&temp, &self.path)?;

        debug!(path = ?self.path, items = cart.items.len(), "Cart saved");
        Ok(())
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-memory backend. Keeps the serialized JSON so round trips exercise the
/// same encoding as the file backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Option<String>>,
    reject_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an existing cart already stored.
    pub fn with_cart(cart: &PersistedCart) -> StorageResult<Self> {
        let storage = Self::new();
        storage.save(cart)?;
        storage.saves.store(0, Ordering::SeqCst);
        Ok(storage)
    }

    /// Starts with a raw document, e.g. a corrupted one.
    pub fn with_raw(json: impl Into<String>) -> Self {
        MemoryStorage {
            document: Mutex::new(Some(json.into())),
            ..Self::default()
        }
    }

    /// Makes every subsequent save fail.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw stored document.
    pub fn raw(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        match self.raw() {
            Some(json) => PersistedCart::from_json(&json).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, cart: &PersistedCart) -> StorageResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected("memory storage is read-only".into()));
        }

        let json = cart.to_json()?;
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// No-op Storage
// =============================================================================

/// Backend used when persistence is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl CartStorage for NoopStorage {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        Ok(None)
    }

    fn save(&self, _cart: &PersistedCart) -> StorageResult<()> {
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shopcart_core::{ItemKey, Money};

    fn sample() -> PersistedCart {
        PersistedCart::from_items(&[
            CartItem::new(ItemKey::new("P1"), Money::from_cents(1000), 2),
            CartItem::new(ItemKey::with_variant("P2", "red"), Money::from_cents(250), 1),
        ])
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested").join("cart.json"));

        assert!(storage.load().unwrap().is_none());

        let cart = sample();
        storage.save(&cart).unwrap();

        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.items, cart.items);
        assert!(!storage.temp_path().exists());
    }

    #[test]
    fn test_persisted_layout() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["items"][0]["productId"], "P1");
        assert_eq!(json["items"][0]["unitPriceCents"], 1000);
        assert_eq!(json["items"][1]["variantKey"], "red");
        assert!(json.get("shipping").is_none());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = PersistedCart::from_json(r#"{"version": 7, "items": []}"#).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedVersion(7)));
    }

    #[test]
    fn test_corrupted_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = JsonFileStorage::new(&path);
        assert!(matches!(storage.load(), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_memory_storage_rejects_writes() {
        let storage = MemoryStorage::new();
        storage.save(&sample()).unwrap();
        assert_eq!(storage.save_count(), 1);

        storage.reject_writes(true);
        assert!(storage.save(&PersistedCart::from_items(&[])).is_err());

        // Previous document survives
        assert_eq!(storage.load().unwrap().unwrap().items.len(), 2);
    }

    #[test]
    fn test_noop_storage() {
        assert!(NoopStorage.save(&sample()).is_ok());
        assert!(NoopStorage.load().unwrap().is_none());
    }
}
