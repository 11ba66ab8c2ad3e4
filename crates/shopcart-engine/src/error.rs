//! # Engine Error Types
//!
//! Error types for the stateful cart engine.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Engine Error Types                               │
//! │                                                                         │
//! │  EngineError (returned by CartHandle / settings bootstrap)             │
//! │  ├── Cart        - rejected mutation (InvalidInput, ItemNotFound)      │
//! │  ├── Settings    - configuration file or env problem                   │
//! │  └── ServiceStopped - the cart service task is gone                    │
//! │                                                                         │
//! │  SourceError (never reaches the cart: the loader turns it into         │
//! │               ShippingState::Unavailable)                               │
//! │  ├── Transport / Status / Timeout  - network side                      │
//! │  ├── Malformed / Empty             - document side                     │
//! │  └── Io / NotConfigured            - local side                        │
//! │                                                                         │
//! │  StorageError (logged by CartStore, never returned from a mutation)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use shopcart_core::CartError;

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for cart service and bootstrap operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for configuration source fetches.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for persistence backends.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for settings loading.
pub type SettingsResult<T> = Result<T, SettingsError>;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced to callers of the cart engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The cart rejected the mutation; state is unchanged.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Settings could not be loaded or are invalid.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The cart service has shut down and no longer accepts requests.
    #[error("Cart service has stopped")]
    ServiceStopped,
}

impl EngineError {
    /// Returns the cart error when the mutation itself was rejected.
    pub fn as_cart_error(&self) -> Option<&CartError> {
        match self {
            EngineError::Cart(err) => Some(err),
            _ => None,
        }
    }
}

// =============================================================================
// Source Error
// =============================================================================

/// Failure to obtain the remote site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Connection could not be established or was dropped.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The request did not complete in time.
    #[error("Request timed out after {millis} ms")]
    Timeout { millis: u64 },

    /// The document could not be decoded or holds invalid values.
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    /// The document is empty or has no `shipping` section.
    #[error("Configuration has no shipping section")]
    Empty,

    /// Local file could not be read.
    #[error("I/O error: {0}")]
    Io(String),

    /// No source was configured.
    #[error("No configuration source configured")]
    NotConfigured,
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}

impl SourceError {
    /// Returns true for failures on the network path.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            SourceError::Transport(_) | SourceError::Status(_) | SourceError::Timeout { .. }
        )
    }
}

// =============================================================================
// Storage Error
// =============================================================================

/// Persistence backend failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored document was written by an incompatible version.
    #[error("Unsupported cart file version {0}")]
    UnsupportedVersion(u32),

    /// Simulated or backend-reported write rejection.
    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

// =============================================================================
// Settings Error
// =============================================================================

/// Settings load/validation failure.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No settings path available")]
    NoPath,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcart_core::ItemKey;

    #[test]
    fn test_cart_error_is_transparent() {
        let err: EngineError = CartError::ItemNotFound(ItemKey::new("missing-key")).into();
        assert_eq!(err.to_string(), "Item not in cart: missing-key");
        assert!(matches!(err.as_cart_error(), Some(CartError::ItemNotFound(_))));
        assert!(EngineError::ServiceStopped.as_cart_error().is_none());
    }

    #[test]
    fn test_settings_error_converts() {
        let err: EngineError = SettingsError::Invalid("timeout_secs must be > 0".into()).into();
        assert!(matches!(err, EngineError::Settings(SettingsError::Invalid(_))));
        assert!(err.as_cart_error().is_none());
    }

    #[test]
    fn test_network_errors() {
        assert!(SourceError::Status(503).is_network());
        assert!(SourceError::Timeout { millis: 10 }.is_network());
        assert!(!SourceError::Empty.is_network());
        assert!(!SourceError::Malformed("bad".into()).is_network());
    }

    #[test]
    fn test_json_error_is_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(SourceError::from(err), SourceError::Malformed(_)));
    }
}
