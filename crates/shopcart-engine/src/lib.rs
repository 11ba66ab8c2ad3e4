//! # shopcart-engine: Stateful Cart Engine
//!
//! Owns the cart for a shopping session and wires it to the outside world:
//! the remote site configuration that carries the shipping policy, optional
//! persistence, and the UI that renders totals.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Engine Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   CartService (single writer)                    │  │
//! │  │                                                                  │  │
//! │  │  Spawned as a Tokio task, owns the CartStore                     │  │
//! │  │  CartHandle clones talk to it over mpsc + oneshot               │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │   CartStore    │  │  CartStorage   │  │ ShippingConfigLoader   │    │
//! │  │                │  │                │  │                        │    │
//! │  │ CartCommand    │  │ JSON file,     │  │ One request per        │    │
//! │  │ apply, notify  │  │ memory, no-op  │  │ activation, pushes     │    │
//! │  │ observers      │  │                │  │ SetShippingConfig      │    │
//! │  └────────────────┘  └────────────────┘  └───────────┬────────────┘    │
//! │                                                      ▼                  │
//! │                                          ┌────────────────────────┐    │
//! │                                          │ ShippingConfigSource   │    │
//! │                                          │ HTTP / file / static   │    │
//! │                                          └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`store`] - `CartStore` and `CartCommand`
//! - [`service`] - `CartService` task and `CartHandle`
//! - [`observer`] - Change notification
//! - [`loader`] - `ShippingConfigLoader`
//! - [`source`] - Site configuration sources
//! - [`storage`] - Cart persistence
//! - [`settings`] - TOML + environment configuration
//! - [`error`] - Engine error types
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use shopcart_core::{ItemKey, Money};
//! use shopcart_engine::{CartService, CartStore, ShippingConfigLoader, HttpConfigSource};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (cart, _task) = CartService::spawn(CartStore::new());
//!
//! let source = HttpConfigSource::new(
//!     "https://cms.example.com/site-settings.json",
//!     std::time::Duration::from_secs(10),
//! )?;
//! ShippingConfigLoader::new(Arc::new(source)).activate(cart.clone());
//!
//! let snapshot = cart.add_item(ItemKey::new("P1"), Money::from_cents(1000), 2).await?;
//! match snapshot.total {
//!     Some(total) => println!("Total: {total}"),
//!     None => println!("Subtotal: {} (shipping calculated at checkout)", snapshot.subtotal),
//! }
//! # Ok(())
//! # }
//! ```

use tracing_subscriber::EnvFilter;

pub mod error;
pub mod loader;
pub mod observer;
pub mod service;
pub mod settings;
pub mod source;
pub mod storage;
pub mod store;

// Re-exports
pub use error::{
    EngineError, EngineResult, SettingsError, SettingsResult, SourceError, SourceResult,
    StorageError, StorageResult,
};
pub use loader::{LoadOutcome, ShippingConfigLoader, DEFAULT_LOAD_TIMEOUT};
pub use observer::{CartObserver, SubscriptionId, WatchObserver};
pub use service::{CartHandle, CartService};
pub use settings::EngineSettings;
pub use source::{
    FileConfigSource, HttpConfigSource, RemoteShipping, RemoteSiteConfig, ShippingConfigSource,
    StaticConfigSource,
};
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, NoopStorage, PersistedCart};
pub use store::{CartCommand, CartStore};

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopcart_engine=trace` - Show trace for the engine only
/// - Default: INFO, DEBUG for shopcart crates
///
/// Calling it twice is harmless; the second call keeps the first subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,shopcart=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
