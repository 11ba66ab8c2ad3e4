//! # Shipping Config Loader
//!
//! Fetches the shipping policy once per activation and delivers the outcome to
//! the cart.
//!
//! ## Load Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     ShippingConfigLoader::activate                      │
//! │                                                                         │
//! │  tokio::spawn ──► source.fetch() (one request, bounded by timeout)     │
//! │                        │                                                │
//! │        ┌───────────────┼──────────────────────┐                         │
//! │        ▼ ok + valid    ▼ no shipping section  ▼ error / timeout /      │
//! │   Some(config)       None                    invalid amounts → None    │
//! │        │               │                      │                         │
//! │        └───────────────┴──────────┬───────────┘                         │
//! │                                   ▼                                     │
//! │              CartCommand::SetShippingConfig(..) ──► cart service        │
//! │                                                                         │
//! │  No retries. A fresh activation is the only way to load again.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use shopcart_core::ShippingConfig;

use crate::error::{SourceError, SourceResult};
use crate::service::CartHandle;
use crate::source::ShippingConfigSource;

/// Default per-request timeout.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Load Outcome
// =============================================================================

/// What an activation ended up telling the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The cart now prices shipping with this policy.
    Loaded(ShippingConfig),
    /// The cart now reports shipping as unavailable.
    Unavailable,
    /// The cart service was gone before the result could be delivered.
    Undelivered,
}

// =============================================================================
// Loader
// =============================================================================

/// Stateless loader: holds only the source and the timeout.
#[derive(Clone)]
pub struct ShippingConfigLoader {
    source: Arc<dyn ShippingConfigSource>,
    timeout: Duration,
}

impl ShippingConfigLoader {
    pub fn new(source: Arc<dyn ShippingConfigSource>) -> Self {
        Self::with_timeout(source, DEFAULT_LOAD_TIMEOUT)
    }

    pub fn with_timeout(source: Arc<dyn ShippingConfigSource>, timeout: Duration) -> Self {
        ShippingConfigLoader { source, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs one request and converts the answer.
    ///
    /// Every failure is logged and collapses to `None`.
    pub async fn fetch(&self) -> Option<ShippingConfig> {
        match self.try_fetch().await {
            Ok(config) => {
                info!(
                    source = %self.source.describe(),
                    threshold = %config.free_shipping_threshold(),
                    standard = %config.standard_shipping_cost(),
                    express = %config.express_shipping_cost(),
                    "Shipping policy loaded"
                );
                Some(config)
            }
            Err(e) => {
                warn!(
                    source = %self.source.describe(),
                    network = e.is_network(),
                    error = %e,
                    "Shipping policy unavailable"
                );
                None
            }
        }
    }

    /// Performs one request, keeping the failure reason.
    pub async fn try_fetch(&self) -> SourceResult<ShippingConfig> {
        let document = tokio::time::timeout(self.timeout, self.source.fetch())
            .await
            .map_err(|_| SourceError::Timeout {
                millis: self.timeout.as_millis() as u64,
            })??;

        document.shipping_config()
    }

    /// Starts a load in the background.
    ///
    /// The task sends exactly one `SetShippingConfig` to `cart` and resolves
    /// to what it sent.
    pub fn activate(&self, cart: CartHandle) -> JoinHandle<LoadOutcome> {
        let loader = self.clone();

        tokio::spawn(async move {
            let config = loader.fetch().await;
            let outcome = match config {
                Some(config) => LoadOutcome::Loaded(config),
                None => LoadOutcome::Unavailable,
            };

            match cart.set_shipping_config(config).await {
                Ok(_) => outcome,
                Err(e) => {
                    warn!(error = %e, "Could not deliver shipping policy to cart");
                    LoadOutcome::Undelivered
                }
            }
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RemoteSiteConfig, StaticConfigSource};

    fn loader(source: StaticConfigSource) -> ShippingConfigLoader {
        ShippingConfigLoader::with_timeout(Arc::new(source), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let config = loader(StaticConfigSource::new(RemoteSiteConfig::with_shipping(
            50.0, 5.0, 12.0,
        )))
        .fetch()
        .await
        .unwrap();

        assert_eq!(config.free_shipping_threshold().cents(), 5000);
        assert_eq!(config.express_shipping_cost().cents(), 1200);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_none() {
        let source = StaticConfigSource::failing(SourceError::Transport("refused".into()));
        assert!(loader(source).fetch().await.is_none());

        let source = StaticConfigSource::new(RemoteSiteConfig::default());
        assert!(loader(source).fetch().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let source = StaticConfigSource::new(RemoteSiteConfig::with_shipping(50.0, 5.0, 12.0))
            .with_delay(Duration::from_secs(60));

        let err = loader(source).try_fetch().await.unwrap_err();
        assert_eq!(err, SourceError::Timeout { millis: 200 });
    }
}
