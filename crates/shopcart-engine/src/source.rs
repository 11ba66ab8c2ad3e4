//! # Site Configuration Sources
//!
//! Where the shipping policy comes from. The storefront publishes a site
//! settings document; only its `shipping` section matters to the cart.
//!
//! ## Consumed Document
//! ```json
//! {
//!   "shipping": {
//!     "freeShippingThreshold": 50,
//!     "standardShippingCost": 5,
//!     "expressShippingCost": 12
//!   },
//!   "...": "other site metadata, ignored"
//! }
//! ```
//!
//! Amounts are major currency units. Missing fields default to zero; a
//! missing `shipping` section, an empty body or a `null` document means there
//! is no policy at all.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use shopcart_core::{Money, ShippingConfig};

use crate::error::{SourceError, SourceResult};

// =============================================================================
// Remote Document
// =============================================================================

/// The site settings document as published.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSiteConfig {
    #[serde(default)]
    pub shipping: Option<RemoteShipping>,
}

/// The `shipping` section of [`RemoteSiteConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteShipping {
    #[serde(default)]
    pub free_shipping_threshold: Option<f64>,
    #[serde(default)]
    pub standard_shipping_cost: Option<f64>,
    #[serde(default)]
    pub express_shipping_cost: Option<f64>,
}

impl RemoteSiteConfig {
    /// Decodes a document body.
    ///
    /// An empty body or a literal `null` decodes to a document without a
    /// shipping section.
    pub fn from_json(body: &str) -> SourceResult<Self> {
        if body.trim().is_empty() {
            return Ok(RemoteSiteConfig::default());
        }

        let document: Option<RemoteSiteConfig> = serde_json::from_str(body)?;
        Ok(document.unwrap_or_default())
    }

    /// Document with the given shipping amounts (major units).
    pub fn with_shipping(threshold: f64, standard: f64, express: f64) -> Self {
        RemoteSiteConfig {
            shipping: Some(RemoteShipping {
                free_shipping_threshold: Some(threshold),
                standard_shipping_cost: Some(standard),
                express_shipping_cost: Some(express),
            }),
        }
    }

    /// Extracts the shipping policy.
    ///
    /// ## Errors
    /// - `Empty` when there is no shipping section
    /// - `Malformed` for negative, non-finite or out-of-range amounts
    pub fn shipping_config(&self) -> SourceResult<ShippingConfig> {
        self.shipping
            .as_ref()
            .ok_or(SourceError::Empty)?
            .to_config()
    }
}

impl RemoteShipping {
    /// Converts to a validated policy, rounding amounts to cents.
    pub fn to_config(&self) -> SourceResult<ShippingConfig> {
        let threshold = amount("freeShippingThreshold", self.free_shipping_threshold)?;
        let standard = amount("standardShippingCost", self.standard_shipping_cost)?;
        let express = amount("expressShippingCost", self.express_shipping_cost)?;

        ShippingConfig::new(threshold, standard, express)
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

fn amount(field: &str, value: Option<f64>) -> SourceResult<Money> {
    match value {
        None => Ok(Money::zero()),
        Some(value) => Money::from_major_f64(value)
            .ok_or_else(|| SourceError::Malformed(format!("{field} is not a valid amount"))),
    }
}

// =============================================================================
// Source Trait
// =============================================================================

/// Something that can produce the site settings document.
///
/// One call is one request: implementations never retry.
#[async_trait]
pub trait ShippingConfigSource: Send + Sync {
    async fn fetch(&self) -> SourceResult<RemoteSiteConfig>;

    /// Human-readable origin for log events.
    fn describe(&self) -> String;
}

// =============================================================================
// HTTP Source
// =============================================================================

/// Fetches the document with a GET request.
#[derive(Debug, Clone)]
pub struct HttpConfigSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpConfigSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(HttpConfigSource {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                millis: self.timeout.as_millis() as u64,
            }
        } else if err.is_decode() || err.is_body() {
            SourceError::Malformed(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ShippingConfigSource for HttpConfigSource {
    async fn fetch(&self) -> SourceResult<RemoteSiteConfig> {
        debug!(url = %self.url, "Requesting site configuration");

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        RemoteSiteConfig::from_json(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// =============================================================================
// File Source
// =============================================================================

/// Reads the document from a local JSON file.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileConfigSource { path: path.into() }
    }
}

#[async_trait]
impl ShippingConfigSource for FileConfigSource {
    async fn fetch(&self) -> SourceResult<RemoteSiteConfig> {
        debug!(path = ?self.path, "Reading site configuration");
        let body = tokio::fs::read_to_string(&self.path).await?;
        RemoteSiteConfig::from_json(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// =============================================================================
// Static Source
// =============================================================================

/// Returns a fixed result, optionally after a delay.
#[derive(Debug, Clone)]
pub struct StaticConfigSource {
    result: SourceResult<RemoteSiteConfig>,
    delay: Option<Duration>,
}

impl StaticConfigSource {
    /// Always returns `document`.
    pub fn new(document: RemoteSiteConfig) -> Self {
        StaticConfigSource {
            result: Ok(document),
            delay: None,
        }
    }

    /// Always fails with `error`.
    pub fn failing(error: SourceError) -> Self {
        StaticConfigSource {
            result: Err(error),
            delay: None,
        }
    }

    /// Waits `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ShippingConfigSource for StaticConfigSource {
    async fn fetch(&self) -> SourceResult<RemoteSiteConfig> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
