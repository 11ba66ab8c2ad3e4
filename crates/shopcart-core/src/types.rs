//! # Domain Types
//!
//! Line-item types held by the cart.
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Row Identity                               │
//! │                                                                         │
//! │  ItemKey = (product_id, variant_key)                                   │
//! │                                                                         │
//! │  ("TEE-01", None)       → a product without variants                   │
//! │  ("TEE-01", Some("M"))  → size M                                       │
//! │  ("TEE-01", Some("L"))  → size L, a DIFFERENT row                      │
//! │                                                                         │
//! │  At most one CartItem per ItemKey. Adding an existing key bumps the    │
//! │  quantity of the row that is already there.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Item Key
// =============================================================================

/// Identity of a cart row: product plus optional variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemKey {
    /// Catalog product identifier (opaque).
    pub product_id: String,

    /// Variant discriminator (size, color...). `None` means no variants.
    pub variant_key: Option<String>,
}

impl ItemKey {
    /// Key for a product without variants.
    pub fn new(product_id: impl Into<String>) -> Self {
        ItemKey {
            product_id: product_id.into(),
            variant_key: None,
        }
    }

    /// Key for a specific variant of a product.
    pub fn with_variant(product_id: impl Into<String>, variant_key: impl Into<String>) -> Self {
        ItemKey {
            product_id: product_id.into(),
            variant_key: Some(variant_key.into()),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant_key {
            Some(variant) => write!(f, "{} ({})", self.product_id, variant),
            None => write!(f, "{}", self.product_id),
        }
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the shopping cart.
///
/// ## Price Freezing
/// `unit_price` is captured when the row is created. Later adds of the same
/// key only change `quantity`, so a catalog price change mid-session never
/// silently reprices what the shopper already holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Catalog product identifier.
    pub product_id: String,

    /// Variant discriminator, if the product has variants.
    pub variant_key: Option<String>,

    /// Price per unit in cents at time of adding (frozen).
    #[serde(rename = "unitPriceCents")]
    pub unit_price: Money,

    /// Quantity in cart (always >= 1 while the row exists).
    pub quantity: i64,

    /// When this row was created. Rows stored without it get the load time.
    #[serde(default = "Utc::now")]
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new row with the price frozen at `unit_price`.
    pub fn new(key: ItemKey, unit_price: Money, quantity: i64) -> Self {
        CartItem {
            product_id: key.product_id,
            variant_key: key.variant_key,
            unit_price,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Returns the identity key of this row.
    pub fn key(&self) -> ItemKey {
        ItemKey {
            product_id: self.product_id.clone(),
            variant_key: self.variant_key.clone(),
        }
    }

    /// Checks whether this row has the given identity key.
    pub fn matches(&self, key: &ItemKey) -> bool {
        self.product_id == key.product_id && self.variant_key == key.variant_key
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
