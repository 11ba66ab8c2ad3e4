//! # shopcart-core: Pure Business Logic for the Storefront Cart
//!
//! This crate holds the cart and shipping-pricing rules as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopcart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront UI (collaborator)                 │   │
//! │  │    Product page ──► Cart drawer ──► Checkout hand-off           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartHandle / observers                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  shopcart-engine                                │   │
//! │  │    CartStore, ShippingConfigLoader, persistence, settings       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopcart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ shipping  │  │   │
//! │  │   │ CartItem  │  │   Money   │  │   Cart    │  │  Config   │  │   │
//! │  │   │ ItemKey   │  │           │  │ Snapshot  │  │  State    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO ASYNC • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Cart rows and their identity key
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`shipping`] - Shipping policy, lifecycle state, method selection
//! - [`cart`] - Cart contents and the derived [`CartSnapshot`]
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shopcart_core::{Cart, ItemKey, Money, ShippingConfig, ShippingMethod, ShippingState};
//!
//! let mut cart = Cart::new();
//! cart.add_item(ItemKey::new("P1"), Money::from_cents(1000), 2).unwrap();
//! cart.add_item(ItemKey::new("P1"), Money::from_cents(1000), 3).unwrap();
//!
//! // Before the policy is known, shipping is unknown (not free!)
//! let snap = cart.snapshot(&ShippingState::Unloaded, ShippingMethod::Standard);
//! assert_eq!(snap.subtotal.cents(), 5000);
//! assert_eq!(snap.total, None);
//!
//! let policy = ShippingConfig::new(
//!     Money::from_cents(5000),
//!     Money::from_cents(500),
//!     Money::from_cents(1200),
//! )
//! .unwrap();
//! let snap = cart.snapshot(&ShippingState::Loaded(policy), ShippingMethod::Standard);
//! assert_eq!(snap.total, Some(Money::from_cents(5000)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod shipping;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLimits, CartSnapshot};
pub use error::{CartError, CartResult, ValidationError};
pub use money::Money;
pub use shipping::{ShippingConfig, ShippingMethod, ShippingState};
pub use types::{CartItem, ItemKey};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default maximum number of distinct rows in a cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps checkout payloads reasonable.
/// Overridable through engine settings.
pub const MAX_CART_ITEMS: usize = 100;

/// Default maximum quantity of a single row.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest accepted money amount in cents ($10,000,000,000.00).
///
/// ## Business Reason
/// Applies to unit prices, shipping policy amounts and the cart subtotal.
/// Keeps every derived total (subtotal plus shipping) well inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000;
