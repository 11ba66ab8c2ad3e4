//! # Shipping Policy
//!
//! The shipping policy pushed in from the remote configuration source and the
//! pricing rule derived from it.
//!
//! ## Policy Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ShippingState Lifecycle                            │
//! │                                                                         │
//! │                    ┌──────────────┐                                     │
//! │   session start ──►│   Unloaded   │  shipping cost: unknown            │
//! │                    └──────┬───────┘                                     │
//! │                           │ set_shipping_config(..)                     │
//! │              ┌────────────┴─────────────┐                               │
//! │              ▼ Some(config)             ▼ None                          │
//! │     ┌────────────────┐         ┌────────────────┐                       │
//! │     │ Loaded(config) │         │  Unavailable   │  shipping cost:       │
//! │     └────────────────┘         └────────────────┘  unknown ("shipping   │
//! │      cost: 0 or method cost                        calculated at        │
//! │                                                    checkout")           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Unloaded` and `Unavailable` both price shipping as unknown. Neither is
//! ever treated as free.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::validate_amount;

// =============================================================================
// Shipping Method
// =============================================================================

/// Delivery speed chosen by the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Standard delivery (default when no selection was made).
    #[default]
    Standard,
    /// Express delivery.
    Express,
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShippingMethod::Standard => write!(f, "standard"),
            ShippingMethod::Express => write!(f, "express"),
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ShippingMethod::Standard),
            "express" => Ok(ShippingMethod::Express),
            "" => Err(ValidationError::Required {
                field: "shipping_method".to_string(),
            }),
            _ => Err(ValidationError::OutOfRange {
                field: "shipping_method".to_string(),
                min: 0,
                max: 1,
            }),
        }
    }
}

// =============================================================================
// Shipping Config
// =============================================================================

/// Threshold/cost triple controlling whether and how much shipping is charged.
///
/// All three amounts are non-negative; construction through [`ShippingConfig::new`]
/// is the only way to build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingConfig {
    free_shipping_threshold: Money,
    standard_shipping_cost: Money,
    express_shipping_cost: Money,
}

impl ShippingConfig {
    /// Creates a shipping policy.
    ///
    /// ## Errors
    /// `MustNotBeNegative` if any amount is below zero, `OutOfRange` if any
    /// amount exceeds [`MAX_AMOUNT_CENTS`](crate::MAX_AMOUNT_CENTS).
    ///
    /// ## Example
    /// ```rust
    /// use shopcart_core::{Money, ShippingConfig, ShippingMethod};
    ///
    /// let policy = ShippingConfig::new(
    ///     Money::from_cents(5000),
    ///     Money::from_cents(500),
    ///     Money::from_cents(1200),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(policy.quote(Money::from_cents(5000), ShippingMethod::Standard).cents(), 0);
    /// assert_eq!(policy.quote(Money::from_cents(4999), ShippingMethod::Express).cents(), 1200);
    /// ```
    pub fn new(
        free_shipping_threshold: Money,
        standard_shipping_cost: Money,
        express_shipping_cost: Money,
    ) -> Result<Self, ValidationError> {
        validate_amount("free_shipping_threshold", free_shipping_threshold)?;
        validate_amount("standard_shipping_cost", standard_shipping_cost)?;
        validate_amount("express_shipping_cost", express_shipping_cost)?;

        Ok(ShippingConfig {
            free_shipping_threshold,
            standard_shipping_cost,
            express_shipping_cost,
        })
    }

    /// Subtotal at or above which shipping is free. Zero means always free.
    #[inline]
    pub fn free_shipping_threshold(&self) -> Money {
        self.free_shipping_threshold
    }

    /// Cost of standard delivery below the threshold.
    #[inline]
    pub fn standard_shipping_cost(&self) -> Money {
        self.standard_shipping_cost
    }

    /// Cost of express delivery below the threshold.
    #[inline]
    pub fn express_shipping_cost(&self) -> Money {
        self.express_shipping_cost
    }

    /// Returns the configured cost of a method, ignoring the threshold.
    pub fn cost_of(&self, method: ShippingMethod) -> Money {
        match method {
            ShippingMethod::Standard => self.standard_shipping_cost,
            ShippingMethod::Express => self.express_shipping_cost,
        }
    }

    /// Checks whether a subtotal qualifies for free shipping.
    #[inline]
    pub fn qualifies_for_free_shipping(&self, subtotal: Money) -> bool {
        subtotal >= self.free_shipping_threshold
    }

    /// Shipping charged for a subtotal with the given method.
    ///
    /// ```text
    /// subtotal >= threshold  →  $0.00
    /// otherwise              →  cost_of(method)
    /// ```
    pub fn quote(&self, subtotal: Money, method: ShippingMethod) -> Money {
        if self.qualifies_for_free_shipping(subtotal) {
            Money::zero()
        } else {
            self.cost_of(method)
        }
    }

    /// Amount still missing to reach free shipping, `None` once qualified.
    pub fn remaining_for_free_shipping(&self, subtotal: Money) -> Option<Money> {
        if self.qualifies_for_free_shipping(subtotal) {
            None
        } else {
            Some(self.free_shipping_threshold - subtotal)
        }
    }
}

// =============================================================================
// Shipping State
// =============================================================================

/// Lifecycle of the shipping policy for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(tag = "status", content = "config", rename_all = "snake_case")]
pub enum ShippingState {
    /// No load has completed yet.
    #[default]
    Unloaded,
    /// Policy known.
    Loaded(ShippingConfig),
    /// A load was attempted and failed or returned nothing.
    Unavailable,
}

impl ShippingState {
    /// Builds the state a load result transitions to.
    pub fn from_load_result(config: Option<ShippingConfig>) -> Self {
        match config {
            Some(config) => ShippingState::Loaded(config),
            None => ShippingState::Unavailable,
        }
    }

    /// Returns the policy when loaded.
    pub fn config(&self) -> Option<&ShippingConfig> {
        match self {
            ShippingState::Loaded(config) => Some(config),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ShippingState::Loaded(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ShippingState::Unavailable)
    }

    pub fn is_unloaded(&self) -> bool {
        matches!(self, ShippingState::Unloaded)
    }

    /// Shipping cost for a subtotal, or `None` when the policy is not known.
    pub fn quote(&self, subtotal: Money, method: ShippingMethod) -> Option<Money> {
        self.config().map(|config| config.quote(subtotal, method))
    }
}

impl fmt::Display for ShippingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShippingState::Unloaded => write!(f, "unloaded"),
            ShippingState::Loaded(_) => write!(f, "loaded"),
            ShippingState::Unavailable => write!(f, "unavailable"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(threshold: i64, standard: i64, express: i64) -> ShippingConfig {
        ShippingConfig::new(
            Money::from_cents(threshold),
            Money::from_cents(standard),
            Money::from_cents(express),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_negative_amounts() {
        let err = ShippingConfig::new(
            Money::from_cents(5000),
            Money::from_cents(-1),
            Money::from_cents(1200),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MustNotBeNegative {
                field: "standard_shipping_cost".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_oversized_amounts() {
        // 9e16 dollars of standard shipping
        let err = ShippingConfig::new(
            Money::from_cents(5000),
            Money::from_cents(9_000_000_000_000_000),
            Money::from_cents(1200),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: "standard_shipping_cost".to_string(),
                min: 0,
                max: crate::MAX_AMOUNT_CENTS,
            }
        );

        assert!(ShippingConfig::new(
            Money::from_cents(crate::MAX_AMOUNT_CENTS + 1),
            Money::zero(),
            Money::zero(),
        )
        .is_err());
    }

    #[test]
    fn test_free_shipping_boundary() {
        let config = policy(5000, 500, 1200);

        // Exactly at the threshold: free
        assert_eq!(config.quote(Money::from_cents(5000), ShippingMethod::Standard), Money::zero());
        assert_eq!(config.quote(Money::from_cents(5000), ShippingMethod::Express), Money::zero());

        // One cent below: charged per method
        assert_eq!(config.quote(Money::from_cents(4999), ShippingMethod::Standard).cents(), 500);
        assert_eq!(config.quote(Money::from_cents(4999), ShippingMethod::Express).cents(), 1200);
    }

    #[test]
    fn test_zero_threshold_is_always_free() {
        let config = policy(0, 500, 1200);
        assert!(config.quote(Money::zero(), ShippingMethod::Express).is_zero());
    }

    #[test]
    fn test_remaining_for_free_shipping() {
        let config = policy(5000, 500, 1200);
        assert_eq!(
            config.remaining_for_free_shipping(Money::from_cents(3550)),
            Some(Money::from_cents(1450))
        );
        assert_eq!(config.remaining_for_free_shipping(Money::from_cents(5000)), None);
    }

    #[test]
    fn test_unknown_states_never_quote_zero() {
        let subtotal = Money::from_cents(100_000);
        assert_eq!(ShippingState::Unloaded.quote(subtotal, ShippingMethod::Standard), None);
        assert_eq!(ShippingState::Unavailable.quote(subtotal, ShippingMethod::Standard), None);
    }

    #[test]
    fn test_from_load_result() {
        assert!(ShippingState::from_load_result(None).is_unavailable());
        assert!(ShippingState::from_load_result(Some(policy(0, 0, 0))).is_loaded());
        assert!(ShippingState::default().is_unloaded());
    }

    #[test]
    fn test_shipping_method_parsing() {
        assert_eq!("standard".parse::<ShippingMethod>().unwrap(), ShippingMethod::Standard);
        assert_eq!(" Express ".parse::<ShippingMethod>().unwrap(), ShippingMethod::Express);
        assert!("overnight".parse::<ShippingMethod>().is_err());
        assert!("".parse::<ShippingMethod>().is_err());
        assert_eq!(ShippingMethod::default(), ShippingMethod::Standard);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(ShippingState::Unavailable).unwrap();
        assert_eq!(json["status"], "unavailable");

        let json = serde_json::to_value(ShippingState::Loaded(policy(5000, 500, 1200))).unwrap();
        assert_eq!(json["status"], "loaded");
        assert_eq!(json["config"]["freeShippingThreshold"], 5000);
    }
}
