//! # Error Types
//!
//! Domain-specific error types for shopcart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopcart-core errors (this file)                                      │
//! │  ├── CartError        - Rejected cart mutations                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopcart-engine errors (separate crate)                               │
//! │  ├── EngineError      - Service, storage and settings failures         │
//! │  └── SourceError      - Remote config fetch failures (absorbed by the  │
//! │                         loader, never surfaced to cart callers)        │
//! │                                                                         │
//! │  Flow: ValidationError → CartError → EngineError → UI                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing shipping policy is NOT an error here: it is the
//! [`ShippingState::Unavailable`](crate::shipping::ShippingState) value.

use thiserror::Error;

use crate::types::ItemKey;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors returned by cart mutations.
///
/// Every variant guarantees the cart was left exactly as it was before the
/// call; callers may correct the input and retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Malformed arguments (negative price, negative quantity, limits exceeded).
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The referenced identity key is not in the cart.
    ///
    /// ## When This Occurs
    /// - `update_quantity` on a row that was already removed
    /// - A stale UI holding a key from a cleared cart
    #[error("Item not in cart: {0}")]
    ItemNotFound(ItemKey),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
