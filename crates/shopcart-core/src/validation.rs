//! # Validation Module
//!
//! Input validation for cart mutations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront UI                                                │
//! │  ├── Quantity steppers, disabled buttons                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Runs BEFORE any cart state is touched                             │
//! │  └── A failure leaves the cart exactly as it was                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart invariants (cart.rs)                                    │
//! │  └── One row per key, quantity >= 1                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopcart_core::validation::{validate_product_id, normalize_add_quantity};
//!
//! validate_product_id("P1").unwrap();
//! assert_eq!(normalize_add_quantity(0, 999).unwrap(), 1); // clamped
//! assert!(normalize_add_quantity(-2, 999).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_AMOUNT_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product or variant identifier.
const MAX_IDENTIFIER_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog product identifier.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 200 characters
///
/// The identifier is otherwise opaque: no character set is imposed.
pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    if product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if product_id.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(())
}

/// Validates an optional variant key. An empty string is rejected: callers
/// pass `None` for products without variants.
pub fn validate_variant_key(variant_key: Option<&str>) -> ValidationResult<()> {
    let Some(variant_key) = variant_key else {
        return Ok(());
    };

    if variant_key.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "variant_key".to_string(),
        });
    }

    if variant_key.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: "variant_key".to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that an amount is zero or more.
///
/// ## Example
/// ```rust
/// use shopcart_core::money::Money;
/// use shopcart_core::validation::validate_non_negative;
///
/// assert!(validate_non_negative("unit_price", Money::from_cents(1099)).is_ok());
/// assert!(validate_non_negative("unit_price", Money::zero()).is_ok()); // free item
/// assert!(validate_non_negative("unit_price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a price or policy amount: `0 <= amount <= MAX_AMOUNT_CENTS`.
///
/// ## Example
/// ```rust
/// use shopcart_core::money::Money;
/// use shopcart_core::validation::validate_amount;
///
/// assert!(validate_amount("unit_price", Money::from_cents(1099)).is_ok());
/// assert!(validate_amount("unit_price", Money::from_cents(-1)).is_err());
/// assert!(validate_amount("unit_price", Money::from_cents(i64::MAX)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    validate_non_negative(field, amount)?;

    if amount.cents() > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }

    Ok(())
}

/// Normalizes the quantity passed to `add_item`.
///
/// ## Rules
/// ```text
/// qty < 0     → Error: "quantity must not be negative"
/// qty == 0    → clamped to 1
/// qty > max   → Error: "quantity must be between 1 and max"
/// otherwise   → qty
/// ```
pub fn normalize_add_quantity(qty: i64, max: i64) -> ValidationResult<i64> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    let qty = qty.max(1);
    validate_quantity_cap(qty, max)?;
    Ok(qty)
}

/// Validates the target quantity of `update_quantity` (zero means remove).
pub fn validate_new_quantity(qty: i64, max: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    validate_quantity_cap(qty, max)
}

/// Validates that a row quantity stays within the per-row cap.
pub fn validate_quantity_cap(qty: i64, max: i64) -> ValidationResult<()> {
    if qty > max {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct row fits in the cart.
pub fn validate_cart_size(current_items: usize, max: usize) -> ValidationResult<()> {
    if current_items >= max {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: max as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
