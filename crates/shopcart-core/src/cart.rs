//! # Cart
//!
//! Pure cart contents and the derived pricing snapshot.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation               Cart Change                                    │
//! │  ─────────               ───────────                                    │
//! │                                                                         │
//! │  add_item(key, p, n) ──► row exists? qty += n (price kept)             │
//! │                          else push row(p, n)                            │
//! │                                                                         │
//! │  update_quantity(k, n) ► n == 0? remove row                            │
//! │                          else row.qty = n  (missing → ItemNotFound)     │
//! │                                                                         │
//! │  remove_item(k) ───────► retain(row.key != k)  (missing → no-op)       │
//! │                                                                         │
//! │  clear() ──────────────► items.clear()                                 │
//! │                                                                         │
//! │  snapshot(shipping, m) ► subtotal / shipping_cost / total (read only)  │
//! │                                                                         │
//! │  NOTE: every mutation validates first and only then writes, so a       │
//! │        returned error always means "nothing changed".                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CartError, CartResult, ValidationError};
use crate::money::Money;
use crate::shipping::{ShippingMethod, ShippingState};
use crate::types::{CartItem, ItemKey};
use crate::validation::{
    normalize_add_quantity, validate_amount, validate_cart_size, validate_new_quantity,
    validate_product_id, validate_quantity_cap, validate_variant_key,
};
use crate::{MAX_AMOUNT_CENTS, MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Limits
// =============================================================================

/// Size limits enforced on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLimits {
    /// Maximum number of distinct rows.
    pub max_items: usize,

    /// Maximum quantity of a single row.
    pub max_item_quantity: i64,
}

impl Default for CartLimits {
    fn default() -> Self {
        CartLimits {
            max_items: MAX_CART_ITEMS,
            max_item_quantity: MAX_ITEM_QUANTITY,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart contents.
///
/// ## Invariants
/// - Rows are unique by [`ItemKey`] (adding the same key increases quantity)
/// - Every row has `1 <= quantity <= limits.max_item_quantity`
/// - At most `limits.max_items` rows
/// - `unit_price` of a row never changes after the row is created
/// - Unit prices and the subtotal never exceed [`MAX_AMOUNT_CENTS`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
    limits: CartLimits,
}

impl Cart {
    /// Creates a new empty cart with default limits.
    pub fn new() -> Self {
        Self::with_limits(CartLimits::default())
    }

    /// Creates a new empty cart with custom limits.
    pub fn with_limits(limits: CartLimits) -> Self {
        Cart {
            items: Vec::new(),
            limits,
        }
    }

    /// Rebuilds a cart from previously stored rows.
    ///
    /// Rows that violate the cart invariants are dropped; rows sharing a key
    /// are merged into the first one (its price wins). Returns the cart and
    /// the number of stored rows that could not be kept as-is.
    pub fn from_rows(rows: Vec<CartItem>, limits: CartLimits) -> (Self, usize) {
        let mut cart = Cart::with_limits(limits);
        let mut rejected = 0;

        for row in rows {
            match cart.add_row(row) {
                Ok(RowOutcome::Inserted) => {}
                Ok(RowOutcome::Merged) | Err(_) => rejected += 1,
            }
        }

        (cart, rejected)
    }

    /// Returns the limits enforced by this cart.
    pub fn limits(&self) -> CartLimits {
        self.limits
    }

    /// Returns the rows in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Looks up a row by key.
    pub fn get(&self, key: &ItemKey) -> Option<&CartItem> {
        self.items.iter().find(|i| i.matches(key))
    }

    /// Adds an item to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - Negative price or quantity: `InvalidInput`, nothing changes
    /// - Price or resulting subtotal above `MAX_AMOUNT_CENTS`: `InvalidInput`
    /// - Quantity 0 is treated as 1
    /// - Key already in cart: quantity increases, stored price is kept
    /// - Key not in cart: a new row is added with `unit_price` frozen
    pub fn add_item(&mut self, key: ItemKey, unit_price: Money, quantity: i64) -> CartResult<()> {
        let quantity = normalize_add_quantity(quantity, self.limits.max_item_quantity)?;

        self.add_row(CartItem::new(key, unit_price, quantity))
            .map(|_| ())
    }

    /// Updates the quantity of an item in the cart.
    ///
    /// ## Behavior
    /// - Quantity 0: removes the row
    /// - Key not found: `ItemNotFound`
    ///
    /// Returns whether the cart changed (setting the current quantity is a no-op).
    pub fn update_quantity(&mut self, key: &ItemKey, quantity: i64) -> CartResult<bool> {
        validate_new_quantity(quantity, self.limits.max_item_quantity)?;

        let index = self
            .position(key)
            .ok_or_else(|| CartError::ItemNotFound(key.clone()))?;

        if quantity == 0 {
            self.items.remove(index);
            return Ok(true);
        }

        let item = &self.items[index];
        if item.quantity == quantity {
            return Ok(false);
        }
        self.validate_subtotal_with(Some(index), item.unit_price, quantity)?;

        self.items[index].quantity = quantity;
        Ok(true)
    }

    /// Removes a row by key. Removing an absent key is a no-op.
    ///
    /// Returns whether a row was removed.
    pub fn remove_item(&mut self, key: &ItemKey) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| !i.matches(key));
        self.items.len() != initial_len
    }

    /// Clears all rows. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    /// Returns the number of distinct rows.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all rows.
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0, |total, i| total.saturating_add(i.quantity))
    }

    /// Calculates the subtotal (Σ unit_price × quantity).
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Derives totals for the given shipping state and method.
    pub fn snapshot(&self, shipping: &ShippingState, method: ShippingMethod) -> CartSnapshot {
        let subtotal = self.subtotal();
        let shipping_cost = shipping.quote(subtotal, method);

        CartSnapshot {
            items: self.items.clone(),
            item_count: self.item_count(),
            total_quantity: self.total_quantity(),
            subtotal,
            shipping_method: method,
            shipping: *shipping,
            shipping_cost,
            total: shipping_cost.map(|cost| subtotal + cost),
            amount_to_free_shipping: shipping
                .config()
                .and_then(|config| config.remaining_for_free_shipping(subtotal)),
        }
    }

    fn position(&self, key: &ItemKey) -> Option<usize> {
        self.items.iter().position(|i| i.matches(key))
    }

    /// Inserts a fully-formed row, merging into an existing row with the same key.
    /// Validation happens before any write.
    fn add_row(&mut self, row: CartItem) -> CartResult<RowOutcome> {
        validate_product_id(&row.product_id)?;
        validate_variant_key(row.variant_key.as_deref())?;
        validate_amount("unit_price", row.unit_price)?;
        if row.quantity < 1 {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: self.limits.max_item_quantity,
            }
            .into());
        }

        let key = row.key();
        if let Some(index) = self.position(&key) {
            let existing = &self.items[index];
            let new_qty = existing.quantity.saturating_add(row.quantity);
            validate_quantity_cap(new_qty, self.limits.max_item_quantity)?;
            self.validate_subtotal_with(Some(index), existing.unit_price, new_qty)?;
            self.items[index].quantity = new_qty;
            return Ok(RowOutcome::Merged);
        }

        validate_quantity_cap(row.quantity, self.limits.max_item_quantity)?;
        validate_cart_size(self.items.len(), self.limits.max_items)?;
        self.validate_subtotal_with(None, row.unit_price, row.quantity)?;
        self.items.push(row);
        Ok(RowOutcome::Inserted)
    }

    /// Checks the subtotal the cart would have if row `index` (or a new row
    /// when `None`) held `quantity` units at `unit_price`.
    fn validate_subtotal_with(
        &self,
        index: Option<usize>,
        unit_price: Money,
        quantity: i64,
    ) -> CartResult<()> {
        let subtotal = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != index)
            .map(|(_, item)| item.unit_price.checked_multiply_quantity(item.quantity))
            .chain(std::iter::once(unit_price.checked_multiply_quantity(quantity)))
            .try_fold(Money::zero(), |total, line| total.checked_add(line?));

        match subtotal {
            Some(subtotal) if subtotal.cents() <= MAX_AMOUNT_CENTS => Ok(()),
            _ => Err(ValidationError::OutOfRange {
                field: "subtotal".to_string(),
                min: 0,
                max: MAX_AMOUNT_CENTS,
            }
            .into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Inserted,
    Merged,
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// Read-only view of cart totals, computed on demand and never stored.
///
/// ## Unknown Shipping
/// `shipping_cost` and `total` are `None` whenever the shipping policy is not
/// `Loaded`. Callers must render that as "shipping calculated at checkout",
/// never as free shipping. `subtotal` is always available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub shipping_method: ShippingMethod,
    pub shipping: ShippingState,
    pub shipping_cost: Option<Money>,
    pub total: Option<Money>,
    /// Remaining amount to reach free shipping; `None` if unknown or reached.
    pub amount_to_free_shipping: Option<Money>,
}

impl CartSnapshot {
    /// Checks whether shipping (and therefore the total) is known.
    pub fn is_shipping_known(&self) -> bool {
        self.shipping_cost.is_some()
    }

    /// Checks whether shipping is known to be free.
    pub fn is_free_shipping(&self) -> bool {
        self.shipping_cost.is_some_and(|cost| cost.is_zero())
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Cart::new().snapshot(&ShippingState::Unloaded, ShippingMethod::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::shipping::ShippingConfig;

    fn loaded(threshold: i64, standard: i64, express: i64) -> ShippingState {
        ShippingState::Loaded(
            ShippingConfig::new(
                Money::from_cents(threshold),
                Money::from_cents(standard),
                Money::from_cents(express),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(999), 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_re_add_keeps_first_price() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(1000), 2).unwrap();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(1500), 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        let row = cart.get(&ItemKey::new("P1")).unwrap();
        assert_eq!(row.quantity, 5);
        assert_eq!(row.unit_price.cents(), 1000);
        assert_eq!(cart.subtotal().cents(), 5000);
    }

    #[test]
    fn test_variants_get_separate_rows() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::with_variant("TEE", "M"), Money::from_cents(2000), 1).unwrap();
        cart.add_item(ItemKey::with_variant("TEE", "L"), Money::from_cents(2200), 1).unwrap();
        cart.add_item(ItemKey::new("TEE"), Money::from_cents(1800), 1).unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal().cents(), 6000);
    }

    #[test]
    fn test_zero_quantity_add_is_clamped_to_one() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(100), 0).unwrap();
        assert_eq!(cart.total_quantity(), 1);
    }

    #[test]
    fn test_invalid_add_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(100), 1).unwrap();
        let before = cart.clone();

        let err = cart
            .add_item(ItemKey::new("P2"), Money::from_cents(-1), 1)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidInput(_)));

        let err = cart
            .add_item(ItemKey::new("P1"), Money::from_cents(100), -4)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidInput(_)));

        let err = cart.add_item(ItemKey::new(""), Money::from_cents(100), 1).unwrap_err();
        assert!(matches!(err, CartError::InvalidInput(_)));

        assert_eq!(cart, before);
    }

    #[test]
    fn test_oversized_price_is_rejected_before_write() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P0"), Money::from_cents(100), 1).unwrap();
        let before = cart.clone();

        // unit_price * 2 would not fit in i64
        let err = cart
            .add_item(ItemKey::new("P1"), Money::from_cents(i64::MAX / 2 + 1), 2)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidInput(_)));
        assert_eq!(cart, before);

        let err = cart
            .add_item(ItemKey::new("P1"), Money::from_cents(MAX_AMOUNT_CENTS + 1), 1)
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidInput(_)));
        assert_eq!(cart, before);

        let snap = cart.snapshot(&loaded(5000, 500, 1200), ShippingMethod::Express);
        assert_eq!(snap.total, Some(Money::from_cents(1300)));
    }

    #[test]
    fn test_subtotal_cap_covers_merge_and_update() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("BIG"), Money::from_cents(MAX_AMOUNT_CENTS), 1)
            .unwrap();
        let before = cart.clone();

        // A second unit of the same row, a new row, or a quantity update all
        // push the subtotal past the cap
        assert!(cart.add_item(ItemKey::new("BIG"), Money::from_cents(1), 1).is_err());
        assert!(cart.add_item(ItemKey::new("P2"), Money::from_cents(1), 1).is_err());
        assert!(cart.update_quantity(&ItemKey::new("BIG"), 2).is_err());
        assert_eq!(cart, before);

        // Free items still fit
        cart.add_item(ItemKey::new("GIFT"), Money::zero(), 1).unwrap();
        assert_eq!(cart.subtotal().cents(), MAX_AMOUNT_CENTS);

        let snap = cart.snapshot(&loaded(0, 0, 0), ShippingMethod::Standard);
        assert_eq!(snap.total, Some(Money::from_cents(MAX_AMOUNT_CENTS)));
    }

    #[test]
    fn test_huge_quantity_limit_does_not_overflow() {
        let limits = CartLimits {
            max_items: 10,
            max_item_quantity: i64::MAX,
        };
        let mut cart = Cart::with_limits(limits);
        cart.add_item(ItemKey::new("FREE"), Money::zero(), i64::MAX).unwrap();
        cart.add_item(ItemKey::new("FREE"), Money::zero(), 1).unwrap();
        cart.add_item(ItemKey::new("FREE2"), Money::zero(), 5).unwrap();
        assert_eq!(cart.total_quantity(), i64::MAX);

        assert!(cart.add_item(ItemKey::new("P1"), Money::from_cents(2), i64::MAX).is_err());
        assert_eq!(cart.item_count(), 2);
    }

    /// Deterministic mix of adds, updates and removes over a few keys.
    fn mixed_steps() -> Vec<Step> {
        let tee_m = ItemKey::with_variant("TEE", "M");
        let tee_l = ItemKey::with_variant("TEE", "L");
        let tee = ItemKey::new("TEE");
        let mug = ItemKey::new("MUG");

        vec![
            Step::Add(tee_m.clone(), 2000, 1),
            Step::Add(tee_l.clone(), 2200, 2),
            Step::Add(tee_m.clone(), 9999, 3),
            Step::Add(mug.clone(), 0, 0),
            Step::Remove(ItemKey::new("NOPE")),
            Step::Add(tee.clone(), 1800, 1),
            Step::Update(tee_l.clone(), 1),
            Step::Update(tee_m.clone(), 0),
            Step::Add(tee_m.clone(), 2100, 2),
            Step::Add(mug.clone(), 500, 4),
            Step::Remove(tee.clone()),
            Step::Remove(tee.clone()),
            Step::Update(mug.clone(), 7),
            Step::Add(tee_l.clone(), 2200, 999),
            Step::Add(tee.clone(), -1, 1),
            Step::Update(tee_l.clone(), 0),
            Step::Update(ItemKey::new("NOPE"), 0),
            Step::Remove(mug),
            Step::Add(tee_l, 2200, 1),
            Step::Remove(tee_m),
        ]
    }

    enum Step {
        Add(ItemKey, i64, i64),
        Update(ItemKey, i64),
        Remove(ItemKey),
    }

    #[test]
    fn test_mixed_sequence_keeps_rows_unique_and_subtotal_monotonic() {
        let mut cart = Cart::new();

        for (n, step) in mixed_steps().into_iter().enumerate() {
            let before = cart.subtotal();

            match step {
                Step::Add(key, price, qty) => {
                    let result = cart.add_item(key, Money::from_cents(price), qty);
                    assert!(cart.subtotal() >= before, "step {n}: add lowered subtotal");
                    if result.is_err() {
                        assert_eq!(cart.subtotal(), before, "step {n}: failed add changed cart");
                    }
                }
                Step::Update(key, 0) => {
                    let _ = cart.update_quantity(&key, 0);
                    assert!(cart.subtotal() <= before, "step {n}: update to 0 raised subtotal");
                }
                Step::Update(key, qty) => {
                    let _ = cart.update_quantity(&key, qty);
                }
                Step::Remove(key) => {
                    cart.remove_item(&key);
                    assert!(cart.subtotal() <= before, "step {n}: remove raised subtotal");
                    assert!(cart.get(&key).is_none());
                }
            }

            let keys: HashSet<ItemKey> = cart.items().iter().map(CartItem::key).collect();
            assert_eq!(keys.len(), cart.item_count(), "step {n}: duplicate rows");
            assert!(cart.items().iter().all(|i| i.quantity >= 1), "step {n}: empty row");
        }

        // TEE/L: 1 + 999 exceeded the quantity cap and was rejected, then removed,
        // then re-added fresh
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal().cents(), 2200);
    }

    #[test]
    fn test_repeated_adds_of_one_key_never_duplicate() {
        let mut cart = Cart::new();
        let keys = [
            ItemKey::new("P1"),
            ItemKey::with_variant("P1", "red"),
            ItemKey::with_variant("P1", "blue"),
        ];

        let mut previous = Money::zero();
        for round in 0..30_i64 {
            let key = keys[(round % 3) as usize].clone();
            cart.add_item(key, Money::from_cents(100 + round), 1).unwrap();

            assert!(cart.subtotal() >= previous);
            previous = cart.subtotal();
            assert!(cart.item_count() <= keys.len());
        }

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total_quantity(), 30);
        // First price of each key is kept: 100, 101, 102 cents, ten units each
        assert_eq!(cart.subtotal().cents(), 10 * (100 + 101 + 102));
    }

    #[test]
    fn test_quantity_cap_on_merge() {
        let limits = CartLimits {
            max_items: 10,
            max_item_quantity: 5,
        };
        let mut cart = Cart::with_limits(limits);
        cart.add_item(ItemKey::new("P1"), Money::from_cents(100), 4).unwrap();

        assert!(cart.add_item(ItemKey::new("P1"), Money::from_cents(100), 2).is_err());
        assert_eq!(cart.total_quantity(), 4);
    }

    #[test]
    fn test_max_items() {
        let limits = CartLimits {
            max_items: 2,
            max_item_quantity: 999,
        };
        let mut cart = Cart::with_limits(limits);
        cart.add_item(ItemKey::new("A"), Money::from_cents(100), 1).unwrap();
        cart.add_item(ItemKey::new("B"), Money::from_cents(100), 1).unwrap();

        assert!(cart.add_item(ItemKey::new("C"), Money::from_cents(100), 1).is_err());
        // Existing rows can still grow
        cart.add_item(ItemKey::new("A"), Money::from_cents(100), 1).unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(250), 1).unwrap();

        assert!(cart.update_quantity(&ItemKey::new("P1"), 4).unwrap());
        assert_eq!(cart.subtotal().cents(), 1000);

        // Same quantity: no change
        assert!(!cart.update_quantity(&ItemKey::new("P1"), 4).unwrap());

        // Zero removes the row rather than keeping a zero-quantity row
        assert!(cart.update_quantity(&ItemKey::new("P1"), 0).unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_missing_key_is_item_not_found() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(250), 1).unwrap();
        let before = cart.clone();

        let err = cart.update_quantity(&ItemKey::new("missing-key"), 3).unwrap_err();
        assert_eq!(err, CartError::ItemNotFound(ItemKey::new("missing-key")));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_negative_quantity_is_invalid() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(250), 2).unwrap();

        let err = cart.update_quantity(&ItemKey::new("P1"), -1).unwrap_err();
        assert!(matches!(err, CartError::InvalidInput(_)));
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(250), 2).unwrap();
        cart.add_item(ItemKey::new("P2"), Money::from_cents(100), 1).unwrap();

        assert!(cart.remove_item(&ItemKey::new("P1")));
        let once = cart.clone();
        assert!(!cart.remove_item(&ItemKey::new("P1")));
        assert_eq!(cart, once);
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(999), 2).unwrap();

        assert!(cart.clear());
        assert!(cart.is_empty());
        assert!(!cart.clear());
    }

    #[test]
    fn test_snapshot_unknown_until_loaded() {
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(1000), 1).unwrap();

        let snap = cart.snapshot(&ShippingState::Unloaded, ShippingMethod::Standard);
        assert_eq!(snap.subtotal.cents(), 1000);
        assert_eq!(snap.shipping_cost, None);
        assert_eq!(snap.total, None);
        assert!(!snap.is_free_shipping());

        let snap = cart.snapshot(&ShippingState::Unavailable, ShippingMethod::Standard);
        assert_eq!(snap.subtotal.cents(), 1000);
        assert_eq!(snap.shipping_cost, None);
        assert!(snap.shipping.is_unavailable());
    }

    #[test]
    fn test_snapshot_threshold_pricing() {
        let shipping = loaded(5000, 500, 1200);
        let mut cart = Cart::new();
        cart.add_item(ItemKey::new("P1"), Money::from_cents(4900), 1).unwrap();

        let snap = cart.snapshot(&shipping, ShippingMethod::Standard);
        assert_eq!(snap.shipping_cost, Some(Money::from_cents(500)));
        assert_eq!(snap.total, Some(Money::from_cents(5400)));
        assert_eq!(snap.amount_to_free_shipping, Some(Money::from_cents(100)));

        let snap = cart.snapshot(&shipping, ShippingMethod::Express);
        assert_eq!(snap.total, Some(Money::from_cents(6100)));

        cart.add_item(ItemKey::new("P2"), Money::from_cents(100), 1).unwrap();
        let snap = cart.snapshot(&shipping, ShippingMethod::Express);
        assert!(snap.is_free_shipping());
        assert_eq!(snap.total, Some(Money::from_cents(5000)));
        assert_eq!(snap.amount_to_free_shipping, None);
    }

    #[test]
    fn test_from_rows_merges_and_drops() {
        let rows = vec![
            CartItem::new(ItemKey::new("P1"), Money::from_cents(1000), 2),
            CartItem::new(ItemKey::new("P1"), Money::from_cents(1200), 1),
            CartItem::new(ItemKey::new("BAD"), Money::from_cents(-5), 1),
            CartItem::new(ItemKey::new("ZERO"), Money::from_cents(5), 0),
            CartItem::new(ItemKey::new("P2"), Money::from_cents(300), 1),
            CartItem::new(ItemKey::new("HUGE"), Money::from_cents(i64::MAX / 2 + 1), 2),
        ];

        let (cart, rejected) = Cart::from_rows(rows, CartLimits::default());
        assert_eq!(rejected, 4);
        assert_eq!(cart.item_count(), 2);

        let p1 = cart.get(&ItemKey::new("P1")).unwrap();
        assert_eq!(p1.quantity, 3);
        assert_eq!(p1.unit_price.cents(), 1000);
    }
}
