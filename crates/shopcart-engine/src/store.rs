//! # Cart Store
//!
//! The single owner of cart state for a shopping session.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CartStore::apply                                  │
//! │                                                                         │
//! │  UI action ─────────┐                                                   │
//! │                     ├──► CartCommand ──► validate + mutate (core Cart)  │
//! │  Loader completion ─┘                         │                         │
//! │                                   rejected ◄──┤──► unchanged            │
//! │                              (state intact,   │    (no notification)    │
//! │                               no one told)    ▼                         │
//! │                                           committed                     │
//! │                                               │                         │
//! │                          items changed? ──────┤──► storage.save(..)     │
//! │                                               ▼     (failure = warn)    │
//! │                                     observers.on_change(&snapshot)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation runs to completion before the next one starts. The store is
//! plain data mutated through `&mut self`; for concurrent callers, move it
//! into a [`crate::CartService`].

use std::sync::Arc;
use tracing::{debug, info, warn};

use shopcart_core::{
    Cart, CartItem, CartLimits, CartResult, CartSnapshot, ItemKey, Money, ShippingConfig,
    ShippingMethod, ShippingState,
};

use crate::observer::{CartObserver, SubscriptionId};
use crate::storage::{CartStorage, NoopStorage, PersistedCart};

// =============================================================================
// Commands
// =============================================================================

/// A cart mutation, as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    AddItem {
        key: ItemKey,
        unit_price: Money,
        quantity: i64,
    },
    UpdateQuantity {
        key: ItemKey,
        quantity: i64,
    },
    RemoveItem {
        key: ItemKey,
    },
    Clear,
    /// Result of a shipping policy load: `None` means unavailable.
    SetShippingConfig(Option<ShippingConfig>),
    SetShippingMethod(ShippingMethod),
}

impl CartCommand {
    /// Short name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            CartCommand::AddItem { .. } => "add_item",
            CartCommand::UpdateQuantity { .. } => "update_quantity",
            CartCommand::RemoveItem { .. } => "remove_item",
            CartCommand::Clear => "clear",
            CartCommand::SetShippingConfig(_) => "set_shipping_config",
            CartCommand::SetShippingMethod(_) => "set_shipping_method",
        }
    }
}

/// What a committed command touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    None,
    Items,
    Shipping,
}

// =============================================================================
// Cart Store
// =============================================================================

/// Cart contents plus the session's shipping policy and method.
pub struct CartStore {
    cart: Cart,
    shipping: ShippingState,
    method: ShippingMethod,
    observers: Vec<(SubscriptionId, Arc<dyn CartObserver>)>,
    storage: Arc<dyn CartStorage>,
}

impl CartStore {
    /// Creates an empty, non-persistent store with default limits.
    pub fn new() -> Self {
        Self::with_limits(CartLimits::default())
    }

    /// Creates an empty, non-persistent store.
    pub fn with_limits(limits: CartLimits) -> Self {
        CartStore {
            cart: Cart::with_limits(limits),
            shipping: ShippingState::Unloaded,
            method: ShippingMethod::default(),
            observers: Vec::new(),
            storage: Arc::new(NoopStorage),
        }
    }

    /// Creates a store backed by `storage`, restoring any saved rows.
    ///
    /// Unreadable storage starts an empty cart. Saved rows that break the
    /// cart invariants are dropped and duplicate keys are merged into the
    /// first row. Shipping always starts `Unloaded`.
    pub fn restore(storage: Arc<dyn CartStorage>, limits: CartLimits) -> Self {
        let cart = match storage.load() {
            Ok(Some(persisted)) => {
                let stored = persisted.items.len();
                let (cart, rejected) = Cart::from_rows(persisted.items, limits);
                if rejected > 0 {
                    warn!(stored, rejected, "Dropped invalid rows from saved cart");
                }
                info!(items = cart.item_count(), "Cart restored from storage");
                cart
            }
            Ok(None) => Cart::with_limits(limits),
            Err(e) => {
                warn!(error = %e, "Failed to load saved cart, starting empty");
                Cart::with_limits(limits)
            }
        };

        CartStore {
            cart,
            shipping: ShippingState::Unloaded,
            method: ShippingMethod::default(),
            observers: Vec::new(),
            storage,
        }
    }

    /// Sets the initially selected shipping method.
    pub fn with_shipping_method(mut self, method: ShippingMethod) -> Self {
        self.method = method;
        self
    }

    // =========================================================================
    // Single Mutation Entry Point
    // =========================================================================

    /// Applies a command and returns the resulting snapshot.
    ///
    /// A rejected command leaves the store untouched and notifies nobody.
    pub fn apply(&mut self, command: CartCommand) -> CartResult<CartSnapshot> {
        let name = command.name();

        let change = match command {
            CartCommand::AddItem {
                key,
                unit_price,
                quantity,
            } => {
                self.cart.add_item(key, unit_price, quantity)?;
                Change::Items
            }
            CartCommand::UpdateQuantity { key, quantity } => {
                if self.cart.update_quantity(&key, quantity)? {
                    Change::Items
                } else {
                    Change::None
                }
            }
            CartCommand::RemoveItem { key } => {
                if self.cart.remove_item(&key) {
                    Change::Items
                } else {
                    Change::None
                }
            }
            CartCommand::Clear => {
                if self.cart.clear() {
                    Change::Items
                } else {
                    Change::None
                }
            }
            CartCommand::SetShippingConfig(config) => {
                let next = ShippingState::from_load_result(config);
                if next == self.shipping {
                    Change::None
                } else {
                    info!(from = %self.shipping, to = %next, "Shipping policy updated");
                    self.shipping = next;
                    Change::Shipping
                }
            }
            CartCommand::SetShippingMethod(method) => {
                if method == self.method {
                    Change::None
                } else {
                    self.method = method;
                    Change::Shipping
                }
            }
        };

        debug!(command = name, ?change, items = self.cart.item_count(), "Cart command applied");

        if change == Change::Items {
            self.persist();
        }

        let snapshot = self.snapshot();
        if change != Change::None {
            self.notify(&snapshot);
        }
        Ok(snapshot)
    }

    // =========================================================================
    // Named Operations
    // =========================================================================

    /// Adds `quantity` of an item, or increases the quantity of an existing row.
    /// The price of an existing row is kept.
    pub fn add_item(
        &mut self,
        key: ItemKey,
        unit_price: Money,
        quantity: i64,
    ) -> CartResult<CartSnapshot> {
        self.apply(CartCommand::AddItem {
            key,
            unit_price,
            quantity,
        })
    }

    /// Sets a row's quantity; zero removes it.
    pub fn update_quantity(&mut self, key: ItemKey, quantity: i64) -> CartResult<CartSnapshot> {
        self.apply(CartCommand::UpdateQuantity { key, quantity })
    }

    /// Removes a row. Absent keys are ignored.
    pub fn remove_item(&mut self, key: ItemKey) -> CartSnapshot {
        self.apply_infallible(CartCommand::RemoveItem { key })
    }

    /// Empties the cart. Shipping state is kept.
    pub fn clear(&mut self) -> CartSnapshot {
        self.apply_infallible(CartCommand::Clear)
    }

    /// Records the outcome of a shipping policy load.
    pub fn set_shipping_config(&mut self, config: Option<ShippingConfig>) -> CartSnapshot {
        self.apply_infallible(CartCommand::SetShippingConfig(config))
    }

    /// Selects the shipping method used by [`CartStore::snapshot`].
    pub fn set_shipping_method(&mut self, method: ShippingMethod) -> CartSnapshot {
        self.apply_infallible(CartCommand::SetShippingMethod(method))
    }

    fn apply_infallible(&mut self, command: CartCommand) -> CartSnapshot {
        // Remove, clear and shipping commands have no failure path
        self.apply(command).unwrap_or_else(|e| {
            warn!(error = %e, "Unexpected rejection");
            self.snapshot()
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current totals with the selected shipping method.
    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.snapshot(&self.shipping, self.method)
    }

    /// Current totals priced with an explicit shipping method.
    pub fn snapshot_for(&self, method: ShippingMethod) -> CartSnapshot {
        self.cart.snapshot(&self.shipping, method)
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn shipping_state(&self) -> &ShippingState {
        &self.shipping
    }

    pub fn shipping_method(&self) -> ShippingMethod {
        self.method
    }

    pub fn limits(&self) -> CartLimits {
        self.cart.limits()
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Registers an observer for committed changes.
    pub fn subscribe(&mut self, observer: Arc<dyn CartObserver>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.observers.push((id, observer));
        debug!(%id, observers = self.observers.len(), "Observer subscribed");
        id
    }

    /// Removes an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&self, snapshot: &CartSnapshot) {
        for (_, observer) in &self.observers {
            observer.on_change(snapshot);
        }
    }

    fn persist(&self) {
        let persisted = PersistedCart::from_items(self.cart.items());
        if let Err(e) = self.storage.save(&persisted) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
